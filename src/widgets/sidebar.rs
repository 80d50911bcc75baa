//! Picker sidebar: series columns, background category + sentinel, marker
//! column + value, and the assign-value input.

use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::config::Theme;
use crate::widgets::text_input::TextInput;

/// Label for the "no selection" entry at the top of single-choice lists.
pub const NONE_LABEL: &str = "— none —";

/// Which sidebar element has keyboard focus. Tab cycles forward, BackTab
/// backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarFocus {
    #[default]
    SeriesList,
    CategoryList,
    SentinelValue,
    MarkerColumn,
    MarkerValue,
    AssignValue,
}

impl SidebarFocus {
    pub fn next(self) -> Self {
        use SidebarFocus::*;
        match self {
            SeriesList => CategoryList,
            CategoryList => SentinelValue,
            SentinelValue => MarkerColumn,
            MarkerColumn => MarkerValue,
            MarkerValue => AssignValue,
            AssignValue => SeriesList,
        }
    }

    pub fn prev(self) -> Self {
        use SidebarFocus::*;
        match self {
            SeriesList => AssignValue,
            CategoryList => SeriesList,
            SentinelValue => CategoryList,
            MarkerColumn => SentinelValue,
            MarkerValue => MarkerColumn,
            AssignValue => MarkerValue,
        }
    }
}

/// Cursor plus scroll offset for one list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListPicker {
    pub cursor: usize,
    scroll: usize,
}

impl ListPicker {
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else {
            self.cursor = self.cursor.min(len - 1);
        }
        self.scroll = self.scroll.min(self.cursor);
    }

    fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

/// All sidebar widget state: focus, list cursors, and the free-text inputs.
#[derive(Debug, Default)]
pub struct SidebarState {
    pub focus: SidebarFocus,
    pub series: ListPicker,
    pub category: ListPicker,
    pub sentinel: ListPicker,
    pub marker_column: ListPicker,
    pub marker_value: ListPicker,
    pub sentinel_input: TextInput,
    pub marker_value_input: TextInput,
    pub assign_input: TextInput,
}

/// Data the sidebar needs for one render: column names, current choices,
/// and enumerated values when the relevant domains are enumerable.
pub struct SidebarContext<'a> {
    pub columns: &'a [String],
    pub selected_series: &'a [String],
    pub category_column: Option<&'a str>,
    /// Sorted domain values of the category column; None when unbounded
    /// (sentinel becomes free text).
    pub category_values: Option<&'a [String]>,
    pub no_background_value: Option<&'a str>,
    pub marker_column: Option<&'a str>,
    /// Sorted domain values of the marker column; None when unbounded.
    pub marker_values: Option<&'a [String]>,
    pub marker_value: Option<&'a str>,
}

/// Items for a single-choice list: the none entry followed by `values`.
pub fn with_none_entry(values: &[String]) -> Vec<String> {
    let mut items = Vec::with_capacity(values.len() + 1);
    items.push(NONE_LABEL.to_string());
    items.extend(values.iter().cloned());
    items
}

#[allow(clippy::too_many_arguments)]
fn render_list(
    area: Rect,
    buf: &mut Buffer,
    items: &[String],
    marked: &HashSet<&str>,
    picker: &mut ListPicker,
    is_focused: bool,
    theme: &Theme,
) {
    picker.clamp(items.len());
    picker.ensure_visible(area.height as usize);
    let active_color = theme.get("border_active");
    let text_primary = theme.get("text_primary");

    for (line, item) in items.iter().skip(picker.scroll).enumerate() {
        if line as u16 >= area.height {
            break;
        }
        let index = picker.scroll + line;
        let mut style = if marked.contains(item.as_str()) {
            Style::default().fg(active_color)
        } else {
            Style::default().fg(text_primary)
        };
        if is_focused && index == picker.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let text: String = item.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y + line as u16, &text, style);
    }
}

fn group_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let border = if focused {
        theme.get("border_active")
    } else {
        theme.get("border")
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

/// Render the full sidebar. Mutates only list scroll/cursor clamping in
/// `state`; all semantic choices live with the caller.
pub fn render_sidebar(
    area: Rect,
    buf: &mut Buffer,
    state: &mut SidebarState,
    ctx: &SidebarContext<'_>,
    theme: &Theme,
) {
    if area.width < 4 || area.height < 10 {
        return;
    }
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Series
            Constraint::Min(8),    // Background
            Constraint::Min(8),    // Markers
            Constraint::Length(4), // Assign
        ])
        .split(area);

    // Series (multi-select).
    {
        let focused = state.focus == SidebarFocus::SeriesList;
        let block = group_block(" Series ", focused, theme);
        let inner = block.inner(sections[0]);
        block.render(sections[0], buf);
        let marked: HashSet<&str> = ctx.selected_series.iter().map(|s| s.as_str()).collect();
        render_list(inner, buf, ctx.columns, &marked, &mut state.series, focused, theme);
    }

    // Background: category column + no-background value.
    {
        let cat_focused = state.focus == SidebarFocus::CategoryList;
        let sentinel_focused = state.focus == SidebarFocus::SentinelValue;
        let block = group_block(" Background ", cat_focused || sentinel_focused, theme);
        let inner = block.inner(sections[1]);
        block.render(sections[1], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(inner);

        let items = with_none_entry(ctx.columns);
        let mut marked: HashSet<&str> = HashSet::new();
        marked.insert(ctx.category_column.unwrap_or(NONE_LABEL));
        render_list(rows[0], buf, &items, &marked, &mut state.category, cat_focused, theme);

        Paragraph::new(Line::from(Span::styled(
            "No background:",
            Style::default().fg(theme.get("text_secondary")),
        )))
        .render(rows[1], buf);

        match (ctx.category_column, ctx.category_values) {
            (Some(_), Some(values)) => {
                let items = with_none_entry(values);
                let mut marked: HashSet<&str> = HashSet::new();
                marked.insert(ctx.no_background_value.unwrap_or(NONE_LABEL));
                render_list(
                    rows[2],
                    buf,
                    &items,
                    &marked,
                    &mut state.sentinel,
                    sentinel_focused,
                    theme,
                );
            }
            (Some(_), None) => {
                // Unbounded domain: free text entry.
                state.sentinel_input.set_focused(sentinel_focused);
                (&state.sentinel_input).render(rows[2], buf);
            }
            (None, _) => {
                Paragraph::new(Line::from(Span::styled(
                    NONE_LABEL,
                    Style::default().fg(theme.get("dimmed")),
                )))
                .render(rows[2], buf);
            }
        }
    }

    // Markers: column + value.
    {
        let col_focused = state.focus == SidebarFocus::MarkerColumn;
        let value_focused = state.focus == SidebarFocus::MarkerValue;
        let block = group_block(" Markers ", col_focused || value_focused, theme);
        let inner = block.inner(sections[2]);
        block.render(sections[2], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(inner);

        let items = with_none_entry(ctx.columns);
        let mut marked: HashSet<&str> = HashSet::new();
        marked.insert(ctx.marker_column.unwrap_or(NONE_LABEL));
        render_list(
            rows[0],
            buf,
            &items,
            &marked,
            &mut state.marker_column,
            col_focused,
            theme,
        );

        Paragraph::new(Line::from(Span::styled(
            "Value:",
            Style::default().fg(theme.get("text_secondary")),
        )))
        .render(rows[1], buf);

        match (ctx.marker_column, ctx.marker_values) {
            (Some(_), Some(values)) => {
                let items = with_none_entry(values);
                let mut marked: HashSet<&str> = HashSet::new();
                marked.insert(ctx.marker_value.unwrap_or(NONE_LABEL));
                render_list(
                    rows[2],
                    buf,
                    &items,
                    &marked,
                    &mut state.marker_value,
                    value_focused,
                    theme,
                );
            }
            (Some(_), None) => {
                state.marker_value_input.set_focused(value_focused);
                (&state.marker_value_input).render(rows[2], buf);
            }
            (None, _) => {
                Paragraph::new(Line::from(Span::styled(
                    NONE_LABEL,
                    Style::default().fg(theme.get("dimmed")),
                )))
                .render(rows[2], buf);
            }
        }
    }

    // Assign value.
    {
        let focused = state.focus == SidebarFocus::AssignValue;
        let block = group_block(" Assign value ", focused, theme);
        let inner = block.inner(sections[3]);
        block.render(sections[3], buf);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        state.assign_input.set_focused(focused);
        (&state.assign_input).render(rows[0], buf);
        Paragraph::new(Line::from(Span::styled(
            "right-drag on plot selects rows",
            Style::default().fg(theme.get("dimmed")),
        )))
        .render(rows[1], buf);
    }
}
