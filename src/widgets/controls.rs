//! Bottom control bar: status line plus keybind strip with dataset info.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Paragraph, Widget},
};

use crate::config::Theme;

/// Status line content, colored by severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Success(String),
    Error(String),
}

impl Default for StatusLine {
    fn default() -> Self {
        StatusLine::Info("Open a CSV → pick columns → p to plot.".to_string())
    }
}

pub struct ControlsView<'a> {
    pub status: &'a StatusLine,
    pub file: Option<&'a str>,
    pub dirty: bool,
    pub row_count: usize,
    /// (current segment 1-based, total segments)
    pub segment: (usize, usize),
    /// Global inclusive selection range.
    pub selection: Option<(usize, usize)>,
    pub theme: &'a Theme,
}

impl Widget for &ControlsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let (status_style, status_text) = match self.status {
            StatusLine::Info(text) => (
                Style::default().fg(self.theme.get("text_secondary")),
                text.as_str(),
            ),
            StatusLine::Success(text) => {
                (Style::default().fg(self.theme.get("success")), text.as_str())
            }
            StatusLine::Error(text) => {
                (Style::default().fg(self.theme.get("error")), text.as_str())
            }
        };
        Paragraph::new(status_text)
            .style(status_style)
            .render(rows[0], buf);

        if area.height < 2 {
            return;
        }

        const CONTROLS: [(&str, &str); 7] = [
            ("Tab", "Focus"),
            ("p", "Plot"),
            ("[ ]", "Segment"),
            ("a", "Apply"),
            ("w", "Save"),
            ("Esc", "Plot-only"),
            ("q", "Quit"),
        ];

        let bg = self.theme.get("controls_bg");
        let key_style = Style::default()
            .fg(self.theme.get("border_active"))
            .bg(bg)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(self.theme.get("text_secondary")).bg(bg);
        let info_style = Style::default().fg(self.theme.get("text_primary")).bg(bg);

        // Background for the whole strip first.
        Paragraph::new("")
            .style(Style::default().bg(bg))
            .render(rows[1], buf);

        let mut x = rows[1].x;
        for (key, action) in CONTROLS {
            let chunk = format!(" {} {}  ", key, action);
            if x + chunk.chars().count() as u16 > rows[1].x + rows[1].width {
                break;
            }
            buf.set_string(x, rows[1].y, format!(" {} ", key), key_style);
            let label_x = x + key.chars().count() as u16 + 2;
            buf.set_string(label_x, rows[1].y, action, label_style);
            x = label_x + action.chars().count() as u16 + 1;
        }

        // Dataset info, right-aligned: file, dirty marker, rows, segment, selection.
        let mut info = String::new();
        if let Some(file) = self.file {
            info.push_str(file);
            if self.dirty {
                info.push_str(" *");
            }
            info.push_str(" │ ");
        }
        info.push_str(&format!("{} rows", self.row_count));
        info.push_str(&format!(" │ seg {}/{}", self.segment.0, self.segment.1));
        if let Some((start, end)) = self.selection {
            info.push_str(&format!(" │ sel {}..{} ({} rows)", start, end, end - start + 1));
        }
        let info_len = info.chars().count() as u16;
        if info_len < rows[1].width {
            let info_x = rows[1].x + rows[1].width - info_len - 1;
            if info_x > x {
                buf.set_string(info_x, rows[1].y, &info, info_style);
            }
        }
    }
}
