//! bandui: time-series visualization in the terminal.
//!
//! Numeric columns render as overlaid line series, one categorical column as
//! colored background bands, and one marker column as vertical tick lines.
//! A right-drag on the plot selects a contiguous row range that can be bulk
//! reassigned to a new categorical value.

use color_eyre::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use polars::prelude::DataFrame;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;

pub mod config;
pub mod dataset;
pub mod domain;
pub mod edit;
pub mod error;
pub mod error_display;
pub mod palette;
pub mod plot_data;
pub mod render;
pub mod viewport;
pub mod widgets;

pub use bandui_cli::Args;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::{DatasetStore, OpenOptions, SEGMENT_ROWS, SEGMENT_THRESHOLD};
pub use error::{DataError, EditError};

use domain::CategoryDomain;
use error_display::{user_message_from_data_error, user_message_from_edit_error};
use plot_data::{prepare_plot_data, PlotData, RenderRequest};
use render::layout::app_layout;
use viewport::{full_extent, selection_from_drag, PlotGeometry, Viewport, ZoomDirection};
use widgets::controls::{ControlsView, StatusLine};
use widgets::datatable::DataTableView;
use widgets::plot::{graph_area, PlotView};
use widgets::sidebar::{render_sidebar, SidebarContext, SidebarFocus, SidebarState};
use widgets::text_input::{TextInput, TextInputEvent};

pub const APP_NAME: &str = "bandui";

/// Rows scrolled by PageUp/PageDown in the table view.
const TABLE_PAGE: usize = 20;

/// Events processed by the single-threaded run loop, strictly in arrival
/// order. `Do*` events are deferred one loop iteration so the UI can paint
/// a status line before blocking work starts.
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions),
    Resize(u16, u16),
    Exit,
    Crash(String),
}

/// Active text prompt rendered in the control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PromptMode {
    #[default]
    None,
    SaveAs,
    GoToSegment,
}

struct DragState {
    button: MouseButton,
    origin: (f64, f64),
}

pub struct App {
    store: DatasetStore,
    events: Sender<AppEvent>,
    app_config: AppConfig,
    theme: Theme,
    status: StatusLine,
    compact: bool,

    // View state.
    current_segment: usize,
    viewport: Option<Viewport>,
    plot_data: PlotData,
    plot_geometry: Option<PlotGeometry>,
    table_offset: usize,

    // Render-request state, assembled into one RenderRequest per plot.
    selected_series: Vec<String>,
    category_column: Option<String>,
    no_background_value: Option<String>,
    marker_column: Option<String>,
    marker_value: Option<String>,
    show_series_legend: bool,
    show_band_legend: bool,

    // Selection and edit.
    selection: Option<(usize, usize)>,
    drag: Option<DragState>,

    sidebar: SidebarState,
    prompt: PromptMode,
    prompt_input: TextInput,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, app_config: AppConfig) -> App {
        App {
            store: DatasetStore::new(),
            events,
            app_config,
            theme,
            status: StatusLine::default(),
            compact: false,
            current_segment: 0,
            viewport: None,
            plot_data: PlotData::default(),
            plot_geometry: None,
            table_offset: 0,
            selected_series: Vec::new(),
            category_column: None,
            no_background_value: None,
            marker_column: None,
            marker_value: None,
            show_series_legend: true,
            show_band_legend: true,
            selection: None,
            drag: None,
            sidebar: SidebarState::default(),
            prompt: PromptMode::None,
            prompt_input: TextInput::new(),
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    /// Open an in-memory frame directly (tests and programmatic callers).
    pub fn load_frame(&mut self, df: DataFrame) -> Result<(), DataError> {
        self.store.load_frame(df)?;
        self.after_load();
        Ok(())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn current_segment(&self) -> usize {
        self.current_segment
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    fn after_load(&mut self) {
        self.current_segment = 0;
        self.selection = None;
        self.table_offset = 0;
        self.selected_series.clear();
        self.category_column = None;
        self.no_background_value = None;
        self.marker_column = None;
        self.marker_value = None;
        self.sidebar = SidebarState::default();
        self.refresh_plot(false);
        self.status = StatusLine::Success(format!(
            "Loaded: {} ({} rows, segments: {})",
            self.store
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "in-memory table".to_string()),
            self.store.row_count(),
            self.store.segment_count(),
        ));
    }

    /// One immutable render request from the current picker state. When no
    /// series is selected the first column is plotted, like the original.
    fn assemble_request(&self) -> RenderRequest {
        let columns = self.store.column_names();
        let mut series: Vec<String> = self
            .selected_series
            .iter()
            .filter(|name| columns.contains(name))
            .cloned()
            .collect();
        if series.is_empty() {
            if let Some(first) = columns.first() {
                series.push(first.clone());
            }
        }

        RenderRequest {
            series_columns: series,
            category_column: self.category_column.clone(),
            no_background_value: self.effective_sentinel(),
            marker_column: self.marker_column.clone(),
            marker_value: self.effective_marker_value(),
            show_series_legend: self.show_series_legend,
            show_band_legend: self.show_band_legend,
        }
    }

    /// Sentinel value: picked from the domain list when enumerable, typed
    /// free text when unbounded.
    fn effective_sentinel(&self) -> Option<String> {
        let column = self.category_column.as_deref()?;
        if self.enumerable_values(column).is_some() {
            self.no_background_value.clone()
        } else {
            let text = self.sidebar.sentinel_input.value().trim().to_string();
            (!text.is_empty()).then_some(text)
        }
    }

    fn effective_marker_value(&self) -> Option<String> {
        let column = self.marker_column.as_deref()?;
        if self.enumerable_values(column).is_some() {
            self.marker_value.clone()
        } else {
            let text = self.sidebar.marker_value_input.value().trim().to_string();
            (!text.is_empty()).then_some(text)
        }
    }

    fn enumerable_values(&self, column: &str) -> Option<Arc<CategoryDomain>> {
        self.store
            .domain(column)
            .filter(|domain| domain.is_enumerable())
    }

    /// Rebuild the plot primitives for the active segment. With
    /// `preserve_viewport` the current limits are kept verbatim; otherwise
    /// the viewport resets to the full extent of the new data.
    fn refresh_plot(&mut self, preserve_viewport: bool) {
        if self.store.is_empty() {
            self.plot_data = PlotData::default();
            self.viewport = None;
            return;
        }
        self.current_segment = self
            .current_segment
            .min(self.store.segment_count().saturating_sub(1));
        let segment = self.store.segment(self.current_segment);
        let request = self.assemble_request();
        let domain = self
            .category_column
            .as_deref()
            .and_then(|column| self.store.domain(column));
        match prepare_plot_data(&segment, &request, domain.as_deref()) {
            Ok(data) => {
                if !preserve_viewport || self.viewport.is_none() {
                    self.viewport = Some(full_extent(data.segment_len, data.y_min, data.y_max));
                }
                self.plot_data = data;
            }
            Err(err) => {
                self.status =
                    StatusLine::Error(error_display::user_message_from_polars(&err));
            }
        }
    }

    /// Jump to a segment (clamped). Navigation clears the selection and
    /// resets the viewport to full extent.
    pub fn set_segment(&mut self, index: usize) {
        let clamped = index.min(self.store.segment_count().saturating_sub(1));
        self.current_segment = clamped;
        self.clear_selection();
        self.table_offset = 0;
        self.refresh_plot(false);
        tracing::debug!(segment = clamped, "segment changed");
    }

    pub fn next_segment(&mut self) {
        if self.current_segment + 1 < self.store.segment_count() {
            self.set_segment(self.current_segment + 1);
        }
    }

    pub fn prev_segment(&mut self) {
        if self.current_segment > 0 {
            self.set_segment(self.current_segment - 1);
        }
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.drag = None;
    }

    /// Apply the assign-value edit to the current selection. The viewport is
    /// captured before the triggered re-render and restored after, so the
    /// limits are bit-identical across the edit.
    fn apply_edit(&mut self) {
        let Some(selection) = self.selection else {
            self.status = StatusLine::Error(
                "No selection — right-drag on the plot to select rows.".to_string(),
            );
            return;
        };
        let value = self.sidebar.assign_input.value().to_string();
        match edit::apply(
            &mut self.store,
            selection,
            self.category_column.as_deref(),
            &value,
        ) {
            Ok(outcome) => {
                let saved_viewport = self.viewport;
                self.refresh_plot(true);
                self.viewport = saved_viewport;
                self.clear_selection();
                self.status = StatusLine::Success(format!(
                    "Updated rows {} to {} with value '{}'",
                    outcome.start, outcome.end, outcome.value
                ));
            }
            Err(err) => {
                self.status = StatusLine::Error(user_message_from_edit_error(&err));
            }
        }
    }

    fn save_to(&mut self, path: &Path) {
        match self.store.save(path) {
            Ok(()) => {
                self.status = StatusLine::Success(format!("Saved: {}", path.display()));
            }
            Err(err) => {
                self.status = StatusLine::Error(user_message_from_data_error(&err));
            }
        }
    }

    fn save(&mut self) {
        match self.store.path().map(Path::to_path_buf) {
            Some(path) => self.save_to(&path),
            None => {
                self.prompt = PromptMode::SaveAs;
                self.prompt_input.clear();
            }
        }
    }

    /// Process one event; may return a follow-up event to enqueue.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            AppEvent::Open(path, options) => {
                self.status = StatusLine::Info(format!("Loading {}…", path.display()));
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                match self.store.load_path(path, options) {
                    Ok(()) => self.after_load(),
                    Err(err) => {
                        self.status = StatusLine::Error(user_message_from_data_error(&err));
                    }
                }
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if self.prompt != PromptMode::None {
            self.handle_prompt_key(key);
            return None;
        }

        // Tab cycles sidebar focus regardless of what is focused.
        match key.code {
            KeyCode::Tab => {
                self.sidebar.focus = self.sidebar.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.sidebar.focus = self.sidebar.focus.prev();
                return None;
            }
            _ => {}
        }

        // Text fields consume keys while focused.
        if self.focused_input_key(key) {
            return None;
        }

        match key.code {
            KeyCode::Up => self.move_focused_cursor(true),
            KeyCode::Down => self.move_focused_cursor(false),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_focused_item(),
            KeyCode::Char('p') => self.refresh_plot(false),
            KeyCode::Char('[') => self.prev_segment(),
            KeyCode::Char(']') => self.next_segment(),
            KeyCode::Char('g') => {
                self.prompt = PromptMode::GoToSegment;
                self.prompt_input.clear();
            }
            KeyCode::Char('l') => {
                self.show_series_legend = !self.show_series_legend;
                self.refresh_plot(true);
            }
            KeyCode::Char('b') => {
                self.show_band_legend = !self.show_band_legend;
                self.refresh_plot(true);
            }
            KeyCode::Char('a') => self.apply_edit(),
            KeyCode::Char('w') => self.save(),
            KeyCode::Char('s') => {
                self.prompt = PromptMode::SaveAs;
                self.prompt_input.clear();
            }
            KeyCode::PageDown => {
                let len = self.plot_data.segment_len;
                self.table_offset = (self.table_offset + TABLE_PAGE).min(len.saturating_sub(1));
            }
            KeyCode::PageUp => {
                self.table_offset = self.table_offset.saturating_sub(TABLE_PAGE);
            }
            KeyCode::Esc => {
                self.compact = !self.compact;
            }
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            _ => {}
        }
        None
    }

    fn handle_prompt_key(&mut self, key: &KeyEvent) {
        self.prompt_input.set_focused(true);
        match self.prompt_input.handle_key(key) {
            TextInputEvent::Submit => {
                let text = self.prompt_input.value().trim().to_string();
                let mode = self.prompt;
                self.prompt = PromptMode::None;
                match mode {
                    PromptMode::SaveAs if !text.is_empty() => {
                        self.save_to(Path::new(&text));
                    }
                    PromptMode::GoToSegment => match text.parse::<usize>() {
                        Ok(number) if number >= 1 => self.set_segment(number - 1),
                        _ => {
                            self.status = StatusLine::Error(format!(
                                "Not a segment number: '{}'",
                                text
                            ));
                        }
                    },
                    _ => {}
                }
            }
            TextInputEvent::Cancel => {
                self.prompt = PromptMode::None;
            }
            TextInputEvent::None => {}
        }
    }

    /// Route a key into the focused free-text field, when one is focused.
    /// Returns true when the key was consumed.
    fn focused_input_key(&mut self, key: &KeyEvent) -> bool {
        let unbounded_category = self
            .category_column
            .as_deref()
            .is_some_and(|c| self.enumerable_values(c).is_none());
        let unbounded_marker = self
            .marker_column
            .as_deref()
            .is_some_and(|c| self.enumerable_values(c).is_none());

        let input = match self.sidebar.focus {
            SidebarFocus::AssignValue => Some(&mut self.sidebar.assign_input),
            SidebarFocus::SentinelValue if unbounded_category => {
                Some(&mut self.sidebar.sentinel_input)
            }
            SidebarFocus::MarkerValue if unbounded_marker => {
                Some(&mut self.sidebar.marker_value_input)
            }
            _ => None,
        };
        let Some(input) = input else {
            return false;
        };
        match input.handle_key(key) {
            TextInputEvent::Submit => {
                if self.sidebar.focus == SidebarFocus::AssignValue {
                    self.apply_edit();
                }
                true
            }
            TextInputEvent::Cancel => {
                input.clear();
                true
            }
            TextInputEvent::None => true,
        }
    }

    fn focused_list_len(&self) -> usize {
        let columns = self.store.column_names().len();
        match self.sidebar.focus {
            SidebarFocus::SeriesList => columns,
            SidebarFocus::CategoryList | SidebarFocus::MarkerColumn => columns + 1,
            SidebarFocus::SentinelValue => self
                .category_column
                .as_deref()
                .and_then(|c| self.enumerable_values(c))
                .and_then(|d| d.values().map(|v| v.len() + 1))
                .unwrap_or(0),
            SidebarFocus::MarkerValue => self
                .marker_column
                .as_deref()
                .and_then(|c| self.enumerable_values(c))
                .and_then(|d| d.values().map(|v| v.len() + 1))
                .unwrap_or(0),
            SidebarFocus::AssignValue => 0,
        }
    }

    fn move_focused_cursor(&mut self, up: bool) {
        let len = self.focused_list_len();
        let picker = match self.sidebar.focus {
            SidebarFocus::SeriesList => &mut self.sidebar.series,
            SidebarFocus::CategoryList => &mut self.sidebar.category,
            SidebarFocus::SentinelValue => &mut self.sidebar.sentinel,
            SidebarFocus::MarkerColumn => &mut self.sidebar.marker_column,
            SidebarFocus::MarkerValue => &mut self.sidebar.marker_value,
            SidebarFocus::AssignValue => return,
        };
        if up {
            picker.move_up();
        } else {
            picker.move_down(len);
        }
    }

    /// Apply the focused list's cursor as a selection/toggle.
    fn select_focused_item(&mut self) {
        let columns = self.store.column_names();
        match self.sidebar.focus {
            SidebarFocus::SeriesList => {
                let Some(name) = columns.get(self.sidebar.series.cursor) else {
                    return;
                };
                if let Some(pos) = self.selected_series.iter().position(|s| s == name) {
                    self.selected_series.remove(pos);
                } else {
                    self.selected_series.push(name.clone());
                }
            }
            SidebarFocus::CategoryList => {
                let cursor = self.sidebar.category.cursor;
                let chosen = if cursor == 0 {
                    None
                } else {
                    columns.get(cursor - 1).cloned()
                };
                if chosen != self.category_column {
                    self.category_column = chosen;
                    self.no_background_value = None;
                    self.sidebar.sentinel = Default::default();
                    self.sidebar.sentinel_input.clear();
                    if self.category_column.is_none() {
                        // Editing is disabled without a category column.
                        self.clear_selection();
                    }
                }
            }
            SidebarFocus::SentinelValue => {
                let Some(domain) = self
                    .category_column
                    .as_deref()
                    .and_then(|c| self.enumerable_values(c))
                else {
                    return;
                };
                let Some(values) = domain.values() else {
                    return;
                };
                let cursor = self.sidebar.sentinel.cursor;
                self.no_background_value = if cursor == 0 {
                    None
                } else {
                    values.get(cursor - 1).cloned()
                };
            }
            SidebarFocus::MarkerColumn => {
                let cursor = self.sidebar.marker_column.cursor;
                let chosen = if cursor == 0 {
                    None
                } else {
                    columns.get(cursor - 1).cloned()
                };
                if chosen != self.marker_column {
                    self.marker_column = chosen;
                    self.marker_value = None;
                    self.sidebar.marker_value = Default::default();
                    self.sidebar.marker_value_input.clear();
                }
            }
            SidebarFocus::MarkerValue => {
                let Some(domain) = self
                    .marker_column
                    .as_deref()
                    .and_then(|c| self.enumerable_values(c))
                else {
                    return;
                };
                let Some(values) = domain.values() else {
                    return;
                };
                let cursor = self.sidebar.marker_value.cursor;
                self.marker_value = if cursor == 0 {
                    None
                } else {
                    values.get(cursor - 1).cloned()
                };
            }
            SidebarFocus::AssignValue => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let Some(geometry) = self.plot_geometry else {
            return;
        };
        match mouse.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let Some(viewport) = self.viewport.as_mut() else {
                    return;
                };
                let direction = if mouse.kind == MouseEventKind::ScrollUp {
                    ZoomDirection::In
                } else {
                    ZoomDirection::Out
                };
                let focal = geometry.data_coords(mouse.column, mouse.row);
                if mouse.modifiers.contains(KeyModifiers::CONTROL) {
                    viewport.zoom_y(focal.map(|(_, y)| y), direction);
                } else {
                    viewport.zoom_x(focal.map(|(x, _)| x), direction);
                }
            }
            MouseEventKind::Down(button @ (MouseButton::Left | MouseButton::Right)) => {
                if let Some(origin) = geometry.data_coords(mouse.column, mouse.row) {
                    // Range selection only applies when a category column is
                    // active; pan always works.
                    if button == MouseButton::Left || self.category_column.is_some() {
                        self.drag = Some(DragState { button, origin });
                    }
                }
            }
            MouseEventKind::Drag(_) => {
                let Some(current) = geometry.data_coords(mouse.column, mouse.row) else {
                    return;
                };
                let Some(drag) = &self.drag else {
                    return;
                };
                match drag.button {
                    MouseButton::Left => {
                        let dx = current.0 - drag.origin.0;
                        let dy = current.1 - drag.origin.1;
                        if let Some(viewport) = self.viewport.as_mut() {
                            viewport.pan(dx, dy);
                        }
                    }
                    MouseButton::Right => {
                        let origin_x = drag.origin.0;
                        self.update_selection_from_drag(origin_x, current.0);
                    }
                    MouseButton::Middle => {}
                }
            }
            MouseEventKind::Up(_) => {
                self.drag = None;
            }
            _ => {}
        }
    }

    fn update_selection_from_drag(&mut self, x0: f64, x1: f64) {
        let segment_len = self.plot_data.segment_len;
        let Some((start, end)) = selection_from_drag(x0, x1, segment_len) else {
            return;
        };
        let offset = self.store.segment_offset(self.current_segment);
        let selection = (offset + start, offset + end);
        self.selection = Some(selection);
        self.status = StatusLine::Info(format!(
            "Selected rows {} to {} ({} rows)",
            selection.0,
            selection.1,
            end - start + 1
        ));
    }

    /// Selection translated to the active segment's local coordinates, when
    /// it overlaps the segment.
    fn selection_in_segment(&self) -> Option<(usize, usize)> {
        let (start, end) = self.selection?;
        let (seg_start, seg_end) = (
            self.store.segment_offset(self.current_segment),
            self.store.segment_offset(self.current_segment) + self.plot_data.segment_len,
        );
        if end < seg_start || start >= seg_end {
            return None;
        }
        let local_start = start.saturating_sub(seg_start);
        let local_end = end.min(seg_end.saturating_sub(1)) - seg_start;
        Some((local_start, local_end))
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = app_layout(
            area,
            self.compact,
            self.app_config.display.table_width_percent,
        );

        // Plot area first; its geometry is captured for pointer handling.
        let graph = graph_area(layout.plot);
        let viewport = self
            .viewport
            .unwrap_or_else(|| Viewport::new((0.0, 1.0), (0.0, 1.0)));
        self.plot_geometry = Some(PlotGeometry::new(graph, viewport));
        PlotView {
            data: &self.plot_data,
            viewport,
            theme: &self.theme,
            band_dim_percent: self.app_config.chart.band_dim_percent,
            show_series_legend: self.show_series_legend,
            show_band_legend: self.show_band_legend,
            selection: self.selection_in_segment(),
        }
        .render(layout.plot, buf);

        if let Some(table_area) = layout.table {
            let segment = self.store.segment(self.current_segment);
            self.table_offset = self
                .table_offset
                .min(segment.height().saturating_sub(1));
            DataTableView {
                segment: &segment,
                offset: self.table_offset,
                global_offset: self.store.segment_offset(self.current_segment),
                theme: &self.theme,
                row_numbers: self.app_config.display.row_numbers,
                cell_padding: self.app_config.display.table_cell_padding,
                selection: self.selection,
            }
            .render(table_area, buf);
        }

        if let Some(sidebar_area) = layout.sidebar {
            let columns = self.store.column_names();
            let category_domain = self
                .category_column
                .as_deref()
                .and_then(|c| self.enumerable_values(c));
            let marker_domain = self
                .marker_column
                .as_deref()
                .and_then(|c| self.enumerable_values(c));
            let ctx = SidebarContext {
                columns: &columns,
                selected_series: &self.selected_series,
                category_column: self.category_column.as_deref(),
                category_values: category_domain.as_deref().and_then(|d| d.values()),
                no_background_value: self.no_background_value.as_deref(),
                marker_column: self.marker_column.as_deref(),
                marker_values: marker_domain.as_deref().and_then(|d| d.values()),
                marker_value: self.marker_value.as_deref(),
            };
            render_sidebar(sidebar_area, buf, &mut self.sidebar, &ctx, &self.theme);
        }

        if let Some(bar_area) = layout.control_bar {
            let file = self
                .store
                .path()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(|s| s.to_string());
            let view = ControlsView {
                status: &self.status,
                file: file.as_deref(),
                dirty: self.store.is_dirty(),
                row_count: self.store.row_count(),
                segment: (self.current_segment + 1, self.store.segment_count()),
                selection: self.selection,
                theme: &self.theme,
            };
            (&view).render(bar_area, buf);

            // Prompt replaces the status line while active.
            if self.prompt != PromptMode::None && bar_area.height > 0 {
                let label = match self.prompt {
                    PromptMode::SaveAs => "Save as: ",
                    PromptMode::GoToSegment => "Go to segment: ",
                    PromptMode::None => unreachable!(),
                };
                let prompt_row = Rect::new(bar_area.x, bar_area.y, bar_area.width, 1);
                buf.set_string(
                    prompt_row.x,
                    prompt_row.y,
                    format!("{:width$}", "", width = prompt_row.width as usize),
                    Style::default(),
                );
                buf.set_string(
                    prompt_row.x,
                    prompt_row.y,
                    label,
                    Style::default().fg(self.theme.get("border_active")),
                );
                let input_area = Rect::new(
                    prompt_row.x + label.len() as u16,
                    prompt_row.y,
                    prompt_row.width.saturating_sub(label.len() as u16),
                    1,
                );
                self.prompt_input.set_focused(true);
                (&self.prompt_input).render(input_area, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use polars::prelude::*;
    use std::sync::mpsc::channel;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers,
        }
    }

    fn app_with(df: DataFrame) -> App {
        let (tx, _rx) = channel::<AppEvent>();
        let mut app = App::new(tx);
        app.load_frame(df).unwrap();
        app
    }

    fn edit_fixture() -> App {
        let mut app = app_with(
            df!(
                "cat" => ["a", "a", "b", "b", "b", "a", "c", "c", "a", "a"],
                "num" => (0..10).collect::<Vec<i32>>()
            )
            .unwrap(),
        );
        app.category_column = Some("cat".to_string());
        app.refresh_plot(false);
        app
    }

    fn render_once(app: &mut App) -> Buffer {
        let area = Rect::new(0, 0, 160, 48);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf
    }

    #[test]
    fn load_resets_view_state() {
        let app = app_with(df!("v" => [1_i64, 2, 3]).unwrap());
        assert_eq!(app.current_segment(), 0);
        assert!(app.selection().is_none());
        assert!(app.viewport().is_some());
        assert_eq!(app.store().segment_count(), 1);
    }

    #[test]
    fn edit_preserves_viewport_bit_identical() {
        let mut app = edit_fixture();
        render_once(&mut app);
        // Perturb the viewport so preservation is observable.
        app.viewport.as_mut().unwrap().pan(0.75, 0.25);
        let before = app.viewport().unwrap();

        app.selection = Some((2, 4));
        app.sidebar.assign_input.set_value("z".to_string());
        app.apply_edit();

        assert_eq!(app.viewport().unwrap(), before);
        assert!(app.selection().is_none());
        let cat = plot_data::column_strings(app.store().df(), "cat").unwrap();
        assert_eq!(cat, ["a", "a", "z", "z", "z", "a", "c", "c", "a", "a"]);
        assert!(app.store().is_dirty());
    }

    #[test]
    fn edit_without_selection_reports_error() {
        let mut app = edit_fixture();
        app.sidebar.assign_input.set_value("z".to_string());
        app.apply_edit();
        assert!(matches!(app.status, StatusLine::Error(_)));
        assert!(!app.store().is_dirty());
    }

    #[test]
    fn edit_with_blank_value_reports_error() {
        let mut app = edit_fixture();
        app.selection = Some((0, 1));
        app.apply_edit();
        assert!(matches!(app.status, StatusLine::Error(_)));
        assert!(!app.store().is_dirty());
    }

    #[test]
    fn segment_navigation_clears_selection_and_resets_viewport() {
        let mut app = app_with(
            df!("v" => (0..100_000).collect::<Vec<i64>>()).unwrap(),
        );
        assert_eq!(app.store().segment_count(), 3);
        app.selection = Some((10, 20));
        // Perturb the viewport so the reset is observable.
        app.viewport.as_mut().unwrap().pan(100.0, 5.0);
        let perturbed = app.viewport().unwrap();

        app.next_segment();
        assert_eq!(app.current_segment(), 1);
        assert!(app.selection().is_none());
        let reset = app.viewport().unwrap();
        assert_ne!(reset, perturbed);
        assert_eq!(reset.x.0, -0.5);
    }

    #[test]
    fn wheel_zoom_is_cursor_centered_and_axis_split() {
        let mut app = app_with(
            df!("v" => (0..100).map(|i| i as f64).collect::<Vec<f64>>()).unwrap(),
        );
        render_once(&mut app);
        let geometry = app.plot_geometry.unwrap();
        let before = app.viewport().unwrap();

        // Zoom at a known graph cell.
        let area = Rect::new(0, 0, 160, 48);
        let layout = app_layout(area, false, 30);
        let graph = graph_area(layout.plot);
        let col = graph.x + graph.width / 2;
        let row = graph.y + graph.height / 2;
        let focal = geometry.data_coords(col, row).unwrap();

        app.handle_mouse(&mouse(MouseEventKind::ScrollUp, col, row, KeyModifiers::NONE));
        let after = app.viewport().unwrap();
        // X shrank around the focal point; Y untouched.
        assert!(after.x.1 - after.x.0 < before.x.1 - before.x.0);
        assert_eq!(after.y, before.y);
        let rel_before = (focal.0 - before.x.0) / (before.x.1 - before.x.0);
        let rel_after = (focal.0 - after.x.0) / (after.x.1 - after.x.0);
        assert!((rel_before - rel_after).abs() < 1e-9);

        // Ctrl-wheel zooms the y axis only.
        let before_y = app.viewport().unwrap();
        app.handle_mouse(&mouse(
            MouseEventKind::ScrollDown,
            col,
            row,
            KeyModifiers::CONTROL,
        ));
        let after_y = app.viewport().unwrap();
        assert_eq!(after_y.x, before_y.x);
        assert!(after_y.y.1 - after_y.y.0 > before_y.y.1 - before_y.y.0);
    }

    #[test]
    fn right_drag_selects_global_rows_in_second_segment() {
        let mut app = app_with(
            df!(
                "cat" => vec!["x"; 100_000],
                "v" => (0..100_000).collect::<Vec<i64>>()
            )
            .unwrap(),
        );
        app.category_column = Some("cat".to_string());
        app.set_segment(1);
        render_once(&mut app);

        let area = Rect::new(0, 0, 160, 48);
        let layout = app_layout(area, false, 30);
        let graph = graph_area(layout.plot);
        let row = graph.y + 2;
        app.handle_mouse(&mouse(
            MouseEventKind::Down(MouseButton::Right),
            graph.x + 2,
            row,
            KeyModifiers::NONE,
        ));
        app.handle_mouse(&mouse(
            MouseEventKind::Drag(MouseButton::Right),
            graph.x + graph.width / 2,
            row,
            KeyModifiers::NONE,
        ));
        app.handle_mouse(&mouse(
            MouseEventKind::Up(MouseButton::Right),
            graph.x + graph.width / 2,
            row,
            KeyModifiers::NONE,
        ));

        let (start, end) = app.selection().unwrap();
        // Global indices live inside the second segment.
        assert!(start >= SEGMENT_ROWS);
        assert!(end < 2 * SEGMENT_ROWS);
        assert!(end > start);
    }

    #[test]
    fn right_drag_needs_category_column() {
        let mut app = app_with(df!("v" => (0..100).collect::<Vec<i64>>()).unwrap());
        render_once(&mut app);
        let area = Rect::new(0, 0, 160, 48);
        let layout = app_layout(area, false, 30);
        let graph = graph_area(layout.plot);
        app.handle_mouse(&mouse(
            MouseEventKind::Down(MouseButton::Right),
            graph.x + 2,
            graph.y + 2,
            KeyModifiers::NONE,
        ));
        app.handle_mouse(&mouse(
            MouseEventKind::Drag(MouseButton::Right),
            graph.x + 10,
            graph.y + 2,
            KeyModifiers::NONE,
        ));
        assert!(app.selection().is_none());
    }

    #[test]
    fn left_drag_pans_content_locked() {
        let mut app = app_with(df!("v" => (0..100).collect::<Vec<i64>>()).unwrap());
        render_once(&mut app);
        let before = app.viewport().unwrap();
        let area = Rect::new(0, 0, 160, 48);
        let layout = app_layout(area, false, 30);
        let graph = graph_area(layout.plot);
        let y = graph.y + graph.height / 2;
        app.handle_mouse(&mouse(
            MouseEventKind::Down(MouseButton::Left),
            graph.x + 20,
            y,
            KeyModifiers::NONE,
        ));
        app.handle_mouse(&mouse(
            MouseEventKind::Drag(MouseButton::Left),
            graph.x + 10,
            y,
            KeyModifiers::NONE,
        ));
        let after = app.viewport().unwrap();
        // Dragging left moves the view right (content follows the cursor).
        assert!(after.x.0 > before.x.0);
        assert!((after.x.1 - after.x.0) - (before.x.1 - before.x.0) < 1e-9);
    }

    #[test]
    fn legend_toggle_preserves_viewport() {
        let mut app = edit_fixture();
        app.viewport.as_mut().unwrap().pan(1.5, 0.0);
        let before = app.viewport().unwrap();
        app.handle_key(&key(KeyCode::Char('l')));
        assert_eq!(app.viewport().unwrap(), before);
        assert!(!app.show_series_legend);
    }

    #[test]
    fn sidebar_selection_drives_render_request() {
        let mut app = app_with(
            df!(
                "a" => [1.0_f64, 2.0],
                "b" => [3.0_f64, 4.0],
                "cat" => ["x", "y"]
            )
            .unwrap(),
        );
        // Request falls back to the first column when nothing is selected.
        let request = app.assemble_request();
        assert_eq!(request.series_columns, ["a"]);

        // Toggle "b" through the sidebar.
        app.sidebar.focus = SidebarFocus::SeriesList;
        app.handle_key(&key(KeyCode::Down));
        app.handle_key(&key(KeyCode::Enter));
        let request = app.assemble_request();
        assert_eq!(request.series_columns, ["b"]);

        // Pick "cat" as category (list has the none entry first).
        app.sidebar.focus = SidebarFocus::CategoryList;
        app.handle_key(&key(KeyCode::Down));
        app.handle_key(&key(KeyCode::Down));
        app.handle_key(&key(KeyCode::Down));
        app.handle_key(&key(KeyCode::Enter));
        assert_eq!(app.category_column.as_deref(), Some("cat"));
        let request = app.assemble_request();
        assert_eq!(request.category_column.as_deref(), Some("cat"));
    }

    #[test]
    fn go_to_segment_prompt() {
        let mut app = app_with(
            df!("v" => (0..200_000).collect::<Vec<i64>>()).unwrap(),
        );
        app.handle_key(&key(KeyCode::Char('g')));
        for c in "3".chars() {
            app.handle_key(&key(KeyCode::Char(c)));
        }
        app.handle_key(&key(KeyCode::Enter));
        assert_eq!(app.current_segment(), 2);

        // Out-of-range numbers clamp to the last segment.
        app.handle_key(&key(KeyCode::Char('g')));
        app.handle_key(&key(KeyCode::Char('9')));
        app.handle_key(&key(KeyCode::Char('9')));
        app.handle_key(&key(KeyCode::Enter));
        assert_eq!(app.current_segment(), app.store().segment_count() - 1);
    }

    #[test]
    fn quit_key_emits_exit() {
        let mut app = app_with(df!("v" => [1_i64]).unwrap());
        assert!(matches!(
            app.handle_key(&key(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
    }

    #[test]
    fn compact_mode_toggles_on_escape() {
        let mut app = app_with(df!("v" => [1_i64]).unwrap());
        assert!(!app.compact);
        app.handle_key(&key(KeyCode::Esc));
        assert!(app.compact);
        app.handle_key(&key(KeyCode::Esc));
        assert!(!app.compact);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut app = app_with(df!("v" => [1_i64, 2, 3]).unwrap());
        let event = AppEvent::DoLoad(PathBuf::from("/nonexistent/x.csv"), OpenOptions::new());
        app.event(&event);
        assert!(matches!(app.status, StatusLine::Error(_)));
        assert_eq!(app.store().row_count(), 3);
    }

    #[test]
    fn open_event_defers_to_do_load() {
        let mut app = app_with(df!("v" => [1_i64]).unwrap());
        let follow_up = app.event(&AppEvent::Open(
            PathBuf::from("data.csv"),
            OpenOptions::new(),
        ));
        assert!(matches!(follow_up, Some(AppEvent::DoLoad(_, _))));
    }
}
