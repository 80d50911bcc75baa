//! Panel arithmetic for the main screen: table, picker sidebar, plot, and
//! the control bar. Compact mode collapses everything but the plot.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const SIDEBAR_WIDTH: u16 = 34;
pub const CONTROL_BAR_HEIGHT: u16 = 2;

/// Top-level layout. In compact mode only `plot` is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub table: Option<Rect>,
    pub sidebar: Option<Rect>,
    pub plot: Rect,
    pub control_bar: Option<Rect>,
}

/// Split the terminal area: main view on top, control bar at the bottom;
/// the main view splits into data table, picker sidebar, and plot. In
/// compact mode the plot takes the whole terminal.
pub fn app_layout(area: Rect, compact: bool, table_width_percent: u16) -> AppLayout {
    if compact {
        return AppLayout {
            table: None,
            sidebar: None,
            plot: area,
            control_bar: None,
        };
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(CONTROL_BAR_HEIGHT)])
        .split(area);
    let main_view = rows[0];
    let control_bar = rows[1];

    let table_percent = table_width_percent.min(70);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(table_percent),
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(main_view);

    AppLayout {
        table: Some(columns[0]),
        sidebar: Some(columns[1]),
        plot: columns[2],
        control_bar: Some(control_bar),
    }
}
