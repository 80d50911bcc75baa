//! Plot area rendering: viewport-bounded axes, line series, background
//! bands, marker lines, selection highlight, and legends.
//!
//! Bands and the selection are painted as cell backgrounds after the series
//! canvas renders, so braille line symbols stay intact on top of them.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Paragraph, Widget,
    },
};

use crate::config::Theme;
use crate::plot_data::{BackgroundSpan, PlotData};
use crate::viewport::{PlotGeometry, Viewport};

const Y_LABEL_WIDTH: u16 = 10;
const X_LABEL_HEIGHT: u16 = 1;

pub const SERIES_COLORS: [&str; 7] = [
    "chart_series_color_1",
    "chart_series_color_2",
    "chart_series_color_3",
    "chart_series_color_4",
    "chart_series_color_5",
    "chart_series_color_6",
    "chart_series_color_7",
];

/// Format a numeric axis tick.
pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Graph sub-rectangle of the plot area after reserving the y-label gutter
/// and the x-label row. Pure, so pointer handling can map terminal cells to
/// data coordinates with the same arithmetic the renderer used.
pub fn graph_area(area: Rect) -> Rect {
    if area.width <= Y_LABEL_WIDTH + 1 || area.height <= X_LABEL_HEIGHT {
        return Rect::new(area.x, area.y, 0, 0);
    }
    Rect::new(
        area.x + Y_LABEL_WIDTH,
        area.y,
        area.width - Y_LABEL_WIDTH,
        area.height - X_LABEL_HEIGHT,
    )
}

/// Dim an RGB color toward the (black) terminal background by `percent`.
/// Stands in for the band alpha of the original plot; non-RGB colors pass
/// through unchanged.
pub fn dim_color(color: Color, percent: u8) -> Color {
    let keep = (100u16.saturating_sub(percent as u16)).min(100) as u32;
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as u32 * keep / 100) as u8,
            (g as u32 * keep / 100) as u8,
            (b as u32 * keep / 100) as u8,
        ),
        other => other,
    }
}

/// Color of the span covering a segment-local row, if any. Spans are sorted
/// by start and non-overlapping.
pub fn span_color_at(spans: &[BackgroundSpan], row: usize) -> Option<Color> {
    let idx = spans.partition_point(|s| s.start <= row);
    if idx == 0 {
        return None;
    }
    let span = &spans[idx - 1];
    (row < span.end).then_some(span.color)
}

pub struct PlotView<'a> {
    pub data: &'a PlotData,
    pub viewport: Viewport,
    pub theme: &'a Theme,
    pub band_dim_percent: u8,
    pub show_series_legend: bool,
    pub show_band_legend: bool,
    /// Segment-local inclusive row range to highlight.
    pub selection: Option<(usize, usize)>,
}

impl PlotView<'_> {
    fn render_axis_labels(&self, area: Rect, graph: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.get("text_secondary"));
        let (y0, y1) = self.viewport.y;
        let (x0, x1) = self.viewport.x;

        let gutter_width = (graph.x - area.x).saturating_sub(1) as usize;
        let mut y_label = |value: f64, row: u16| {
            let text = format_axis_label(value);
            let text: String = text.chars().take(gutter_width).collect();
            let x = area.x + gutter_width.saturating_sub(text.len()) as u16;
            buf.set_string(x, row, &text, style);
        };
        y_label(y1, graph.y);
        y_label((y0 + y1) / 2.0, graph.y + graph.height / 2);
        y_label(y0, graph.y + graph.height.saturating_sub(1));

        let label_row = graph.y + graph.height;
        let left = format_axis_label(x0);
        let mid = format_axis_label((x0 + x1) / 2.0);
        let right = format_axis_label(x1);
        buf.set_string(graph.x, label_row, &left, style);
        let mid_x = graph.x + graph.width / 2;
        buf.set_string(
            mid_x.saturating_sub((mid.len() / 2) as u16),
            label_row,
            &mid,
            style,
        );
        let right_x = (graph.x + graph.width).saturating_sub(right.len() as u16);
        buf.set_string(right_x, label_row, &right, style);
    }

    fn render_series_canvas(&self, graph: Rect, buf: &mut Buffer) {
        let data = self.data;
        let theme = self.theme;
        let viewport = self.viewport;
        let marker_color = theme.get("marker");

        let canvas = Canvas::default()
            .x_bounds([viewport.x.0, viewport.x.1])
            .y_bounds([viewport.y.0, viewport.y.1])
            .marker(symbols::Marker::Braille)
            .paint(|ctx| {
                for (i, series) in data.series.iter().enumerate() {
                    let color = theme.get(SERIES_COLORS[i % SERIES_COLORS.len()]);
                    for pair in series.points.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].0,
                            y1: pair[0].1,
                            x2: pair[1].0,
                            y2: pair[1].1,
                            color,
                        });
                    }
                }
                if !data.markers.is_empty() {
                    ctx.layer();
                    for &idx in &data.markers {
                        ctx.draw(&CanvasLine {
                            x1: idx as f64,
                            y1: viewport.y.0,
                            x2: idx as f64,
                            y2: viewport.y.1,
                            color: marker_color,
                        });
                    }
                }
            });
        canvas.render(graph, buf);
    }

    fn paint_backgrounds(&self, graph: Rect, buf: &mut Buffer) {
        let geom = PlotGeometry::new(graph, self.viewport);
        let selection_color = dim_color(self.theme.get("selection"), 50);
        for col in graph.x..graph.x + graph.width {
            let Some((x, _)) = geom.data_coords(col, graph.y) else {
                continue;
            };
            let row = x.round();
            if row < 0.0 || row >= self.data.segment_len as f64 {
                continue;
            }
            let row = row as usize;

            let mut bg = span_color_at(&self.data.spans, row)
                .map(|c| dim_color(c, self.band_dim_percent));
            if let Some((start, end)) = self.selection {
                if row >= start && row <= end {
                    bg = Some(selection_color);
                }
            }
            if let Some(bg) = bg {
                for row_cell in graph.y..graph.y + graph.height {
                    buf[(col, row_cell)].set_bg(bg);
                }
            }
        }
    }

    fn render_legends(&self, graph: Rect, buf: &mut Buffer) {
        if self.show_series_legend {
            for (i, series) in self.data.series.iter().enumerate() {
                let row = graph.y + i as u16;
                if row >= graph.y + graph.height {
                    break;
                }
                let color = self.theme.get(SERIES_COLORS[i % SERIES_COLORS.len()]);
                let label = format!("── {}", series.name);
                let x = (graph.x + graph.width).saturating_sub(label.chars().count() as u16 + 1);
                buf.set_string(x, row, &label, Style::default().fg(color));
            }
        }
        if self.show_band_legend {
            for (i, (value, color)) in self.data.color_map.entries().iter().enumerate() {
                let row = graph.y + i as u16;
                if row >= graph.y + graph.height {
                    break;
                }
                let label = format!("■ {}", value);
                buf.set_string(graph.x + 1, row, &label, Style::default().fg(*color));
            }
        }
    }
}

impl Widget for PlotView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let graph = graph_area(area);
        if graph.width == 0 || graph.height == 0 {
            return;
        }

        if self.data.segment_len == 0 {
            let hint_row = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
            Paragraph::new(Line::from(Span::styled(
                "No data loaded — open a CSV file",
                Style::default().fg(self.theme.get("text_secondary")),
            )))
            .centered()
            .render(hint_row, buf);
            return;
        }

        self.render_axis_labels(area, graph, buf);
        self.render_series_canvas(graph, buf);
        self.paint_backgrounds(graph, buf);
        self.render_legends(graph, buf);
    }
}
