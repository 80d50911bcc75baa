//! Read-only table view of the active segment.

use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::config::Theme;
use crate::domain::cell_string;

const MAX_COLUMN_WIDTH: usize = 20;

/// Column widths for the visible slice: max of header and visible cell
/// strings, capped at `MAX_COLUMN_WIDTH`.
pub fn column_widths(segment: &DataFrame, offset: usize, visible_rows: usize) -> Vec<usize> {
    segment
        .get_columns()
        .iter()
        .map(|column| {
            let mut width = column.name().chars().count();
            let series = column.as_materialized_series();
            let end = (offset + visible_rows).min(series.len());
            for i in offset..end {
                if let Ok(value) = series.get(i) {
                    width = width.max(cell_string(&value).chars().count());
                }
            }
            width.min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else if width > 1 {
        let kept: String = text.chars().take(width - 1).collect();
        format!("{}…", kept)
    } else {
        text.chars().take(width).collect()
    }
}

pub struct DataTableView<'a> {
    pub segment: &'a DataFrame,
    /// First visible segment-local row.
    pub offset: usize,
    /// Global index of the segment's first row, for row numbers.
    pub global_offset: usize,
    pub theme: &'a Theme,
    pub row_numbers: bool,
    pub cell_padding: usize,
    /// Global inclusive row range to highlight.
    pub selection: Option<(usize, usize)>,
}

impl Widget for DataTableView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height < 2 || self.segment.width() == 0 {
            return;
        }
        let visible_rows = (area.height - 1) as usize;
        let widths = column_widths(self.segment, self.offset, visible_rows);
        let segment_len = self.segment.height();

        let number_width = if self.row_numbers {
            format!("{}", self.global_offset + segment_len).len().max(3)
        } else {
            0
        };

        let header_style = Style::default()
            .fg(self.theme.get("table_header"))
            .add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(self.theme.get("text_primary"));
        let number_style = Style::default().fg(self.theme.get("row_numbers"));
        let selected_style = Style::default()
            .fg(self.theme.get("text_primary"))
            .add_modifier(Modifier::REVERSED);

        // Header row.
        let mut x = area.x + number_width as u16 + if self.row_numbers { 1 } else { 0 };
        for (column, width) in self.segment.get_columns().iter().zip(&widths) {
            if x >= area.x + area.width {
                break;
            }
            let remaining = (area.x + area.width - x) as usize;
            let name = truncate(column.name(), (*width).min(remaining));
            buf.set_string(x, area.y, &name, header_style);
            x += (*width + self.cell_padding) as u16;
        }

        // Data rows.
        let columns: Vec<Series> = self
            .segment
            .get_columns()
            .iter()
            .map(|c| c.as_materialized_series().clone())
            .collect();
        for line in 0..visible_rows {
            let row = self.offset + line;
            if row >= segment_len {
                break;
            }
            let y = area.y + 1 + line as u16;
            let global_row = self.global_offset + row;
            let in_selection = self
                .selection
                .map(|(start, end)| global_row >= start && global_row <= end)
                .unwrap_or(false);
            let row_style = if in_selection { selected_style } else { text_style };

            let mut x = area.x;
            if self.row_numbers {
                let number = format!("{:>width$}", global_row, width = number_width);
                buf.set_string(x, y, &number, number_style);
                x += number_width as u16 + 1;
            }
            for (series, width) in columns.iter().zip(&widths) {
                if x >= area.x + area.width {
                    break;
                }
                let remaining = (area.x + area.width - x) as usize;
                let text = series
                    .get(row)
                    .map(|v| cell_string(&v))
                    .unwrap_or_default();
                let text = truncate(&text, (*width).min(remaining));
                buf.set_string(x, y, &text, row_style);
                x += (*width + self.cell_padding) as u16;
            }
        }
    }
}
