//! Prepare render primitives for one plot from the active segment: series
//! points, colored background spans, and marker indices.

use polars::prelude::*;
use ratatui::style::Color;

use crate::domain::{cell_string, CategoryDomain};
use crate::palette;

/// Everything the UI has chosen for one render, assembled as one immutable
/// value before the render call so the primitive builders never reach into
/// widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Numeric columns drawn as line series. When empty, callers substitute
    /// the first dataset column before building the request.
    pub series_columns: Vec<String>,
    /// Categorical column rendered as background bands.
    pub category_column: Option<String>,
    /// Category value excluded from background coloring.
    pub no_background_value: Option<String>,
    /// Column searched for marker rows.
    pub marker_column: Option<String>,
    /// Value whose rows get vertical marker lines. None disables markers.
    pub marker_value: Option<String>,
    pub show_series_legend: bool,
    pub show_band_legend: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            series_columns: Vec::new(),
            category_column: None,
            no_background_value: None,
            marker_column: None,
            marker_value: None,
            show_series_legend: true,
            show_band_legend: true,
        }
    }
}

/// Category value → color, insertion-ordered by the domain's sorted values
/// with the no-background sentinel filtered out. Rebuilt fresh per render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorMap {
    entries: Vec<(String, Color)>,
}

impl ColorMap {
    /// Build from an enumerable domain; an unbounded domain has no colors.
    pub fn from_domain(domain: &CategoryDomain, no_background: Option<&str>) -> ColorMap {
        let Some(values) = domain.values() else {
            return ColorMap::default();
        };
        let filtered: Vec<&String> = values
            .iter()
            .filter(|v| no_background != Some(v.as_str()))
            .collect();
        let colors = palette::generate(filtered.len());
        ColorMap {
            entries: filtered
                .into_iter()
                .cloned()
                .zip(colors)
                .collect(),
        }
    }

    pub fn color_of(&self, value: &str) -> Option<Color> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
    }

    pub fn entries(&self) -> &[(String, Color)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A run of one categorical value, `[start, end)` in segment-local row
/// indices, with its assigned color.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpan {
    pub start: usize,
    pub end: usize,
    pub value: String,
    pub color: Color,
}

/// Compress a categorical column into colored background spans: one span per
/// run of equal values, skipping runs equal to the sentinel or missing from
/// the color map. Emitted spans are sorted and non-overlapping.
pub fn encode_background_spans(
    values: &[String],
    no_background: Option<&str>,
    color_map: &ColorMap,
) -> Vec<BackgroundSpan> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mut spans = Vec::new();
    let mut run_start = 0;
    for i in 1..=n {
        let end_of_run = i == n || values[i] != values[run_start];
        if !end_of_run {
            continue;
        }
        let value = &values[run_start];
        if no_background != Some(value.as_str()) {
            if let Some(color) = color_map.color_of(value) {
                spans.push(BackgroundSpan {
                    start: run_start,
                    end: i,
                    value: value.clone(),
                    color,
                });
            }
        }
        run_start = i;
    }
    spans
}

/// Segment-local indices of rows whose stringified value equals `target`.
/// A missing target disables the marker feature entirely.
pub fn locate_markers(values: &[String], target: Option<&str>) -> Vec<usize> {
    let Some(target) = target else {
        return Vec::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.as_str() == target)
        .map(|(i, _)| i)
        .collect()
}

/// Stringified cell values of one column in the given frame.
pub fn column_strings(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(column)?.as_materialized_series();
    Ok(series.iter().map(|v| cell_string(&v)).collect())
}

/// One line series: column name plus `(local row index, value)` points.
/// Rows whose value is null or non-finite are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Convert the requested columns of a segment to plottable points. The x
/// axis is the local row index.
pub fn prepare_series(segment: &DataFrame, columns: &[String]) -> PolarsResult<Vec<SeriesData>> {
    let mut out = Vec::with_capacity(columns.len());
    for name in columns {
        let series = segment.column(name)?.as_materialized_series();
        // Non-strict cast: non-numeric cells become null and are skipped.
        let casted = series.cast(&DataType::Float64)?;
        let ca = casted.f64()?;
        let mut points = Vec::with_capacity(segment.height());
        for (i, value) in ca.into_iter().enumerate() {
            if let Some(y) = value {
                if y.is_finite() {
                    points.push((i as f64, y));
                }
            }
        }
        out.push(SeriesData {
            name: name.clone(),
            points,
        });
    }
    Ok(out)
}

/// Render-ready primitives for one plot of the active segment.
#[derive(Debug, Clone, Default)]
pub struct PlotData {
    pub series: Vec<SeriesData>,
    pub spans: Vec<BackgroundSpan>,
    pub markers: Vec<usize>,
    pub color_map: ColorMap,
    pub segment_len: usize,
    /// Series value extent across all plotted points; `(0, 1)` placeholder
    /// when nothing is plottable.
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotData {
    fn default_bounds() -> (f64, f64) {
        (0.0, 1.0)
    }
}

/// Build every primitive for one render. `category_domain` is the cached
/// full-column domain of the request's category column, when there is one.
pub fn prepare_plot_data(
    segment: &DataFrame,
    request: &RenderRequest,
    category_domain: Option<&CategoryDomain>,
) -> PolarsResult<PlotData> {
    let segment_len = segment.height();

    let series = prepare_series(segment, &request.series_columns)?;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in &series {
        for &(_, y) in &s.points {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if y_max < y_min {
        (y_min, y_max) = PlotData::default_bounds();
    }

    let color_map = match (&request.category_column, category_domain) {
        (Some(_), Some(domain)) => {
            ColorMap::from_domain(domain, request.no_background_value.as_deref())
        }
        _ => ColorMap::default(),
    };

    let spans = match &request.category_column {
        Some(category) if !color_map.is_empty() => {
            let values = column_strings(segment, category)?;
            encode_background_spans(&values, request.no_background_value.as_deref(), &color_map)
        }
        _ => Vec::new(),
    };

    let markers = match (&request.marker_column, &request.marker_value) {
        (Some(column), Some(target)) => {
            let values = column_strings(segment, column)?;
            locate_markers(&values, Some(target))
        }
        _ => Vec::new(),
    };

    Ok(PlotData {
        series,
        spans,
        markers,
        color_map,
        segment_len,
        y_min,
        y_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn map_for(values: &[&str], no_background: Option<&str>) -> ColorMap {
        let mut sorted: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        sorted.sort();
        sorted.dedup();
        ColorMap::from_domain(&CategoryDomain::Enumerable(sorted), no_background)
    }

    #[test]
    fn color_map_skips_sentinel_and_keeps_order() {
        let map = map_for(&["a", "b", "c"], Some("b"));
        assert_eq!(map.entries().len(), 2);
        assert_eq!(map.entries()[0].0, "a");
        assert_eq!(map.entries()[1].0, "c");
        assert!(map.color_of("b").is_none());
    }

    #[test]
    fn color_map_unbounded_is_empty() {
        let map = ColorMap::from_domain(&CategoryDomain::Unbounded, None);
        assert!(map.is_empty());
    }

    #[test]
    fn color_map_is_deterministic() {
        let a = map_for(&["x", "y", "z"], None);
        let b = map_for(&["x", "y", "z"], None);
        assert_eq!(a, b);
    }

    #[test]
    fn spans_partition_runs() {
        let values = strings(&["a", "a", "b", "b", "b", "a"]);
        let map = map_for(&["a", "b"], None);
        let spans = encode_background_spans(&values, None, &map);
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].start, spans[0].end, spans[0].value.as_str()), (0, 2, "a"));
        assert_eq!((spans[1].start, spans[1].end, spans[1].value.as_str()), (2, 5, "b"));
        assert_eq!((spans[2].start, spans[2].end, spans[2].value.as_str()), (5, 6, "a"));
    }

    #[test]
    fn spans_reexpand_to_original_sequence_minus_exclusions() {
        let values = strings(&["a", "a", "none", "b", "b", "a", "none", "none", "c"]);
        let map = map_for(&["a", "b", "c", "none"], Some("none"));
        let spans = encode_background_spans(&values, Some("none"), &map);

        // Sorted, non-overlapping.
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }

        // Re-expansion matches every non-sentinel row and nothing else.
        let mut reconstructed: Vec<Option<String>> = vec![None; values.len()];
        for span in &spans {
            for slot in reconstructed.iter_mut().take(span.end).skip(span.start) {
                assert!(slot.is_none());
                *slot = Some(span.value.clone());
            }
        }
        for (i, value) in values.iter().enumerate() {
            if value == "none" {
                assert_eq!(reconstructed[i], None);
            } else {
                assert_eq!(reconstructed[i].as_deref(), Some(value.as_str()));
            }
        }
    }

    #[test]
    fn spans_skip_values_missing_from_color_map() {
        let values = strings(&["a", "q", "q", "a"]);
        let map = map_for(&["a"], None);
        let spans = encode_background_spans(&values, None, &map);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.value == "a"));
    }

    #[test]
    fn spans_empty_and_single_row() {
        let map = map_for(&["a"], None);
        assert!(encode_background_spans(&[], None, &map).is_empty());

        let single = encode_background_spans(&strings(&["a"]), None, &map);
        assert_eq!(single.len(), 1);
        assert_eq!((single[0].start, single[0].end), (0, 1));

        // A lone sentinel row yields nothing.
        let sentinel = encode_background_spans(&strings(&["a"]), Some("a"), &map);
        assert!(sentinel.is_empty());
    }

    #[test]
    fn markers_match_target_rows() {
        let values = strings(&["x", "hit", "x", "hit", "hit"]);
        assert_eq!(locate_markers(&values, Some("hit")), vec![1, 3, 4]);
        assert!(locate_markers(&values, Some("miss")).is_empty());
    }

    #[test]
    fn markers_disabled_without_target() {
        let values = strings(&["x", "y"]);
        assert!(locate_markers(&values, None).is_empty());
    }

    #[test]
    fn series_points_use_local_index_and_skip_gaps() {
        let segment = df!(
            "v" => vec![Some(1.0_f64), None, Some(3.0), Some(f64::NAN), Some(5.0)]
        )
        .unwrap();
        let series = prepare_series(&segment, &["v".to_string()]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![(0.0, 1.0), (2.0, 3.0), (4.0, 5.0)]);
    }

    #[test]
    fn non_numeric_series_yields_no_points() {
        let segment = df!("v" => ["a", "b", "c"]).unwrap();
        let series = prepare_series(&segment, &["v".to_string()]).unwrap();
        assert!(series[0].points.is_empty());
    }

    #[test]
    fn prepare_plot_data_assembles_everything() {
        let segment = df!(
            "y" => [1.0_f64, 2.0, 3.0, 4.0],
            "cat" => ["a", "a", "b", "b"],
            "flag" => ["0", "1", "0", "1"]
        )
        .unwrap();
        let domain =
            CategoryDomain::Enumerable(vec!["a".to_string(), "b".to_string()]);
        let request = RenderRequest {
            series_columns: vec!["y".to_string()],
            category_column: Some("cat".to_string()),
            marker_column: Some("flag".to_string()),
            marker_value: Some("1".to_string()),
            ..Default::default()
        };
        let data = prepare_plot_data(&segment, &request, Some(&domain)).unwrap();
        assert_eq!(data.segment_len, 4);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.spans.len(), 2);
        assert_eq!(data.markers, vec![1, 3]);
        assert_eq!(data.y_min, 1.0);
        assert_eq!(data.y_max, 4.0);
        assert_eq!(data.color_map.entries().len(), 2);
    }

    #[test]
    fn prepare_plot_data_without_selections_is_empty() {
        let segment = df!("y" => [1.0_f64, 2.0]).unwrap();
        let request = RenderRequest::default();
        let data = prepare_plot_data(&segment, &request, None).unwrap();
        assert!(data.series.is_empty());
        assert!(data.spans.is_empty());
        assert!(data.markers.is_empty());
        assert_eq!((data.y_min, data.y_max), (0.0, 1.0));
    }
}
