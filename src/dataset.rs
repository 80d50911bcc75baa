//! Dataset ownership: CSV load/save, fixed-size segmentation for oversized
//! tables, and bounded-range categorical mutation.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::{cell_string, CategoryDomain, DomainCache};
use crate::error::DataError;
use std::sync::Arc;

/// Rows per segment once segmentation activates.
pub const SEGMENT_ROWS: usize = 45_000;
/// Datasets at or below this row count render as a single segment.
pub const SEGMENT_THRESHOLD: usize = 90_000;

/// CSV reading options, CLI/config-sourced.
#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: bool,
    pub infer_schema_length: Option<usize>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            infer_schema_length: Some(1000),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn read_csv(path: &Path, options: &OpenOptions) -> PolarsResult<DataFrame> {
    let pl_path = PlPathRef::from_local_path(path).into_owned();
    let mut reader = LazyCsvReader::new(pl_path);
    if let Some(delimiter) = options.delimiter {
        reader = reader.with_separator(delimiter);
    }
    reader = reader.with_has_header(options.has_header);
    if let Some(n) = options.infer_schema_length {
        reader = reader.with_infer_schema_length(Some(n));
    }
    reader = reader.with_try_parse_dates(true);
    reader.finish()?.collect()
}

/// Owns the table, its per-column domain cache, and the dirty flag. All
/// mutation flows through `mutate_range`; everything else is a read.
#[derive(Debug, Default, Clone)]
pub struct DatasetStore {
    df: DataFrame,
    path: Option<PathBuf>,
    dirty: bool,
    domains: DomainCache,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dataset with the contents of a CSV file and eagerly
    /// analyze every column's domain. On failure the previous dataset,
    /// cache, and path are left untouched.
    pub fn load_path(&mut self, path: &Path, options: &OpenOptions) -> Result<(), DataError> {
        let df = read_csv(path, options).map_err(|source| DataError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.install(df, Some(path.to_path_buf()))?;
        tracing::info!(
            path = %path.display(),
            rows = self.df.height(),
            columns = self.df.width(),
            segments = self.segment_count(),
            "dataset loaded"
        );
        Ok(())
    }

    /// Replace the dataset with an in-memory frame (tests and programmatic
    /// callers).
    pub fn load_frame(&mut self, df: DataFrame) -> Result<(), DataError> {
        self.install(df, None)
    }

    fn install(&mut self, df: DataFrame, path: Option<PathBuf>) -> Result<(), DataError> {
        let mut domains = DomainCache::default();
        domains.recompute_all(&df)?;
        self.df = df;
        self.domains = domains;
        self.path = path;
        self.dirty = false;
        Ok(())
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.df.get_column_names().iter().any(|name| name.as_str() == column)
    }

    /// Cached domain classification for a column.
    pub fn domain(&self, column: &str) -> Option<Arc<CategoryDomain>> {
        self.domains.domain(column)
    }

    /// Number of fixed-size windows over the current dataset. One segment
    /// up to `SEGMENT_THRESHOLD` rows, then `ceil(n / SEGMENT_ROWS)`.
    pub fn segment_count(&self) -> usize {
        let n = self.df.height();
        if n > SEGMENT_THRESHOLD {
            n.div_ceil(SEGMENT_ROWS)
        } else {
            1
        }
    }

    /// Global half-open row range `[start, end)` of a segment. `index` must
    /// be below `segment_count`; callers clamp before asking.
    pub fn segment_bounds(&self, index: usize) -> (usize, usize) {
        let n = self.df.height();
        if self.segment_count() == 1 {
            return (0, n);
        }
        debug_assert!(index < self.segment_count());
        let start = (index * SEGMENT_ROWS).min(n);
        let end = ((index + 1) * SEGMENT_ROWS).min(n);
        (start, end)
    }

    /// Global row index of a segment's first row.
    pub fn segment_offset(&self, index: usize) -> usize {
        self.segment_bounds(index).0
    }

    /// Zero-copy view of one segment's rows.
    pub fn segment(&self, index: usize) -> DataFrame {
        let (start, end) = self.segment_bounds(index);
        self.df.slice(start as i64, end - start)
    }

    /// Write `value` into every row of `[start, end]` (inclusive, global
    /// indices) of `column`. The column becomes String dtype; nulls outside
    /// the range are preserved. On success the dataset is dirty and exactly
    /// this column's domain is recomputed.
    pub fn mutate_range(
        &mut self,
        column: &str,
        start: usize,
        end: usize,
        value: &str,
    ) -> Result<(), DataError> {
        if !self.has_column(column) {
            return Err(DataError::UnknownColumn(column.to_string()));
        }
        let rows = self.df.height();
        if start > end || end >= rows {
            return Err(DataError::InvalidRange { start, end, rows });
        }

        let series = self.df.column(column)?.as_materialized_series();
        let values: Vec<Option<String>> = series
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if i >= start && i <= end {
                    Some(value.to_string())
                } else if matches!(v, AnyValue::Null) {
                    None
                } else {
                    Some(cell_string(&v))
                }
            })
            .collect();
        let replacement = Series::new(column.into(), values);
        self.df.with_column(replacement)?;

        self.dirty = true;
        self.domains.invalidate_and_recompute(&self.df, column)?;
        tracing::debug!(column, start, end, value, "range mutated");
        Ok(())
    }

    /// Serialize the current table as CSV (headers, no index column). On
    /// success the written path becomes the dataset's path and the dirty
    /// flag clears; on failure in-memory state is retained for a retry.
    pub fn save(&mut self, path: &Path) -> Result<(), DataError> {
        let file = File::create(path).map_err(|source| DataError::Save {
            path: path.to_path_buf(),
            source: source.into(),
        })?;
        let mut df = self.df.clone();
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|source| DataError::Save {
                path: path.to_path_buf(),
                source,
            })?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!(path = %path.display(), rows = self.df.height(), "dataset saved");
        Ok(())
    }
}
