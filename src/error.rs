//! Typed errors for dataset operations and edits.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in dataset operations.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        source: PolarsError,
    },

    #[error("column not found: {0}")]
    UnknownColumn(String),

    #[error("row range {start}..={end} is outside the dataset (rows: {rows})")]
    InvalidRange {
        start: usize,
        end: usize,
        rows: usize,
    },

    #[error("failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        source: PolarsError,
    },

    /// Internal table-engine failure surfaced unchanged.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Errors that can occur when applying a bulk categorical edit.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("no category column is selected")]
    NoColumnSelected,

    #[error("the value to assign is empty")]
    EmptyValue,

    #[error(transparent)]
    Data(#[from] DataError),
}
