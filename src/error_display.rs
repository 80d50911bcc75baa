//! User-facing error message formatting.
//!
//! Uses typed error matching (DataError / EditError variants, PolarsError,
//! io::ErrorKind) rather than string parsing to produce short, actionable
//! messages for the status line.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::error::{DataError, EditError};

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. Check spelling and that the column exists.",
            msg
        ),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::ComputeError(msg) => msg.to_string(),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check file access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a dataset error for the status line.
pub fn user_message_from_data_error(err: &DataError) -> String {
    match err {
        DataError::Load { path, source } => format!(
            "Failed to load {}: {}",
            path.display(),
            user_message_from_polars(source)
        ),
        DataError::UnknownColumn(column) => format!("Column not found: {}", column),
        DataError::InvalidRange { start, end, rows } => format!(
            "Rows {}..{} are outside the dataset ({} rows)",
            start, end, rows
        ),
        DataError::Save { path, source } => format!(
            "Failed to save {}: {}",
            path.display(),
            user_message_from_polars(source)
        ),
        DataError::Polars(source) => user_message_from_polars(source),
    }
}

/// Format an edit error for the status line.
pub fn user_message_from_edit_error(err: &EditError) -> String {
    match err {
        EditError::NoColumnSelected => {
            "Select a category column before applying an edit.".to_string()
        }
        EditError::EmptyValue => "Enter or pick a value to assign.".to_string(),
        EditError::Data(data) => user_message_from_data_error(data),
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find DataError, EditError, PolarsError, or
/// io::Error; falls back to the report's first display line.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    for cause in report.chain() {
        if let Some(err) = cause.downcast_ref::<DataError>() {
            return user_message_from_data_error(err);
        }
        if let Some(err) = cause.downcast_ref::<EditError>() {
            return user_message_from_edit_error(err);
        }
        if let Some(err) = cause.downcast_ref::<PolarsError>() {
            let msg = user_message_from_polars(err);
            return match path {
                Some(p) => format!("Failed to load {}: {}", p.display(), msg),
                None => msg,
            };
        }
        if let Some(err) = cause.downcast_ref::<io::Error>() {
            let msg = user_message_from_io(err, None);
            return match path {
                Some(p) => format!("Failed to load {}: {}", p.display(), msg),
                None => msg,
            };
        }
    }

    // Fallback: first display line, to avoid long tracebacks in the status bar.
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred").trim();
    match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), first_line),
        None => first_line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_message() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(msg.contains("not found"), "got: {}", msg);
    }

    #[test]
    fn polars_column_not_found_message() {
        let err = PolarsError::ColumnNotFound("foo".into());
        let msg = user_message_from_polars(&err);
        assert!(msg.contains("foo"), "got: {}", msg);
        assert!(msg.contains("Column not found"), "got: {}", msg);
    }

    #[test]
    fn data_error_invalid_range_message() {
        let err = DataError::InvalidRange {
            start: 5,
            end: 10,
            rows: 8,
        };
        let msg = user_message_from_data_error(&err);
        assert!(msg.contains('5') && msg.contains("10") && msg.contains('8'), "got: {}", msg);
    }

    #[test]
    fn edit_error_messages_are_actionable() {
        assert!(user_message_from_edit_error(&EditError::NoColumnSelected)
            .contains("category column"));
        assert!(user_message_from_edit_error(&EditError::EmptyValue).contains("value"));
    }

    #[test]
    fn report_downcasts_data_error() {
        let report = color_eyre::eyre::Report::new(DataError::UnknownColumn("bar".into()));
        let msg = user_message_from_report(&report, None);
        assert!(msg.contains("bar"), "got: {}", msg);
    }

    #[test]
    fn report_fallback_uses_first_line() {
        let report = color_eyre::eyre::eyre!("first line\nsecond line");
        let msg = user_message_from_report(&report, None);
        assert_eq!(msg, "first line");
    }
}
