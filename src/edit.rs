//! Bulk categorical edit: validate the request, apply it through the store,
//! and report what the caller must refresh afterwards.

use crate::dataset::DatasetStore;
use crate::error::EditError;

/// A successfully applied edit. The caller clears the selection, refreshes
/// value pickers for `column`, and preserves the viewport across the
/// re-render it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub column: String,
    pub start: usize,
    pub end: usize,
    pub value: String,
}

impl EditOutcome {
    pub fn rows_touched(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Apply `value` to the selected global row range of the active categorical
/// column. Validation failures reject the edit without touching any state;
/// on success only the edited column's domain cache is recomputed (inside
/// `DatasetStore::mutate_range`).
pub fn apply(
    store: &mut DatasetStore,
    selection: (usize, usize),
    column: Option<&str>,
    value: &str,
) -> Result<EditOutcome, EditError> {
    let column = column.ok_or(EditError::NoColumnSelected)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(EditError::EmptyValue);
    }
    let (start, end) = selection;
    store.mutate_range(column, start, end, value)?;
    Ok(EditOutcome {
        column: column.to_string(),
        start,
        end,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryDomain;
    use crate::error::DataError;
    use polars::prelude::*;

    fn store() -> DatasetStore {
        let df = df!(
            "cat" => ["a", "a", "b", "b", "b", "a", "c", "c", "a", "a"],
            "num" => (0..10).collect::<Vec<i32>>()
        )
        .unwrap();
        let mut store = DatasetStore::new();
        store.load_frame(df).unwrap();
        store
    }

    #[test]
    fn apply_rejects_missing_column_selection() {
        let mut s = store();
        let err = apply(&mut s, (2, 4), None, "z").unwrap_err();
        assert!(matches!(err, EditError::NoColumnSelected));
        assert!(!s.is_dirty());
    }

    #[test]
    fn apply_rejects_blank_value() {
        let mut s = store();
        for blank in ["", "   ", "\t"] {
            let err = apply(&mut s, (2, 4), Some("cat"), blank).unwrap_err();
            assert!(matches!(err, EditError::EmptyValue));
        }
        assert!(!s.is_dirty());
    }

    #[test]
    fn apply_trims_the_value() {
        let mut s = store();
        let outcome = apply(&mut s, (0, 0), Some("cat"), "  z  ").unwrap();
        assert_eq!(outcome.value, "z");
        assert_eq!(
            s.df().column("cat").unwrap().get(0).unwrap(),
            AnyValue::String("z")
        );
    }

    #[test]
    fn apply_writes_range_and_refreshes_domain() {
        let mut s = store();
        let num_before = s.domain("num").unwrap();

        let outcome = apply(&mut s, (2, 4), Some("cat"), "z").unwrap();
        assert_eq!(outcome.rows_touched(), 3);

        let cat: Vec<String> = crate::plot_data::column_strings(s.df(), "cat").unwrap();
        assert_eq!(cat, ["a", "a", "z", "z", "z", "a", "c", "c", "a", "a"]);
        match s.domain("cat").unwrap().as_ref() {
            CategoryDomain::Enumerable(values) => {
                assert!(values.contains(&"z".to_string()));
            }
            CategoryDomain::Unbounded => panic!("expected enumerable"),
        }
        let num_after = s.domain("num").unwrap();
        assert!(std::sync::Arc::ptr_eq(&num_before, &num_after));
        assert!(s.is_dirty());
    }

    #[test]
    fn apply_surfaces_range_violations() {
        let mut s = store();
        let err = apply(&mut s, (8, 12), Some("cat"), "z").unwrap_err();
        assert!(matches!(
            err,
            EditError::Data(DataError::InvalidRange { .. })
        ));
        assert!(!s.is_dirty());
    }
}
