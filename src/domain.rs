//! Enumerable-domain detection for columns, and the per-column domain cache.
//!
//! A column is "enumerable" when its distinct stringified values fit in
//! `MAX_ENUMERABLE` entries; such columns can be colored as background bands
//! and offered as marker/sentinel pickers. Detection runs three tiers, each
//! a cheap bail-out gate before the next: the head of the column, a
//! deterministic strided sample, then the exact full scan. Tier 3 is
//! authoritative; the earlier tiers can only send a column forward, never
//! misclassify it.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Maximum distinct stringified values for a column to count as enumerable.
pub const MAX_ENUMERABLE: usize = 30;
/// Tier 1 inspects this many leading values.
const HEAD_ROWS: usize = 100;
/// Tier 2 samples this many values.
const SAMPLE_ROWS: usize = 10_000;
/// Fixed seed so the tier-2 sample (and therefore the classification) is
/// reproducible across calls.
const SAMPLE_SEED: u64 = 0;

/// Classification of one column's value domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryDomain {
    /// At most `MAX_ENUMERABLE` distinct stringified values, sorted.
    Enumerable(Vec<String>),
    /// Too many distinct values to enumerate.
    Unbounded,
}

impl CategoryDomain {
    pub fn is_enumerable(&self) -> bool {
        matches!(self, CategoryDomain::Enumerable(_))
    }

    /// Sorted distinct values, or None for an unbounded column.
    pub fn values(&self) -> Option<&[String]> {
        match self {
            CategoryDomain::Enumerable(values) => Some(values),
            CategoryDomain::Unbounded => None,
        }
    }
}

/// Normalized string form of a cell. Nulls stringify as "null" and form an
/// ordinary category; numeric and text values unify once stringified.
pub fn cell_string(value: &AnyValue) -> String {
    value.str_value().to_string()
}

/// True when the series holds more than `limit` distinct stringified values.
/// Stops scanning as soon as the limit is exceeded.
fn distinct_exceeds(series: &Series, limit: usize) -> bool {
    let mut seen: HashSet<String> = HashSet::new();
    for value in series.iter() {
        seen.insert(cell_string(&value));
        if seen.len() > limit {
            return true;
        }
    }
    false
}

/// Deterministic sample of `sample_size` values: fixed stride with a
/// seed-derived start offset, so the same column always yields the same
/// sample.
fn strided_sample(series: &Series, sample_size: usize, seed: u64) -> PolarsResult<Series> {
    let total = series.len();
    if total <= sample_size {
        return Ok(series.clone());
    }
    let step = total / sample_size;
    let start_offset = (seed as usize) % step;
    let indices: Vec<u32> = (0..sample_size)
        .map(|i| {
            let idx = start_offset + i * step;
            (idx.min(total - 1)) as u32
        })
        .collect();
    let indices_ca = UInt32Chunked::new("indices".into(), indices);
    series.take(&indices_ca)
}

/// Classify one column as `Enumerable` (with its exact sorted distinct set)
/// or `Unbounded`. Deterministic: same column, same result, every call.
pub fn analyze(series: &Series) -> PolarsResult<CategoryDomain> {
    let n = series.len();
    if n == 0 {
        return Ok(CategoryDomain::Enumerable(Vec::new()));
    }

    // Tier 1: the head rejects obviously-continuous columns in O(HEAD_ROWS).
    let head = series.slice(0, HEAD_ROWS.min(n));
    if distinct_exceeds(&head, MAX_ENUMERABLE) {
        return Ok(CategoryDomain::Unbounded);
    }

    // Tier 2: a deterministic sample catches columns whose head happens to
    // be uniform.
    if n > HEAD_ROWS {
        let sample = strided_sample(series, SAMPLE_ROWS.min(n), SAMPLE_SEED)?;
        if distinct_exceeds(&sample, MAX_ENUMERABLE) {
            return Ok(CategoryDomain::Unbounded);
        }
    }

    // Tier 3: exact full scan, authoritative.
    let mut seen: HashSet<String> = HashSet::new();
    for value in series.iter() {
        seen.insert(cell_string(&value));
        if seen.len() > MAX_ENUMERABLE {
            return Ok(CategoryDomain::Unbounded);
        }
    }
    let mut values: Vec<String> = seen.into_iter().collect();
    values.sort();
    Ok(CategoryDomain::Enumerable(values))
}

/// Per-column domain cache. Domains are computed eagerly at load and
/// recomputed only through `invalidate_and_recompute`, so an edit to one
/// column can never silently refresh another column's classification.
#[derive(Debug, Default, Clone)]
pub struct DomainCache {
    domains: HashMap<String, Arc<CategoryDomain>>,
}

impl DomainCache {
    /// Discard everything and analyze every column of `df`.
    pub fn recompute_all(&mut self, df: &DataFrame) -> PolarsResult<()> {
        let mut domains = HashMap::with_capacity(df.width());
        for column in df.get_columns() {
            let domain = analyze(column.as_materialized_series())?;
            domains.insert(column.name().to_string(), Arc::new(domain));
        }
        self.domains = domains;
        Ok(())
    }

    /// The single invalidation entry point: drop and re-analyze exactly one
    /// column. All other cached domains are left untouched.
    pub fn invalidate_and_recompute(&mut self, df: &DataFrame, column: &str) -> PolarsResult<()> {
        let series = df.column(column)?.as_materialized_series().clone();
        let domain = analyze(&series)?;
        self.domains.insert(column.to_string(), Arc::new(domain));
        Ok(())
    }

    pub fn domain(&self, column: &str) -> Option<Arc<CategoryDomain>> {
        self.domains.get(column).cloned()
    }

    pub fn clear(&mut self) {
        self.domains.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_series(name: &str, values: &[&str]) -> Series {
        Series::new(name.into(), values.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn empty_column_is_enumerable_and_empty() {
        let s = Series::new("c".into(), Vec::<String>::new());
        assert_eq!(analyze(&s).unwrap(), CategoryDomain::Enumerable(Vec::new()));
    }

    #[test]
    fn small_domain_is_enumerable_and_sorted() {
        let s = string_series("c", &["b", "a", "c", "a", "b", "b"]);
        assert_eq!(
            analyze(&s).unwrap(),
            CategoryDomain::Enumerable(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn numeric_column_unifies_as_strings() {
        let s = Series::new("c".into(), (0..600).map(|i| i % 3).collect::<Vec<i32>>());
        assert_eq!(
            analyze(&s).unwrap(),
            CategoryDomain::Enumerable(vec!["0".into(), "1".into(), "2".into()])
        );
    }

    #[test]
    fn nulls_count_as_a_category() {
        let s = Series::new(
            "c".into(),
            vec![Some("a"), None, Some("b"), None, Some("a")],
        );
        assert_eq!(
            analyze(&s).unwrap(),
            CategoryDomain::Enumerable(vec!["a".into(), "b".into(), "null".into()])
        );
    }

    #[test]
    fn continuous_column_is_unbounded() {
        let s = Series::new("c".into(), (0..1000).collect::<Vec<i64>>());
        assert_eq!(analyze(&s).unwrap(), CategoryDomain::Unbounded);
    }

    #[test]
    fn exactly_thirty_distinct_is_enumerable() {
        let values: Vec<i32> = (0..3000).map(|i| i % 30).collect();
        let s = Series::new("c".into(), values);
        match analyze(&s).unwrap() {
            CategoryDomain::Enumerable(v) => assert_eq!(v.len(), 30),
            CategoryDomain::Unbounded => panic!("expected enumerable"),
        }
    }

    #[test]
    fn thirty_one_distinct_is_unbounded() {
        let values: Vec<i32> = (0..3100).map(|i| i % 31).collect();
        let s = Series::new("c".into(), values);
        assert_eq!(analyze(&s).unwrap(), CategoryDomain::Unbounded);
    }

    #[test]
    fn uniform_head_does_not_hide_wide_tail() {
        // First 100 values identical; 50 distinct values afterwards. Tier 1
        // passes, later tiers must still reject.
        let mut values: Vec<String> = vec!["head".to_string(); 100];
        values.extend((0..100).map(|i| format!("v{}", i % 50)));
        let s = Series::new("c".into(), values);
        assert_eq!(analyze(&s).unwrap(), CategoryDomain::Unbounded);
    }

    #[test]
    fn classification_is_deterministic() {
        let values: Vec<String> = (0..20_000).map(|i| format!("v{}", i % 25)).collect();
        let s = Series::new("c".into(), values);
        let a = analyze(&s).unwrap();
        let b = analyze(&s).unwrap();
        assert_eq!(a, b);
        assert!(a.is_enumerable());
    }

    #[test]
    fn ordering_does_not_change_the_answer() {
        let forward: Vec<String> = (0..5000).map(|i| format!("v{}", i % 10)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = analyze(&Series::new("c".into(), forward)).unwrap();
        let b = analyze(&Series::new("c".into(), reversed)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn strided_sample_is_deterministic_and_sized() {
        let s = Series::new("c".into(), (0..100_000).collect::<Vec<i64>>());
        let a = strided_sample(&s, 10_000, SAMPLE_SEED).unwrap();
        let b = strided_sample(&s, 10_000, SAMPLE_SEED).unwrap();
        assert_eq!(a.len(), 10_000);
        assert!(a.equals(&b));
    }

    #[test]
    fn cache_recomputes_only_the_invalidated_column() {
        let df = df!(
            "a" => ["x", "x", "y"],
            "b" => ["p", "q", "p"]
        )
        .unwrap();
        let mut cache = DomainCache::default();
        cache.recompute_all(&df).unwrap();
        let a_before = cache.domain("a").unwrap();
        let b_before = cache.domain("b").unwrap();

        cache.invalidate_and_recompute(&df, "b").unwrap();
        let a_after = cache.domain("a").unwrap();
        let b_after = cache.domain("b").unwrap();

        assert!(Arc::ptr_eq(&a_before, &a_after));
        assert!(!Arc::ptr_eq(&b_before, &b_after));
        assert_eq!(*b_before, *b_after);
    }
}
