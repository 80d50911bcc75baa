use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Write a DataFrame as CSV into `dir` and return the file path.
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .unwrap();
    path
}

/// A small table with numeric series, an enumerable category column, and a
/// marker flag column.
pub fn sample_frame() -> DataFrame {
    df!(
        "temperature" => (0..100).map(|i| (i as f64 / 10.0).sin() * 20.0 + 10.0).collect::<Vec<f64>>(),
        "pressure" => (0..100).map(|i| 1000.0 + (i as f64 / 7.0).cos() * 25.0).collect::<Vec<f64>>(),
        "phase" => (0..100).map(|i| match (i / 20) % 3 { 0 => "heat", 1 => "hold", _ => "cool" }).collect::<Vec<&str>>(),
        "alarm" => (0..100).map(|i| if i % 25 == 0 { "1" } else { "0" }).collect::<Vec<&str>>()
    )
    .unwrap()
}
