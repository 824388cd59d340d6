//! CSV reading and writing for dataframes.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, LazyCsvReader, LazyFileListReader, PolarsResult, SerWriter};

/// Read a CSV file into a dataframe with schema inference.
///
/// Inference is what makes comparison dtype-sensitive: a column of digits
/// loads as integers, so a submission emitting `2.0` where `2` is expected
/// produces a visible mismatch.
pub fn read_table(path: &Path) -> PolarsResult<DataFrame> {
    LazyCsvReader::new(path.to_path_buf())
        .with_infer_schema_length(Some(10_000))
        .finish()?
        .collect()
}

/// Write a dataframe as headered CSV.
pub fn write_table(path: &Path, frame: &DataFrame) -> PolarsResult<()> {
    let file = File::create(path)?;
    // CsvWriter wants exclusive access; the clone also keeps the caller's
    // frame untouched.
    let mut frame = frame.clone();
    CsvWriter::new(file).include_header(true).finish(&mut frame)
}
