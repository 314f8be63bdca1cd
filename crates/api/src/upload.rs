//! CSV decoding for uploads and reference data

use csv::{ReaderBuilder, Trim};
use feature_engine::{Cell, RawTable, ShapeError};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors while decoding CSV input
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Decode CSV bytes with a header row
pub fn parse_csv(data: &[u8]) -> Result<RawTable, UploadError> {
    read_table(reader_builder().from_reader(data))
}

/// Decode a CSV file with a header row
pub fn read_csv_file(path: impl AsRef<Path>) -> Result<RawTable, UploadError> {
    read_table(reader_builder().from_path(path)?)
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::All);
    builder
}

fn read_table<R: Read>(mut reader: csv::Reader<R>) -> Result<RawTable, UploadError> {
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(Cell::parse).collect()))
        .collect::<Result<Vec<Vec<Cell>>, _>>()?;

    debug!("Decoded CSV: {} rows x {} columns", rows.len(), columns.len());
    Ok(RawTable::new(columns, rows)?)
}
