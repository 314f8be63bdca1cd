//! Input and Aligned Tables

use crate::error::ShapeError;
use serde::{Deserialize, Serialize};

/// Spellings treated as a missing cell when parsing text input
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One parsed input cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value
    Number(f64),
    /// Non-numeric text; makes its whole column non-numeric
    Text(String),
    /// Empty or undefined value
    Missing,
}

impl Cell {
    /// Parse a raw text cell
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if MISSING_MARKERS.contains(&raw) {
            return Cell::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) => Cell::from(v),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    /// Finite numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Missing
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::from).unwrap_or(Cell::Missing)
    }
}

/// Named columns of parsed cells, as received from a caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table, checking that every row matches the column list
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, ShapeError> {
        let expected = columns.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ShapeError::RaggedRow {
                row,
                expected,
                found: r.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Create a table with positional column names (`col_0`, `col_1`, ...)
    /// taken from the width of the first row
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, ShapeError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let columns = (0..width).map(|i| format!("col_{}", i)).collect();
        Self::new(columns, rows)
    }

    /// Single-row table from a numeric vector; non-finite values become missing
    pub fn from_vector(values: &[f64]) -> Self {
        let columns = (0..values.len()).map(|i| format!("col_{}", i)).collect();
        let row = values.iter().map(|&v| Cell::from(v)).collect();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of columns without any text cell, in original order
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.width())
            .filter(|&col| !self.rows.iter().any(|row| row[col].is_text()))
            .collect()
    }

    /// Values of the numeric columns, row by row; missing cells become `NaN`
    pub fn numeric_rows(&self) -> Vec<Vec<f64>> {
        let numeric = self.numeric_columns();
        self.rows
            .iter()
            .map(|row| {
                numeric
                    .iter()
                    .map(|&col| row[col].as_number().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect()
    }

    /// Sum of the finite numeric cells of each row
    pub fn row_totals(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().filter_map(Cell::as_number).sum())
            .collect()
    }
}

/// Aligned table: every row has exactly `dimension` finite values
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    dimension: usize,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub(crate) fn new(dimension: usize, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == dimension));
        Self { dimension, rows }
    }

    /// Width of every row
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
