//! Ordered column-name to typed-cell tables.
//!
//! Every source file, control sheet and dictionary sheet is loaded into a
//! [`RawTable`] before the pipeline touches it. Cells keep the type the reader
//! saw (text, number, boolean or nothing); coercion to key text or numbers
//! happens through the accessors here so that the rest of the pipeline never
//! deals with reader-specific null representations.

use std::fmt;

use iamc_common::{format_numeric, parse_f64, parse_year};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// Trimmed text form used for key matching. Empty cells become `""`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(v) => format_numeric(*v),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Text form, or `None` when the cell is blank.
    pub fn as_non_empty_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.as_text())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => parse_f64(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    pub fn as_year(&self) -> Option<i64> {
        match self {
            CellValue::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::Text(s) => parse_year(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Text)
    }
}

/// A rectangular table with named columns.
///
/// Rows shorter than the header are padded with [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut table = Self {
            headers,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) -> Result<()> {
        let expected = self.headers.len();
        if row.len() > expected {
            // Trailing blanks are common in spreadsheet exports.
            if row[expected..].iter().all(CellValue::is_blank) {
                row.truncate(expected);
            } else {
                return Err(ModelError::RowTooWide {
                    row: self.rows.len(),
                    found: row.len(),
                    expected,
                });
            }
        }
        row.resize(expected, CellValue::Empty);
        self.rows.push(row);
        Ok(())
    }

    /// Position of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `wanted` that are not columns of this table, in input order.
    pub fn missing_columns<'a, I>(&self, wanted: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for name in wanted {
            if !self.has_column(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        let len = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(ModelError::RowOutOfRange { row, len })?;
        if let Some(cell) = cells.get_mut(col) {
            *cell = value;
        }
        Ok(())
    }

    /// Returns the index of `name`, appending an empty column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        self.headers.len() - 1
    }

    /// Trims surrounding whitespace from every header.
    pub fn trim_headers(&mut self) {
        for header in &mut self.headers {
            let trimmed = header.trim();
            if trimmed.len() != header.len() {
                *header = trimmed.to_string();
            }
        }
    }

    /// Removes the first column (a row index written by some exporters).
    pub fn drop_first_column(&mut self) {
        if self.headers.is_empty() {
            return;
        }
        self.headers.remove(0);
        for row in &mut self.rows {
            row.remove(0);
        }
    }

    pub fn record(&self, row: usize) -> Option<RawRecord<'_>> {
        self.rows.get(row).map(|cells| RawRecord {
            headers: &self.headers,
            cells,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> + '_ {
        self.rows.iter().map(|cells| RawRecord {
            headers: &self.headers,
            cells,
        })
    }
}

/// Borrowed view of one table row addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    headers: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> RawRecord<'a> {
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells.get(idx)
    }

    /// Trimmed text of a column, `""` when the column or value is absent.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(CellValue::as_text).unwrap_or_default()
    }

    pub fn cells(&self) -> &'a [CellValue] {
        self.cells
    }
}
