//! Spreadsheet reading via calamine.
//!
//! The first row of a sheet's used range is the header row. Fully blank data
//! rows are skipped.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use iamc_common::normalize_header;
use iamc_model::{CellValue, RawTable};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists the sheet names of a workbook in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    ensure_file(path)?;
    let workbook = open(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Reads one sheet, or the first sheet when `sheet` is `None`.
///
/// Returns the resolved sheet name with the table. A requested name that
/// differs from a real sheet only by surrounding whitespace or ASCII case is
/// accepted.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<(String, RawTable)> {
    ensure_file(path)?;
    let mut workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => resolve_sheet_name(&names, wanted).ok_or_else(|| {
            IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
                available: names.clone(),
            }
        })?,
        None => names.first().cloned().ok_or_else(|| IngestError::NoSheets {
            path: path.to_path_buf(),
        })?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|source| IngestError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
    let table = range_to_table(&range).map_err(|source| IngestError::Table {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), sheet = %name, rows = table.len(), "sheet loaded");
    Ok((name, table))
}

/// Reads every sheet of a workbook in workbook order.
pub fn read_all_sheets(path: &Path) -> Result<Vec<(String, RawTable)>> {
    ensure_file(path)?;
    let mut workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| IngestError::Workbook {
                path: path.to_path_buf(),
                source,
            })?;
        let table = range_to_table(&range).map_err(|source| IngestError::Table {
            path: path.to_path_buf(),
            source,
        })?;
        sheets.push((name, table));
    }
    Ok(sheets)
}

pub(crate) fn resolve_sheet_name(names: &[String], wanted: &str) -> Option<String> {
    if let Some(exact) = names.iter().find(|name| name.as_str() == wanted) {
        return Some(exact.clone());
    }
    let wanted = wanted.trim();
    names
        .iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .cloned()
}

pub(crate) fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn open(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>> {
    open_workbook_auto(path).map_err(|source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    })
}

fn range_to_table(range: &Range<Data>) -> iamc_model::Result<RawTable> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row
        .iter()
        .map(|cell| normalize_header(&data_to_cell(cell).as_text()))
        .collect();
    let body = rows
        .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(CellValue::is_blank))
        .collect();
    RawTable::new(headers, body)
}

/// Converts a calamine cell into the pipeline's cell type.
pub(crate) fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
