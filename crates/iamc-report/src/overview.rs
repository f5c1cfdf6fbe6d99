//! Overview workbook for a scanned input directory.

use std::path::Path;

use iamc_ingest::OverviewScan;
use iamc_model::mapping::{FILE_LOCATION, FILE_NAME, SHEET_NAME, SOURCE_MODEL};
use iamc_model::{CellValue, RawTable};

use crate::error::Result;
use crate::workbook::save_sheets;

pub const OVERVIEW_SHEET: &str = "overview";
pub const COLUMN_NAMES: &str = "Column names";

/// Builds the overview table: one row per file and sheet.
pub fn overview_table(scan: &OverviewScan) -> RawTable {
    let headers = [SOURCE_MODEL, FILE_LOCATION, FILE_NAME, SHEET_NAME, COLUMN_NAMES]
        .iter()
        .map(|h| (*h).to_string())
        .collect();
    let rows = scan
        .entries
        .iter()
        .map(|entry| {
            vec![
                CellValue::from(entry.source_model.as_str()),
                CellValue::from(entry.file_location.as_str()),
                CellValue::from(entry.file_name.as_str()),
                CellValue::from(entry.sheet_name.as_str()),
                CellValue::from(entry.columns.join(", ")),
            ]
        })
        .collect();
    RawTable::new(headers, rows).unwrap_or_default()
}

/// Writes the overview as a single-sheet workbook.
pub fn write_overview(path: &Path, scan: &OverviewScan) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| crate::ReportError::io(parent, e))?;
    }
    save_sheets(path, &[(OVERVIEW_SHEET.to_string(), overview_table(scan))])
}
