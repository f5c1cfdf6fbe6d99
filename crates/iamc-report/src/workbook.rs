//! Shared xlsx writing helpers.

use std::path::Path;

use iamc_model::{CellValue, RawTable};
use rust_xlsxwriter::{Workbook, XlsxError};

/// Adds a sheet holding `table`, header in the first row.
pub(crate) fn add_table_sheet(
    workbook: &mut Workbook,
    name: &str,
    table: &RawTable,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    for (col, header) in table.headers().iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    sheet.write_string(excel_row, col, text)?;
                }
                CellValue::Number(v) => {
                    sheet.write_number(excel_row, col, *v)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(excel_row, col, *b)?;
                }
            }
        }
    }
    Ok(())
}

/// Writes `sheets` as a new workbook at `path`, replacing any existing file.
///
/// The workbook is first saved next to the target and then renamed over it,
/// so a failed write leaves the previous file intact.
pub(crate) fn save_sheets(path: &Path, sheets: &[(String, RawTable)]) -> crate::Result<()> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        add_table_sheet(&mut workbook, name, table)
            .map_err(|e| crate::ReportError::xlsx(path, e))?;
    }
    let staging = path.with_extension("xlsx.partial");
    workbook
        .save(&staging)
        .map_err(|e| crate::ReportError::xlsx(&staging, e))?;
    std::fs::rename(&staging, path).map_err(|e| crate::ReportError::io(path, e))?;
    Ok(())
}
