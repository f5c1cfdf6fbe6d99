//! Writers for the wide IAMC output tables.

use std::fmt;
use std::path::Path;

use iamc_common::format_numeric;
use iamc_model::WideTable;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `<prefix><model>-<stem>.<ext>`, with path separators in the model or
/// stem replaced so the result stays a single file name.
pub fn output_file_name(prefix: &str, model: &str, stem: &str, format: OutputFormat) -> String {
    let clean = |s: &str| s.trim().replace(['/', '\\', ':'], "_");
    format!(
        "{prefix}{}-{}.{}",
        clean(model),
        clean(stem),
        format.extension()
    )
}

/// Writes a wide table. `sheet` names the worksheet for xlsx output.
pub fn write_wide_table(
    path: &Path,
    sheet: &str,
    table: &WideTable,
    format: OutputFormat,
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    match format {
        OutputFormat::Xlsx => write_xlsx(path, sheet, table),
        OutputFormat::Csv => write_csv(path, table),
    }?;
    debug!(path = %path.display(), rows = table.len(), years = table.years.len(), "wide table written");
    Ok(())
}

fn write_xlsx(path: &Path, sheet_name: &str, table: &WideTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .map_err(|e| ReportError::xlsx(path, e))?;
    for (col, header) in table.header().iter().enumerate() {
        sheet
            .write_string(0, col as u16, header)
            .map_err(|e| ReportError::xlsx(path, e))?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, field) in row.key.fields().iter().enumerate() {
            sheet
                .write_string(excel_row, col as u16, *field)
                .map_err(|e| ReportError::xlsx(path, e))?;
        }
        for (offset, value) in row.values.iter().enumerate() {
            if let Some(v) = value {
                sheet
                    .write_number(excel_row, (5 + offset) as u16, *v)
                    .map_err(|e| ReportError::xlsx(path, e))?;
            }
        }
    }
    workbook.save(path).map_err(|e| ReportError::xlsx(path, e))
}

fn write_csv(path: &Path, table: &WideTable) -> Result<()> {
    let csv_err = |source: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(table.header()).map_err(csv_err)?;
    for row in &table.rows {
        let record: Vec<String> = row
            .key
            .fields()
            .iter()
            .map(|f| (*f).to_string())
            .chain(
                row.values
                    .iter()
                    .map(|v| v.map(format_numeric).unwrap_or_default()),
            )
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| ReportError::io(path, e))
}
