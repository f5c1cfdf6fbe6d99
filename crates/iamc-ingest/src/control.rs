//! Control table loading.
//!
//! The control workbook carries the `variable_mapping` sheet (one mapping
//! rule per row) and optionally a `region_mapping` sheet. Any problem here
//! is a fatal configuration error for the run.

use std::path::{Path, PathBuf};

use iamc_model::mapping::{
    OPTIONAL_COLUMNS, REGION_MAPPING_SHEET, REQUIRED_COLUMNS, SOURCE_REGION, TARGET_REGION,
    VARIABLE_MAPPING_SHEET,
};
use iamc_model::{MappingRule, RawTable};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::workbook::{ensure_file, read_all_sheets};

#[derive(Debug, Clone)]
pub struct ControlTable {
    pub path: PathBuf,
    /// The `variable_mapping` sheet with optional columns filled in.
    pub mapping: RawTable,
    /// The `region_mapping` sheet, if the workbook has one.
    pub regions: Option<RawTable>,
}

impl ControlTable {
    /// One rule per mapping row, in table order.
    pub fn rules(&self) -> Vec<MappingRule> {
        self.mapping
            .records()
            .enumerate()
            .map(|(row, record)| MappingRule::from_record(row, &record))
            .collect()
    }

    /// (source, target) region pairs in table order. Rows without a source
    /// region are ignored.
    pub fn region_pairs(&self) -> Vec<(String, String)> {
        self.regions
            .as_ref()
            .map(|table| column_pairs(table, SOURCE_REGION, TARGET_REGION))
            .unwrap_or_default()
    }
}

/// Loads and checks the control workbook.
pub fn load_control_table(path: &Path) -> Result<ControlTable> {
    ensure_file(path)?;
    let sheets = read_all_sheets(path)?;
    let available: Vec<String> = sheets.iter().map(|(name, _)| name.clone()).collect();

    let mut mapping = take_sheet(&sheets, VARIABLE_MAPPING_SHEET).ok_or_else(|| {
        IngestError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: VARIABLE_MAPPING_SHEET.to_string(),
            available: available.clone(),
        }
    })?;
    mapping.trim_headers();
    require_columns(path, VARIABLE_MAPPING_SHEET, &mapping, &REQUIRED_COLUMNS)?;
    for column in OPTIONAL_COLUMNS {
        mapping.ensure_column(column);
    }

    let regions = match take_sheet(&sheets, REGION_MAPPING_SHEET) {
        Some(mut table) => {
            table.trim_headers();
            require_columns(path, REGION_MAPPING_SHEET, &table, &[SOURCE_REGION, TARGET_REGION])?;
            debug!(rows = table.len(), "region mapping loaded");
            Some(table)
        }
        None => {
            info!(
                path = %path.display(),
                "no region_mapping sheet, region names are kept as they are"
            );
            None
        }
    };

    info!(path = %path.display(), rules = mapping.len(), "control table loaded");
    Ok(ControlTable {
        path: path.to_path_buf(),
        mapping,
        regions,
    })
}

fn take_sheet(sheets: &[(String, RawTable)], name: &str) -> Option<RawTable> {
    sheets
        .iter()
        .find(|(sheet, _)| sheet == name)
        .or_else(|| sheets.iter().find(|(sheet, _)| sheet.trim() == name))
        .map(|(_, table)| table.clone())
}

pub(crate) fn require_columns(
    path: &Path,
    sheet: &str,
    table: &RawTable,
    columns: &[&str],
) -> Result<()> {
    let missing = table.missing_columns(columns.iter().copied());
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            columns: missing,
        })
    }
}

/// Trimmed (key, value) pairs from two columns, skipping blank keys.
pub(crate) fn column_pairs(table: &RawTable, key: &str, value: &str) -> Vec<(String, String)> {
    table
        .records()
        .filter_map(|record| {
            let k = record.text(key);
            if k.is_empty() {
                None
            } else {
                Some((k, record.text(value)))
            }
        })
        .collect()
}
