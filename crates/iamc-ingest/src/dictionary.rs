//! Dictionary file loading.
//!
//! A dictionary workbook carries four two-column sheets. A missing sheet or
//! column stops the run before any source file is read.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::control::{column_pairs, require_columns};
use crate::error::{IngestError, Result};
use crate::workbook::{ensure_file, read_all_sheets};

pub const VARIABLES_SHEET: &str = "variables";
pub const REGIONS_SHEET: &str = "regions";
pub const MODELS_SHEET: &str = "models";
pub const SCENARIOS_SHEET: &str = "scenarios";

/// (sheet, source column, target column) for each dictionary.
pub const DICTIONARY_SHEETS: [(&str, &str, &str); 4] = [
    (VARIABLES_SHEET, "names mapping", "DE variable name"),
    (REGIONS_SHEET, "source_region", "target_region"),
    (MODELS_SHEET, "source_models", "target_models"),
    (SCENARIOS_SHEET, "source_scenario", "target_scenario"),
];

/// Raw (source, target) pairs of each dictionary sheet, in sheet order.
#[derive(Debug, Clone, Default)]
pub struct DictionaryFile {
    pub path: PathBuf,
    pub variables: Vec<(String, String)>,
    pub regions: Vec<(String, String)>,
    pub models: Vec<(String, String)>,
    pub scenarios: Vec<(String, String)>,
}

pub fn load_dictionary_file(path: &Path) -> Result<DictionaryFile> {
    ensure_file(path)?;
    let sheets = read_all_sheets(path)?;
    let available: Vec<String> = sheets.iter().map(|(name, _)| name.clone()).collect();

    let mut file = DictionaryFile {
        path: path.to_path_buf(),
        ..DictionaryFile::default()
    };
    for (sheet, source, target) in DICTIONARY_SHEETS {
        let (_, table) = sheets
            .iter()
            .find(|(name, _)| name.trim() == sheet)
            .ok_or_else(|| IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
                available: available.clone(),
            })?;
        let mut table = table.clone();
        table.trim_headers();
        require_columns(path, sheet, &table, &[source, target])?;
        let pairs = column_pairs(&table, source, target);
        match sheet {
            VARIABLES_SHEET => file.variables = pairs,
            REGIONS_SHEET => file.regions = pairs,
            MODELS_SHEET => file.models = pairs,
            _ => file.scenarios = pairs,
        }
    }

    info!(
        path = %path.display(),
        variables = file.variables.len(),
        regions = file.regions.len(),
        models = file.models.len(),
        scenarios = file.scenarios.len(),
        "dictionary file loaded"
    );
    Ok(file)
}
