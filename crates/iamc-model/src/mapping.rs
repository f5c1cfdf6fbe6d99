//! Control-table rows and the per-file identity they share.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::table::{CellValue, RawRecord};

/// Sheet holding one mapping rule per row.
pub const VARIABLE_MAPPING_SHEET: &str = "variable_mapping";
/// Optional sheet with region synonyms.
pub const REGION_MAPPING_SHEET: &str = "region_mapping";
pub const SOURCE_REGION: &str = "Source_Region";
pub const TARGET_REGION: &str = "Target_Region";

pub const FILE_LOCATION: &str = "File location";
pub const FILE_NAME: &str = "File name";
pub const SOURCE_MODEL: &str = "Source model";
pub const SHEET_NAME: &str = "Sheet name";
pub const SEPARATOR: &str = "Separator";
pub const VARIABLE_COLUMN: &str = "Variable column";
pub const VARIABLE_ORIGINAL: &str = "Variable value (original)";
pub const VARIABLE_NEW: &str = "Variable name (new)";
pub const SOURCE_SCENARIO: &str = "Source Scenario";
pub const SOURCE_REGION_COLUMN: &str = "Source Region";
pub const SOURCE_YEAR: &str = "Source Year";
pub const SOURCE_VALUE: &str = "Source Value";
pub const SOURCE_UNIT: &str = "Source Unit";
pub const UNIT: &str = "Unit";

/// Columns the `variable_mapping` sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    FILE_LOCATION,
    FILE_NAME,
    SOURCE_MODEL,
    VARIABLE_COLUMN,
    VARIABLE_ORIGINAL,
    VARIABLE_NEW,
];

/// Columns that default to empty when the sheet omits them.
pub const OPTIONAL_COLUMNS: [&str; 8] = [
    SHEET_NAME,
    SEPARATOR,
    SOURCE_SCENARIO,
    SOURCE_REGION_COLUMN,
    SOURCE_YEAR,
    SOURCE_VALUE,
    SOURCE_UNIT,
    UNIT,
];

/// The (file location, file name, source model) triple shared by a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileIdentity {
    pub file_location: String,
    pub file_name: String,
    pub source_model: String,
}

impl FileIdentity {
    /// Path of the source file relative to the input directory.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for part in self.file_location.split(['/', '\\']) {
            if !part.is_empty() {
                path.push(part);
            }
        }
        path.push(&self.file_name);
        path
    }

    /// File name without its extension.
    pub fn file_stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }

    /// Lower-cased extension, empty when the name has none.
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => String::new(),
        }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_location.is_empty() {
            write!(f, "{} [{}]", self.file_name, self.source_model)
        } else {
            write!(
                f,
                "{}/{} [{}]",
                self.file_location, self.file_name, self.source_model
            )
        }
    }
}

/// Column-selection settings of one control-table row.
///
/// Blank cells are `None`. The variable column may list several source
/// columns separated by `|`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub sheet_name: Option<String>,
    pub separator: Option<String>,
    pub variable_column: Option<String>,
    pub scenario_column: Option<String>,
    pub region_column: Option<String>,
    pub year_column: Option<String>,
    pub value_column: Option<String>,
    pub unit_column: Option<String>,
    pub unit_override: Option<String>,
}

impl ColumnConfig {
    pub fn is_composite_variable(&self) -> bool {
        self.variable_column
            .as_deref()
            .is_some_and(|selector| selector.contains('|'))
    }

    /// Names of the fields on which `other` disagrees with `self`.
    pub fn differing_fields(&self, other: &ColumnConfig) -> Vec<&'static str> {
        let pairs = [
            (SHEET_NAME, &self.sheet_name, &other.sheet_name),
            (SEPARATOR, &self.separator, &other.separator),
            (VARIABLE_COLUMN, &self.variable_column, &other.variable_column),
            (SOURCE_SCENARIO, &self.scenario_column, &other.scenario_column),
            (SOURCE_REGION_COLUMN, &self.region_column, &other.region_column),
            (SOURCE_YEAR, &self.year_column, &other.year_column),
            (SOURCE_VALUE, &self.value_column, &other.value_column),
        ];
        pairs
            .into_iter()
            .filter(|(_, a, b)| a != b)
            .map(|(name, _, _)| name)
            .collect()
    }
}

/// One row of the `variable_mapping` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Zero-based data row in the control sheet.
    pub row: usize,
    pub identity: FileIdentity,
    pub config: ColumnConfig,
    pub original_value: String,
    pub new_name: String,
}

impl MappingRule {
    pub fn from_record(row: usize, record: &RawRecord<'_>) -> Self {
        let optional = |column: &str| {
            let value = record.text(column);
            if value.is_empty() { None } else { Some(value) }
        };
        Self {
            row,
            identity: FileIdentity {
                file_location: record.text(FILE_LOCATION),
                file_name: record.text(FILE_NAME),
                source_model: record.text(SOURCE_MODEL),
            },
            config: ColumnConfig {
                sheet_name: optional(SHEET_NAME),
                separator: record.get(SEPARATOR).and_then(separator_text),
                variable_column: optional(VARIABLE_COLUMN),
                scenario_column: optional(SOURCE_SCENARIO),
                region_column: optional(SOURCE_REGION_COLUMN),
                year_column: optional(SOURCE_YEAR),
                value_column: optional(SOURCE_VALUE),
                unit_column: optional(SOURCE_UNIT),
                unit_override: optional(UNIT),
            },
            original_value: record.text(VARIABLE_ORIGINAL),
            new_name: record.text(VARIABLE_NEW),
        }
    }
}

/// A lone whitespace character (a literal tab or space) is a valid
/// separator; anything else is trimmed.
fn separator_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(raw) if raw.chars().count() == 1 => Some(raw.clone()),
        other => other.as_non_empty_text(),
    }
}
