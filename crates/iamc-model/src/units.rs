use std::fmt;

use serde::{Deserialize, Serialize};

/// Column headers of the unit suggestion table.
pub const SUGGESTED_UNIT: &str = "suggested_unit";
pub const OBSERVATIONS: &str = "observations";
pub const UNITS_SEEN: &str = "units_seen";
pub const EXAMPLE_VALUE: &str = "example_value";
pub const CONFLICT: &str = "conflict";
pub const SOURCES: &str = "sources";

/// (original variable, canonical variable, model), each trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationKey {
    pub original_variable: String,
    pub canonical_variable: String,
    pub model: String,
}

impl ObservationKey {
    pub fn new(original: &str, canonical: &str, model: &str) -> Self {
        Self {
            original_variable: original.trim().to_string(),
            canonical_variable: canonical.trim().to_string(),
            model: model.trim().to_string(),
        }
    }
}

/// Where a unit observation came from, rendered `file:sheet:column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Provenance {
    pub file: String,
    pub sheet: String,
    pub column: String,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.sheet, self.column)
    }
}

/// One row of the suggestion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSuggestion {
    #[serde(flatten)]
    pub key: ObservationKey,
    pub suggested_unit: Option<String>,
    pub observations: usize,
    /// `"kt CO2×3; Mt CO2×1"`, most frequent first.
    pub units_seen: String,
    pub example_value: Option<String>,
    pub conflict: bool,
    /// Sorted provenance strings joined with `"; "`.
    pub sources: String,
}

impl UnitSuggestion {
    /// True when the suggestion may be written into an empty unit cell.
    pub fn is_fillable(&self) -> bool {
        !self.conflict && self.suggested_unit.is_some()
    }
}
