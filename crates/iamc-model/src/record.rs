use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::CellValue;
use crate::wide::WideKey;

/// A year column label. Integer years sort numerically; anything else is
/// carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YearLabel {
    Year(i64),
    Label(String),
}

impl YearLabel {
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell.as_year() {
            Some(year) => YearLabel::Year(year),
            None => YearLabel::Label(cell.as_text()),
        }
    }

    pub fn as_year(&self) -> Option<i64> {
        match self {
            YearLabel::Year(year) => Some(*year),
            YearLabel::Label(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, YearLabel::Label(label) if label.trim().is_empty())
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearLabel::Year(year) => write!(f, "{year}"),
            YearLabel::Label(label) => f.write_str(label),
        }
    }
}

/// One long-format observation after mapping.
///
/// `value` is `None` when the source cell was empty or not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub model: String,
    pub scenario: String,
    pub region: String,
    pub variable: String,
    pub unit: String,
    pub year: YearLabel,
    pub value: Option<f64>,
}

impl CanonicalRecord {
    pub fn wide_key(&self) -> WideKey {
        WideKey {
            model: self.model.clone(),
            scenario: self.scenario.clone(),
            region: self.region.clone(),
            variable: self.variable.clone(),
            unit: self.unit.clone(),
        }
    }
}
