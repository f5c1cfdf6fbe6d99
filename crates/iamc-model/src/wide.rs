use serde::{Deserialize, Serialize};

use crate::record::YearLabel;

/// Fixed identifying columns of an IAMC table, in output order.
pub const KEY_COLUMNS: [&str; 5] = ["model", "scenario", "region", "variable", "unit"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WideKey {
    pub model: String,
    pub scenario: String,
    pub region: String,
    pub variable: String,
    pub unit: String,
}

impl WideKey {
    pub fn fields(&self) -> [&str; 5] {
        [
            self.model.as_str(),
            self.scenario.as_str(),
            self.region.as_str(),
            self.variable.as_str(),
            self.unit.as_str(),
        ]
    }
}

/// One output row. `values[i]` belongs to `WideTable::years[i]`; `None`
/// means the key had no observation for that year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub key: WideKey,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    pub years: Vec<YearLabel>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn header(&self) -> Vec<String> {
        KEY_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.years.iter().map(ToString::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn year_index(&self, year: &YearLabel) -> Option<usize> {
        self.years.iter().position(|y| y == year)
    }

    /// Value of `year` in the row with `key`, if both exist.
    pub fn value(&self, key: &WideKey, year: &YearLabel) -> Option<f64> {
        let idx = self.year_index(year)?;
        self.rows
            .iter()
            .find(|row| &row.key == key)
            .and_then(|row| row.values.get(idx).copied().flatten())
    }
}
