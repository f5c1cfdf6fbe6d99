//! Run-wide accumulation of observed units.
//!
//! The pipeline creates one [`UnitCollector`] per batch, passes it by
//! mutable reference into each file's processing and reads
//! [`UnitCollector::suggestions`] once at the end.

use std::collections::BTreeMap;

use iamc_model::{ObservationKey, Provenance, UnitSuggestion};
use indexmap::IndexMap;

use crate::units::normalize_unit;

#[derive(Debug, Clone, Default)]
struct UnitStats {
    count: usize,
    example: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct KeyStats {
    /// Normalised unit (`None` for a missing unit) in first-seen order.
    units: IndexMap<Option<String>, UnitStats>,
    sources: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct UnitCollector {
    keys: IndexMap<ObservationKey, KeyStats>,
}

impl UnitCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `count` observations of `unit` for `key`.
    ///
    /// The unit is normalised before counting. The first non-empty example
    /// per unit is kept.
    pub fn record(
        &mut self,
        key: ObservationKey,
        unit: Option<&str>,
        source: &Provenance,
        example_value: Option<&str>,
        count: usize,
    ) {
        if count == 0 {
            return;
        }
        let unit = unit.and_then(normalize_unit);
        let stats = self.keys.entry(key).or_default();
        let unit_stats = stats.units.entry(unit).or_default();
        unit_stats.count += count;
        if unit_stats.example.is_none() {
            unit_stats.example = example_value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
        }
        *stats.sources.entry(source.to_string()).or_insert(0) += count;
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// One suggestion per key, in the order keys were first recorded.
    pub fn suggestions(&self) -> Vec<UnitSuggestion> {
        self.keys
            .iter()
            .map(|(key, stats)| {
                let mut ranked: Vec<(&Option<String>, &UnitStats)> = stats.units.iter().collect();
                // Stable sort: equal counts keep first-seen order.
                ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count));

                let (suggested, top) = ranked[0];
                let distinct_units = stats.units.keys().filter(|u| u.is_some()).count();
                let units_seen = ranked
                    .iter()
                    .map(|(unit, s)| format!("{}×{}", unit.as_deref().unwrap_or("None"), s.count))
                    .collect::<Vec<_>>()
                    .join("; ");
                let sources = stats
                    .sources
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");

                UnitSuggestion {
                    key: key.clone(),
                    suggested_unit: suggested.clone(),
                    observations: stats.units.values().map(|s| s.count).sum(),
                    units_seen,
                    example_value: top.example.clone(),
                    conflict: distinct_units > 1,
                    sources,
                }
            })
            .collect()
    }
}
