//! Long to wide reshaping.

use std::collections::{BTreeMap, HashMap};

use iamc_model::{CanonicalRecord, WideKey, WideRow, WideTable, YearLabel};
use indexmap::IndexSet;

use crate::error::{Result, TransformError};

/// Pivots records into one row per (model, scenario, region, variable,
/// unit) and one column per year.
///
/// Values colliding on key and year are summed. Records without a value or
/// with a blank year label are ignored; a key or year seen only on such
/// records does not appear. Rows are sorted by key. Integer years come first
/// in ascending order, other labels follow in first-seen order.
///
/// Fails when a summed cell is not finite, e.g. a source value of `inf`.
pub fn reshape<'a, I>(records: I) -> Result<WideTable>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut years: IndexSet<YearLabel> = IndexSet::new();
    let mut cells: BTreeMap<WideKey, HashMap<YearLabel, f64>> = BTreeMap::new();

    for record in records {
        let Some(value) = record.value else {
            continue;
        };
        if record.year.is_blank() {
            continue;
        }
        years.insert(record.year.clone());
        *cells
            .entry(record.wide_key())
            .or_default()
            .entry(record.year.clone())
            .or_insert(0.0) += value;
    }

    let mut numeric: Vec<i64> = years.iter().filter_map(YearLabel::as_year).collect();
    numeric.sort_unstable();
    let ordered: Vec<YearLabel> = numeric
        .into_iter()
        .map(YearLabel::Year)
        .chain(years.into_iter().filter(|y| y.as_year().is_none()))
        .collect();

    let mut rows = Vec::with_capacity(cells.len());
    for (key, by_year) in cells {
        if let Some((year, _)) = by_year.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TransformError::NonFiniteValue {
                variable: key.variable.clone(),
                region: key.region.clone(),
                year: year.to_string(),
            });
        }
        rows.push(WideRow {
            values: ordered.iter().map(|y| by_year.get(y).copied()).collect(),
            key,
        });
    }

    Ok(WideTable {
        years: ordered,
        rows,
    })
}
