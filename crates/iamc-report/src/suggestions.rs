//! Writing unit suggestions back into the control table.
//!
//! [`reconcile`] is pure: it fills empty `Unit` cells from unambiguous
//! suggestions. [`update_control_workbook`] applies it to the control
//! workbook on disk and adds the observation report sheets.

use std::collections::HashMap;
use std::path::Path;

use iamc_common::collapse_whitespace;
use iamc_ingest::read_all_sheets;
use iamc_model::mapping::{SOURCE_MODEL, UNIT, VARIABLE_MAPPING_SHEET, VARIABLE_NEW, VARIABLE_ORIGINAL};
use iamc_model::units::{
    CONFLICT, EXAMPLE_VALUE, OBSERVATIONS, SOURCES, SUGGESTED_UNIT, UNITS_SEEN,
};
use iamc_model::{CellValue, RawTable, UnitSuggestion};
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::workbook::save_sheets;

/// Report sheet listing every observed key.
pub const OBSERVED_SHEET: &str = "auto_units_observed";
/// Report sheet listing keys with more than one observed unit.
pub const CONFLICTS_SHEET: &str = "auto_units_conflicts";

type JoinKey = (String, String, String);

fn join_key(original: &str, canonical: &str, model: &str) -> JoinKey {
    (
        collapse_whitespace(original),
        collapse_whitespace(canonical),
        collapse_whitespace(model),
    )
}

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub table: RawTable,
    pub fill_count: usize,
    /// Data rows with an empty unit and no matching suggestion.
    pub unmatched_rows: Vec<usize>,
    /// Data rows with an empty unit whose suggestion is ambiguous.
    pub conflicting_rows: Vec<usize>,
}

impl Reconciliation {
    /// `original | canonical | model` for each unmatched row.
    pub fn unmatched_keys(&self) -> Vec<String> {
        self.unmatched_rows
            .iter()
            .filter_map(|row| self.table.record(*row))
            .map(|record| {
                format!(
                    "{} | {} | {}",
                    record.text(VARIABLE_ORIGINAL),
                    record.text(VARIABLE_NEW),
                    record.text(SOURCE_MODEL)
                )
            })
            .collect()
    }
}

/// Fills empty `Unit` cells of the mapping table from suggestions.
///
/// Rows join on (original, canonical, model) after whitespace collapsing on
/// both sides. A cell is filled only when it is blank and the suggestion has
/// a unit and no conflict. Key cells are left exactly as the user wrote
/// them. Running it again with the same suggestions fills nothing.
pub fn reconcile(control: &RawTable, suggestions: &[UnitSuggestion]) -> Reconciliation {
    let mut lookup: HashMap<JoinKey, &UnitSuggestion> = HashMap::new();
    for suggestion in suggestions {
        let key = join_key(
            &suggestion.key.original_variable,
            &suggestion.key.canonical_variable,
            &suggestion.key.model,
        );
        lookup.entry(key).or_insert(suggestion);
    }

    let mut table = control.clone();
    let unit_col = table.ensure_column(UNIT);
    let mut fills: Vec<(usize, String)> = Vec::new();
    let mut unmatched_rows = Vec::new();
    let mut conflicting_rows = Vec::new();

    for (row, record) in table.records().enumerate() {
        let key = join_key(
            &record.text(VARIABLE_ORIGINAL),
            &record.text(VARIABLE_NEW),
            &record.text(SOURCE_MODEL),
        );
        if !record.cells()[unit_col].is_blank() {
            continue;
        }
        let Some(suggestion) = lookup.get(&key) else {
            unmatched_rows.push(row);
            continue;
        };
        match &suggestion.suggested_unit {
            Some(unit) if suggestion.is_fillable() => fills.push((row, unit.clone())),
            _ if suggestion.conflict => conflicting_rows.push(row),
            _ => {}
        }
    }

    let fill_count = fills.len();
    for (row, unit) in fills {
        // Rows come from enumerating this table, so the index is valid.
        let _ = table.set_cell(row, unit_col, CellValue::Text(unit));
    }

    Reconciliation {
        table,
        fill_count,
        unmatched_rows,
        conflicting_rows,
    }
}

const SUGGESTION_HEADERS: [&str; 9] = [
    VARIABLE_ORIGINAL,
    VARIABLE_NEW,
    SOURCE_MODEL,
    SUGGESTED_UNIT,
    OBSERVATIONS,
    UNITS_SEEN,
    EXAMPLE_VALUE,
    CONFLICT,
    SOURCES,
];

fn suggestion_row(s: &UnitSuggestion) -> Vec<CellValue> {
    vec![
        CellValue::from(s.key.original_variable.as_str()),
        CellValue::from(s.key.canonical_variable.as_str()),
        CellValue::from(s.key.model.as_str()),
        CellValue::from(s.suggested_unit.clone()),
        CellValue::Number(s.observations as f64),
        CellValue::from(s.units_seen.as_str()),
        CellValue::from(s.example_value.clone()),
        CellValue::Bool(s.conflict),
        CellValue::from(s.sources.as_str()),
    ]
}

fn suggestion_table<'a, I>(suggestions: I) -> RawTable
where
    I: IntoIterator<Item = &'a UnitSuggestion>,
{
    let headers = SUGGESTION_HEADERS.iter().map(|h| (*h).to_string()).collect();
    let rows = suggestions.into_iter().map(suggestion_row).collect();
    // Every row has exactly one cell per header.
    RawTable::new(headers, rows).unwrap_or_default()
}

/// All suggestions, unambiguous keys first, then by canonical variable and
/// model.
pub fn observed_table(suggestions: &[UnitSuggestion]) -> RawTable {
    let mut sorted: Vec<&UnitSuggestion> = suggestions.iter().collect();
    sorted.sort_by(|a, b| {
        (a.conflict, &a.key.canonical_variable, &a.key.model).cmp(&(
            b.conflict,
            &b.key.canonical_variable,
            &b.key.model,
        ))
    });
    suggestion_table(sorted)
}

/// Only the suggestions with conflicting units, in the same order.
pub fn conflicts_table(suggestions: &[UnitSuggestion]) -> RawTable {
    let conflicting: Vec<UnitSuggestion> = suggestions
        .iter()
        .filter(|s| s.conflict)
        .cloned()
        .collect();
    observed_table(&conflicting)
}

/// Summary of a control workbook update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlUpdate {
    pub fill_count: usize,
    pub observed: usize,
    pub conflicts: usize,
    /// Mapping rows with an empty unit and no observation.
    pub unmatched: Vec<String>,
    /// Rows left empty because their observations disagree.
    pub conflicting_rows: usize,
    /// False for a dry run.
    pub written: bool,
}

/// Reconciles the `variable_mapping` sheet of the workbook at `path` and
/// rewrites the workbook with the report sheets.
///
/// Other sheets keep their cell values; formatting is not preserved. The
/// conflicts sheet is written only when there are conflicts and a stale one
/// is removed otherwise. With `dry_run` nothing is written.
pub fn update_control_workbook(
    path: &Path,
    suggestions: &[UnitSuggestion],
    dry_run: bool,
) -> Result<ControlUpdate> {
    let mut sheets = read_all_sheets(path)?;
    let mapping_idx = sheets
        .iter()
        .position(|(name, _)| name.trim() == VARIABLE_MAPPING_SHEET)
        .ok_or_else(|| ReportError::MissingSheet {
            path: path.to_path_buf(),
            sheet: VARIABLE_MAPPING_SHEET.to_string(),
        })?;

    let mut mapping = sheets[mapping_idx].1.clone();
    mapping.trim_headers();
    let result = reconcile(&mapping, suggestions);
    let observed = observed_table(suggestions);
    let conflicts = conflicts_table(suggestions);

    let update = ControlUpdate {
        fill_count: result.fill_count,
        observed: observed.len(),
        conflicts: conflicts.len(),
        unmatched: result.unmatched_keys(),
        conflicting_rows: result.conflicting_rows.len(),
        written: !dry_run,
    };
    if dry_run {
        info!(
            path = %path.display(),
            would_fill = update.fill_count,
            "dry run, control workbook left unchanged"
        );
        return Ok(update);
    }

    sheets[mapping_idx].1 = result.table;
    replace_sheet(&mut sheets, OBSERVED_SHEET, Some(observed));
    let conflicts = if conflicts.is_empty() {
        None
    } else {
        Some(conflicts)
    };
    replace_sheet(&mut sheets, CONFLICTS_SHEET, conflicts);
    save_sheets(path, &sheets)?;

    debug!(path = %path.display(), sheets = sheets.len(), "control workbook rewritten");
    Ok(update)
}

fn replace_sheet(sheets: &mut Vec<(String, RawTable)>, name: &str, table: Option<RawTable>) {
    let existing = sheets.iter().position(|(n, _)| n == name);
    match (existing, table) {
        (Some(idx), Some(table)) => sheets[idx].1 = table,
        (Some(idx), None) => {
            sheets.remove(idx);
        }
        (None, Some(table)) => sheets.push((name.to_string(), table)),
        (None, None) => {}
    }
}
