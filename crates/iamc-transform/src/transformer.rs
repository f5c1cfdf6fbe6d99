//! Applying a file group's mappings to one raw table.

use std::borrow::Cow;
use std::collections::BTreeSet;

use iamc_common::{format_numeric, split_components};
use iamc_map::{DictionarySet, FileGroup, ValueDictionary, VariableDictionary};
use iamc_model::mapping::{
    SOURCE_REGION_COLUMN, SOURCE_SCENARIO, SOURCE_VALUE, SOURCE_YEAR, VARIABLE_COLUMN,
};
use iamc_model::{
    CanonicalRecord, CellValue, ObservationKey, Provenance, RawRecord, RawTable, YearLabel,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::collector::UnitCollector;
use crate::error::{Result, TransformError};

/// Model name used when a group declares none.
pub const UNKNOWN_MODEL: &str = "Unknown Model";
/// Unit used when neither a unit column nor an override is configured.
pub const UNDEFINED_UNIT: &str = "undefined";

/// Separator placed between the parts of a composite variable key.
const COMPONENT_JOIN: &str = " | ";

/// A canonical record with the source key and model it was mapped from.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub original_key: String,
    /// Model before model-dictionary translation, as the control table
    /// names it.
    pub source_model: String,
    pub record: CanonicalRecord,
}

/// Result of transforming one file.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub rows: Vec<MappedRow>,
    /// Distinct non-empty keys without a dictionary entry, sorted.
    pub unmapped_keys: BTreeSet<String>,
    /// Regions absent from the region dictionary, sorted.
    pub unmapped_regions: BTreeSet<String>,
    /// Scenarios absent from the scenario dictionary, sorted.
    pub unmapped_scenarios: BTreeSet<String>,
    /// Model ids absent from the model dictionary, sorted.
    pub unmapped_models: BTreeSet<String>,
    /// Mapped rows whose value cell was empty or not numeric.
    pub non_numeric_values: usize,
    /// Mapped rows with a value but a blank year; the reshape leaves them out.
    pub blank_years: usize,
}

impl TransformOutput {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.rows.iter().map(|row| &row.record)
    }

    /// Records this file's units into the run-wide collector.
    ///
    /// Rows are grouped by (original key, canonical variable, source model,
    /// unit); each group is recorded once with its row count and first value
    /// as example. The source model is used so observations join back to the
    /// control table even when a model dictionary renames the model.
    pub fn record_units(&self, collector: &mut UnitCollector, source: &Provenance) {
        let mut groups: IndexMap<(&str, &str, &str, &str), (usize, Option<f64>)> = IndexMap::new();
        for row in &self.rows {
            let r = &row.record;
            let entry = groups
                .entry((
                    row.original_key.as_str(),
                    r.variable.as_str(),
                    row.source_model.as_str(),
                    r.unit.as_str(),
                ))
                .or_insert((0, None));
            entry.0 += 1;
            if entry.1.is_none() {
                entry.1 = r.value;
            }
        }
        for ((original, canonical, model, unit), (count, example)) in groups {
            let example = example.map(format_numeric);
            collector.record(
                ObservationKey::new(original, canonical, model),
                Some(unit),
                source,
                example.as_deref(),
                count,
            );
        }
    }
}

/// Applies group mappings and run-wide dictionaries to raw tables.
#[derive(Debug, Clone, Copy)]
pub struct RowTransformer<'a> {
    dictionaries: &'a DictionarySet,
}

/// Per-row source of a resolved field.
enum FieldSource<'t> {
    Column(&'t str),
    Literal(String),
}

impl FieldSource<'_> {
    fn resolve(&self, record: &RawRecord<'_>) -> String {
        match self {
            FieldSource::Column(column) => record.text(column),
            FieldSource::Literal(value) => value.clone(),
        }
    }
}

impl<'a> RowTransformer<'a> {
    pub fn new(dictionaries: &'a DictionarySet) -> Self {
        Self { dictionaries }
    }

    /// The variable dictionary used for `group`: the group's own rules laid
    /// over the run-wide base dictionary, if any.
    pub fn variable_dictionary<'g>(&self, group: &'g FileGroup) -> Cow<'g, VariableDictionary> {
        match &self.dictionaries.variables {
            Some(base) => Cow::Owned(group.dictionary.overlay_on(base)),
            None => Cow::Borrowed(&group.dictionary),
        }
    }

    /// Maps one raw table into canonical records.
    ///
    /// Fails when a configured column is missing; the caller skips the file.
    /// An empty output means no row had a dictionary entry.
    pub fn transform(&self, raw: &RawTable, group: &FileGroup) -> Result<TransformOutput> {
        let mut table = raw.clone();
        table.trim_headers();
        let config = group.config();

        // Lookup keys.
        let variable_selector = config
            .variable_column
            .as_deref()
            .ok_or(TransformError::UnconfiguredColumn {
                field: VARIABLE_COLUMN,
            })?;
        let components = if config.is_composite_variable() {
            split_components(variable_selector)
        } else {
            vec![variable_selector.trim().to_string()]
        };
        let missing = table.missing_columns(components.iter().map(String::as_str));
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { columns: missing });
        }
        let keys: Vec<String> = table
            .records()
            .map(|record| {
                components
                    .iter()
                    .map(|column| record.text(column))
                    .collect::<Vec<_>>()
                    .join(COMPONENT_JOIN)
            })
            .collect();

        // Variable mapping.
        let dictionary = self.variable_dictionary(group);
        let mut output = TransformOutput::default();
        let mut kept: Vec<(usize, String, String)> = Vec::new();
        for (idx, key) in keys.into_iter().enumerate() {
            match dictionary.get(&key) {
                Some(canonical) => {
                    let canonical = canonical.to_string();
                    kept.push((idx, key, canonical));
                }
                None if key.is_empty() => {}
                None => {
                    output.unmapped_keys.insert(key);
                }
            }
        }
        if kept.is_empty() {
            debug!(group = %group.identity, "no rows matched the variable dictionary");
            return Ok(output);
        }

        // Remaining columns.
        let scenario_column = required(config.scenario_column.as_deref(), SOURCE_SCENARIO)?;
        let region_column = required(config.region_column.as_deref(), SOURCE_REGION_COLUMN)?;
        let year_column = required(config.year_column.as_deref(), SOURCE_YEAR)?;
        let value_column = required(config.value_column.as_deref(), SOURCE_VALUE)?;
        let unit_column = config.unit_column.as_deref();
        let mut wanted = vec![scenario_column, region_column, year_column, value_column];
        wanted.extend(unit_column);
        let missing = table.missing_columns(wanted);
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { columns: missing });
        }

        let model_source = self.model_source(&table, group.declared_model());
        let unit_fallback = config
            .unit_override
            .clone()
            .unwrap_or_else(|| UNDEFINED_UNIT.to_string());

        for (idx, original_key, variable) in kept {
            let Some(record) = table.record(idx) else {
                continue;
            };

            let source_model = model_source.resolve(&record);
            let model = self.translate_model(source_model.clone(), &mut output);
            let scenario = translate(
                self.dictionaries.scenarios.as_ref(),
                record.text(scenario_column),
                &mut output.unmapped_scenarios,
            );
            let region = translate(
                self.dictionaries.regions.as_ref(),
                record.text(region_column),
                &mut output.unmapped_regions,
            );
            let unit = match unit_column {
                Some(column) => {
                    let text = record.text(column);
                    if text.is_empty() { unit_fallback.clone() } else { text }
                }
                None => unit_fallback.clone(),
            };
            let year = record
                .get(year_column)
                .map(YearLabel::from_cell)
                .unwrap_or_else(|| YearLabel::Label(String::new()));
            let value = record.get(value_column).and_then(CellValue::as_f64);
            if value.is_none() {
                output.non_numeric_values += 1;
            } else if year.is_blank() {
                output.blank_years += 1;
            }

            output.rows.push(MappedRow {
                original_key,
                source_model,
                record: CanonicalRecord {
                    model,
                    scenario,
                    region,
                    variable,
                    unit,
                    year,
                    value,
                },
            });
        }

        debug!(
            group = %group.identity,
            rows = output.rows.len(),
            unmapped = output.unmapped_keys.len(),
            "rows transformed"
        );
        Ok(output)
    }

    fn model_source<'t>(&self, table: &'t RawTable, declared: &str) -> FieldSource<'t> {
        let declared = declared.trim();
        if declared.is_empty() {
            return FieldSource::Literal(UNKNOWN_MODEL.to_string());
        }
        match table.column_index(declared) {
            Some(idx) => FieldSource::Column(&table.headers()[idx]),
            None => FieldSource::Literal(declared.to_string()),
        }
    }

    fn translate_model(&self, model: String, output: &mut TransformOutput) -> String {
        translate(
            self.dictionaries.models.as_ref(),
            model,
            &mut output.unmapped_models,
        )
    }
}

fn required<'c>(column: Option<&'c str>, field: &'static str) -> Result<&'c str> {
    column.ok_or(TransformError::UnconfiguredColumn { field })
}

/// Identity-fallback substitution; misses are collected for reporting.
fn translate(
    dictionary: Option<&ValueDictionary>,
    value: String,
    misses: &mut BTreeSet<String>,
) -> String {
    let Some(dictionary) = dictionary else {
        return value;
    };
    if !value.is_empty() && !dictionary.contains(&value) && !misses.contains(&value) {
        misses.insert(value.clone());
    }
    dictionary.translate(&value)
}
