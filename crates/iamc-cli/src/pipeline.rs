//! The `convert` batch run.
//!
//! Only configuration problems end a run early. Every other failure is
//! confined to its file group: it is logged, the group is marked skipped and
//! the loop moves on. The run log is written in every case.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use iamc_ingest::{SourceRequest, load_control_table, load_dictionary_file, load_source};
use iamc_map::{DictionarySet, FileGroup, group};
use iamc_model::{FailureKind, Provenance};
use iamc_report::{
    ControlUpdate, LogLevel, RunLog, output_file_name, update_control_workbook, write_wide_table,
};
use iamc_transform::{RowTransformer, UNKNOWN_MODEL, UnitCollector, reshape, validate_unit};
use tracing::{debug, info_span};

use crate::config::RunSettings;
use crate::types::{ConvertResult, GroupStatus, GroupSummary};

/// How many unmatched control rows are listed when no unit was filled.
const UNMATCHED_LISTING_LIMIT: usize = 20;

/// Runs the whole conversion and writes the run log.
///
/// # Errors
///
/// Returns an error only for fatal configuration problems (unreadable
/// control table or dictionary file) or when the run log itself cannot be
/// written.
pub fn run_convert(settings: &RunSettings) -> Result<ConvertResult> {
    let mut log = RunLog::new();
    let outcome = convert(settings, &mut log);
    if let Err(error) = &outcome {
        log.error(format!("{}: {error:#}", FailureKind::FatalConfig));
    }
    let log_path = settings.log_path();
    log.write_to(&log_path)
        .with_context(|| format!("write run log {}", log_path.display()))?;

    let (groups, units) = outcome?;
    Ok(ConvertResult {
        output_dir: settings.output_dir.clone(),
        log_path,
        groups,
        units,
        warnings: log.count(LogLevel::Warning),
        errors: log.count(LogLevel::Error),
    })
}

type Converted = (Vec<GroupSummary>, Option<ControlUpdate>);

fn convert(settings: &RunSettings, log: &mut RunLog) -> Result<Converted> {
    let control = load_control_table(&settings.mapping)
        .with_context(|| format!("load control table {}", settings.mapping.display()))?;
    let region_pairs = control.regions.is_some().then(|| control.region_pairs());
    if region_pairs.is_none() {
        log.info("no 'region_mapping' sheet found, regions are kept as they are");
    }
    let mut dictionaries = DictionarySet::from_region_pairs(region_pairs.as_deref());
    if region_pairs.is_some() && dictionaries.regions.is_none() {
        log.info("'region_mapping' sheet has no pairs, regions are kept as they are");
    }
    if let Some(path) = &settings.dictionary {
        let file = load_dictionary_file(path)
            .with_context(|| format!("load dictionary file {}", path.display()))?;
        dictionaries = dictionaries.with_dictionary_pairs(
            &file.variables,
            &file.regions,
            &file.scenarios,
            &file.models,
        );
        log.info(format!(
            "dictionary file {} loaded: {} variables, {} regions, {} scenarios, {} models",
            path.display(),
            file.variables.len(),
            file.regions.len(),
            file.scenarios.len(),
            file.models.len()
        ));
    }

    let groups = group(&control.rules());
    log.info(format!("{} file group(s) to process", groups.len()));

    let transformer = RowTransformer::new(&dictionaries);
    let mut collector = UnitCollector::new();
    let summaries = groups
        .iter()
        .map(|file_group| {
            let span = info_span!("group", file = %file_group.identity);
            let _guard = span.enter();
            process_group(settings, &transformer, file_group, &mut collector, log)
        })
        .collect();

    let units = reconcile_units(settings, &collector, log);
    Ok((summaries, units))
}

/// A group failure with its category and log message.
struct GroupFailure {
    kind: FailureKind,
    message: String,
}

impl GroupFailure {
    fn new(kind: FailureKind, error: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

fn process_group(
    settings: &RunSettings,
    transformer: &RowTransformer<'_>,
    file_group: &FileGroup,
    collector: &mut UnitCollector,
    log: &mut RunLog,
) -> GroupSummary {
    let identity = &file_group.identity;
    let model = match file_group.declared_model().trim() {
        "" => UNKNOWN_MODEL.to_string(),
        declared => declared.to_string(),
    };
    let mut summary = GroupSummary {
        file: identity.to_string(),
        model: model.clone(),
        rows: 0,
        unmapped: 0,
        output: None,
        status: GroupStatus::Empty,
    };
    log.info(format!("--- {identity} ---"));
    for conflict in file_group.config_conflicts() {
        debug!(
            row = conflict.row,
            fields = ?conflict.fields,
            "row disagrees with the group's column selection; first row wins"
        );
    }

    match convert_group(settings, transformer, file_group, &model, collector, log) {
        Ok(outcome) => {
            summary.rows = outcome.rows;
            summary.unmapped = outcome.unmapped;
            if let Some(path) = outcome.output {
                summary.output = Some(path);
                summary.status = GroupStatus::Written;
            }
        }
        Err(failure) => {
            log.error(format!(
                "{}: {}, skipped {}",
                failure.kind, failure.message, identity.file_name
            ));
            summary.status = GroupStatus::Skipped(failure.kind);
        }
    }
    summary
}

struct GroupOutcome {
    rows: usize,
    unmapped: usize,
    output: Option<PathBuf>,
}

fn convert_group(
    settings: &RunSettings,
    transformer: &RowTransformer<'_>,
    file_group: &FileGroup,
    model: &str,
    collector: &mut UnitCollector,
    log: &mut RunLog,
) -> std::result::Result<GroupOutcome, GroupFailure> {
    let identity = &file_group.identity;
    let config = file_group.config();
    let path = settings.input_dir.join(identity.relative_path());
    let loaded = load_source(&SourceRequest {
        path: &path,
        sheet: config.sheet_name.as_deref(),
        separator: config.separator.as_deref(),
        index_patterns: &settings.index_patterns,
    })
    .map_err(|e| GroupFailure::new(e.kind(), e))?;
    debug!(
        sheet = %loaded.sheet,
        rows = loaded.table.len(),
        columns = loaded.table.width(),
        "source loaded"
    );

    let output = transformer
        .transform(&loaded.table, file_group)
        .map_err(|e| GroupFailure::new(e.kind(), e))?;
    report_misses(&output, log);

    let mut outcome = GroupOutcome {
        rows: output.rows.len(),
        unmapped: output.unmapped_keys.len(),
        output: None,
    };
    if output.is_empty() {
        log.info(format!(
            "{}: no valid rows after mapping, no output written for {}",
            FailureKind::EmptyResult,
            identity.file_name
        ));
        return Ok(outcome);
    }

    let provenance = Provenance {
        file: identity.file_name.clone(),
        sheet: loaded.sheet.clone(),
        column: config.variable_column.clone().unwrap_or_default(),
    };
    output.record_units(collector, &provenance);

    if settings.validate_units {
        let units: BTreeSet<&str> = output.records().map(|r| r.unit.as_str()).collect();
        for unit in units {
            if let Err(error) = validate_unit(unit) {
                log.warn(format!("unit check: {error}"));
            }
        }
    }
    if output.non_numeric_values > 0 {
        log.warn(format!(
            "{} mapped row(s) with an empty or non-numeric value were left out",
            output.non_numeric_values
        ));
    }
    if output.blank_years > 0 {
        log.warn(format!(
            "{} mapped row(s) with a blank year were left out",
            output.blank_years
        ));
    }

    let wide = reshape(output.records()).map_err(|e| GroupFailure::new(e.kind(), e))?;
    let file_name = output_file_name(
        &settings.output_prefix,
        model,
        identity.file_stem(),
        settings.format,
    );
    let target = settings.output_dir.join(file_name);
    write_wide_table(&target, &settings.output_sheet, &wide, settings.format)
        .map_err(|e| GroupFailure::new(FailureKind::FileSkip, e))?;
    log.info(format!(
        "{} row(s) across {} year(s) written to {}",
        wide.len(),
        wide.years.len(),
        target.display()
    ));
    outcome.output = Some(target);
    Ok(outcome)
}

fn report_misses(output: &iamc_transform::TransformOutput, log: &mut RunLog) {
    let listings = [
        ("variables found but not mapped", &output.unmapped_keys),
        (
            "regions not in the region mapping, kept as they are",
            &output.unmapped_regions,
        ),
        (
            "scenarios not in the scenario mapping, kept as they are",
            &output.unmapped_scenarios,
        ),
        (
            "models not in the model mapping, kept as they are",
            &output.unmapped_models,
        ),
    ];
    for (label, values) in listings {
        if values.is_empty() {
            continue;
        }
        log.warn(format!("{} {label}:", values.len()));
        for value in values {
            log.warn(format!("  {value}"));
        }
    }
}

fn reconcile_units(
    settings: &RunSettings,
    collector: &UnitCollector,
    log: &mut RunLog,
) -> Option<ControlUpdate> {
    if !settings.unit_suggestions {
        debug!("unit suggestions disabled");
        return None;
    }
    if collector.is_empty() {
        log.info("no units observed, control table left unchanged");
        return None;
    }
    let suggestions = collector.suggestions();
    match update_control_workbook(&settings.mapping, &suggestions, settings.dry_run) {
        Ok(update) => {
            log_unit_update(&settings.mapping, &update, log);
            Some(update)
        }
        Err(error) => {
            log.error(format!("unit suggestions not written: {error}"));
            None
        }
    }
}

fn log_unit_update(mapping: &Path, update: &ControlUpdate, log: &mut RunLog) {
    let verb = if update.written { "filled" } else { "would fill" };
    log.info(format!(
        "units: {verb} {} empty cell(s) in {} from {} observed key(s)",
        update.fill_count,
        mapping.display(),
        update.observed
    ));
    if update.conflicts > 0 {
        log.warn(format!(
            "units: {} key(s) observed with more than one unit, see the '{}' sheet",
            update.conflicts,
            iamc_report::CONFLICTS_SHEET
        ));
    }
    if update.fill_count == 0 && !update.unmatched.is_empty() {
        log.info(format!(
            "units: {} control row(s) with an empty unit have no observation, first {}:",
            update.unmatched.len(),
            UNMATCHED_LISTING_LIMIT.min(update.unmatched.len())
        ));
        for key in update.unmatched.iter().take(UNMATCHED_LISTING_LIMIT) {
            log.info(format!("  {key}"));
        }
    }
}
