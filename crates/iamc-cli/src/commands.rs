use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};
use iamc_cli::config::{ConfigFile, RunSettings};
use iamc_cli::pipeline::run_convert;
use iamc_cli::types::ConvertResult;
use iamc_ingest::scan_input_dir;
use iamc_report::write_overview;
use iamc_transform::{normalize_unit, validate_unit};
use tracing::{info, warn};

use crate::cli::{ConvertArgs, OverviewArgs, UnitsArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_convert_command(args: &ConvertArgs) -> Result<ConvertResult> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = RunSettings::resolve(file, args.overrides());
    info!(
        mapping = %settings.mapping.display(),
        input = %settings.input_dir.display(),
        output = %settings.output_dir.display(),
        format = %settings.format,
        dry_run = settings.dry_run,
        "starting conversion"
    );
    run_convert(&settings)
}

pub fn run_overview(args: &OverviewArgs) -> Result<()> {
    let scan = scan_input_dir(&args.input_dir)
        .with_context(|| format!("scan {}", args.input_dir.display()))?;
    for (path, reason) in &scan.failures {
        warn!(path = %path.display(), %reason, "file left out of the overview");
    }
    write_overview(&args.output, &scan)
        .with_context(|| format!("write overview {}", args.output.display()))?;
    println!(
        "Overview of {} sheet(s) written to {}",
        scan.entries.len(),
        args.output.display()
    );
    Ok(())
}

pub fn run_units(args: &UnitsArgs) {
    let mut table = Table::new();
    let mut header = vec![header_cell("Input"), header_cell("Normalized")];
    if args.validate {
        header.push(header_cell("Check"));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for raw in &args.units {
        let normalized = normalize_unit(raw);
        let mut row = vec![
            Cell::new(format!("{raw:?}")),
            match &normalized {
                Some(unit) => Cell::new(unit),
                None => Cell::new("-").fg(Color::DarkGrey),
            },
        ];
        if args.validate {
            row.push(match validate_unit(normalized.as_deref().unwrap_or_default()) {
                Ok(()) => Cell::new("ok").fg(Color::Green),
                Err(error) => Cell::new(error).fg(Color::Yellow),
            });
        }
        table.add_row(row);
    }
    println!("{table}");
}
