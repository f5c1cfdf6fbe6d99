//! CLI argument definitions for konverter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use iamc_cli::config::Overrides;
use iamc_report::OutputFormat;

#[derive(Parser)]
#[command(
    name = "konverter",
    version,
    about = "Convert model result files to IAMC wide tables",
    long_about = "Convert heterogeneous model result files to the IAMC wide format.\n\n\
                  A control workbook (variable_mapping, region_mapping) names the source\n\
                  files, their columns and the canonical variable names."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert every file named in the control table.
    Convert(ConvertArgs),

    /// Scan an input directory and write an overview workbook.
    Overview(OverviewArgs),

    /// Show how unit strings are normalized.
    Units(UnitsArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Directory the control table's file locations are relative to (default: input).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for converted files and the run log (default: output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Control workbook (default: mapping.xlsx).
    #[arg(long = "mapping", value_name = "XLSX")]
    pub mapping: Option<PathBuf>,

    /// Workbook with shared variables, regions, scenarios and models sheets.
    #[arg(long = "dictionary", value_name = "XLSX")]
    pub dictionary: Option<PathBuf>,

    /// Output file format (default: xlsx).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Report the unit reconciliation without rewriting the control workbook.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not write observed units back into the control workbook.
    #[arg(long = "no-unit-suggestions")]
    pub no_unit_suggestions: bool,

    /// Warn about units that are not built from known physical units.
    #[arg(long = "validate-units")]
    pub validate_units: bool,

    /// TOML file with run settings; flags given here take precedence.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,
}

impl ConvertArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            mapping: self.mapping.clone(),
            dictionary: self.dictionary.clone(),
            format: self.format.map(OutputFormat::from),
            dry_run: self.dry_run,
            no_unit_suggestions: self.no_unit_suggestions,
            validate_units: self.validate_units,
        }
    }
}

#[derive(Parser)]
pub struct OverviewArgs {
    /// Directory to scan.
    #[arg(long = "input-dir", value_name = "DIR", default_value = "input")]
    pub input_dir: PathBuf,

    /// Overview workbook to write.
    #[arg(long = "output", value_name = "XLSX", default_value = "output/overview.xlsx")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct UnitsArgs {
    /// Unit strings to normalize.
    #[arg(value_name = "UNIT", required = true)]
    pub units: Vec<String>,

    /// Also check each normalized unit against the unit grammar.
    #[arg(long = "validate")]
    pub validate: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
