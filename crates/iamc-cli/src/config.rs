//! Run settings for `konverter convert`.
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and command-line flags. Flags override the file, the file
//! overrides the defaults.
//!
//! ```toml
//! input_dir = "input"
//! output_dir = "output"
//! mapping = "mapping.xlsx"
//! format = "csv"
//! output_prefix = "pyam_"
//! index_patterns = ["250424"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use iamc_report::OutputFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_INPUT_DIR: &str = "input";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_MAPPING: &str = "mapping.xlsx";
pub const DEFAULT_OUTPUT_PREFIX: &str = "pyam_";
pub const DEFAULT_OUTPUT_SHEET: &str = "pyam_data";
pub const DEFAULT_INDEX_PATTERN: &str = "250424";
pub const DEFAULT_LOG_FILE_NAME: &str = "error_log.txt";

/// Contents of a TOML run configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub dictionary: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub dry_run: Option<bool>,
    pub unit_suggestions: Option<bool>,
    pub validate_units: Option<bool>,
    pub output_prefix: Option<String>,
    pub output_sheet: Option<String>,
    pub index_patterns: Option<Vec<String>>,
    pub log_file_name: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), "run configuration loaded");
        Ok(config)
    }
}

/// Values given on the command line; `None` and `false` mean "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub dictionary: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub dry_run: bool,
    pub no_unit_suggestions: bool,
    pub validate_units: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mapping: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub format: OutputFormat,
    pub dry_run: bool,
    pub unit_suggestions: bool,
    pub validate_units: bool,
    pub output_prefix: String,
    pub output_sheet: String,
    pub index_patterns: Vec<String>,
    pub log_file_name: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            mapping: PathBuf::from(DEFAULT_MAPPING),
            dictionary: None,
            format: OutputFormat::default(),
            dry_run: false,
            unit_suggestions: true,
            validate_units: false,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_sheet: DEFAULT_OUTPUT_SHEET.to_string(),
            index_patterns: vec![DEFAULT_INDEX_PATTERN.to_string()],
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
        }
    }
}

impl RunSettings {
    /// Layers `file` and then `overrides` over the defaults.
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Self {
        let defaults = Self::default();
        Self {
            input_dir: overrides
                .input_dir
                .or(file.input_dir)
                .unwrap_or(defaults.input_dir),
            output_dir: overrides
                .output_dir
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            mapping: overrides
                .mapping
                .or(file.mapping)
                .unwrap_or(defaults.mapping),
            dictionary: overrides.dictionary.or(file.dictionary),
            format: overrides
                .format
                .or(file.format)
                .unwrap_or(defaults.format),
            dry_run: overrides.dry_run || file.dry_run.unwrap_or(defaults.dry_run),
            unit_suggestions: !overrides.no_unit_suggestions
                && file.unit_suggestions.unwrap_or(defaults.unit_suggestions),
            validate_units: overrides.validate_units
                || file.validate_units.unwrap_or(defaults.validate_units),
            output_prefix: file.output_prefix.unwrap_or(defaults.output_prefix),
            output_sheet: file.output_sheet.unwrap_or(defaults.output_sheet),
            index_patterns: file.index_patterns.unwrap_or(defaults.index_patterns),
            log_file_name: file.log_file_name.unwrap_or(defaults.log_file_name),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file_name)
    }
}
