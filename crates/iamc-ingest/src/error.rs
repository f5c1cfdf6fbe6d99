//! Error types for file ingestion.

use std::path::PathBuf;

use iamc_model::{FailureKind, ModelError};
use thiserror::Error;

/// Errors that can occur while loading control tables, dictionaries and
/// source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension '{extension}' for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },

    // === Spreadsheet Errors ===
    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' not found in {path} (available: {})", available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },

    // === Delimited Errors ===
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("failed to read CSV header of {path}: {source}")]
    CsvHeader {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid separator '{separator}': expected a single character")]
    InvalidSeparator { separator: String },

    // === Table Shape Errors ===
    #[error("sheet '{sheet}' in {path} is missing columns: {}", columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        sheet: String,
        columns: Vec<String>,
    },

    #[error("malformed table in {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

impl IngestError {
    /// Effect on a batch run when a source file fails to load.
    ///
    /// Control and dictionary loading failures are always fatal; callers
    /// decide that from context.
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::MissingColumns { .. } => FailureKind::ColumnMissing,
            _ => FailureKind::FileSkip,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::FileRead {
            path: path.into(),
            source,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
