use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RowTooWide {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("row index {row} out of range for table with {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// How a failure affects a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Aborts the whole run before any file is processed.
    FatalConfig,
    /// The source file is missing, unreadable or of an unknown type.
    FileSkip,
    /// A configured source column is absent from the loaded table.
    ColumnMissing,
    /// A value has no dictionary entry. Never fatal.
    MappingGap,
    /// Every row was dropped after mapping.
    EmptyResult,
    /// The long-to-wide reshape could not be performed.
    ReshapeFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::FatalConfig => "fatal configuration error",
            FailureKind::FileSkip => "file skipped",
            FailureKind::ColumnMissing => "column missing",
            FailureKind::MappingGap => "mapping gap",
            FailureKind::EmptyResult => "empty result",
            FailureKind::ReshapeFailure => "reshape failure",
        };
        f.write_str(label)
    }
}
