use iamc_model::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column(s) not found in source table: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("no source column configured for '{field}'")]
    UnconfiguredColumn { field: &'static str },

    #[error("value for '{variable}' in region '{region}', year {year} is not a finite number")]
    NonFiniteValue {
        variable: String,
        region: String,
        year: String,
    },
}

impl TransformError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransformError::MissingColumns { .. } | TransformError::UnconfiguredColumn { .. } => {
                FailureKind::ColumnMissing
            }
            TransformError::NonFiniteValue { .. } => FailureKind::ReshapeFailure,
        }
    }
}

/// A unit string rejected by [`crate::units::validate_unit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitValidationError {
    #[error("empty unit")]
    Empty,

    #[error("'{token}' in unit '{unit}' is not a known physical unit")]
    UnknownToken { unit: String, token: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
