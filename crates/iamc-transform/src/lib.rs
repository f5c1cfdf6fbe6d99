//! Row-level transformation for IAMC conversion.
//!
//! * [`units`] canonicalises free-text unit strings and optionally checks
//!   them against a small dimensional grammar.
//! * [`transformer`] applies a file group's mappings to one raw table.
//! * [`collector`] accumulates observed units across a whole run.
//! * [`pivot`] turns long records into the wide IAMC layout.

pub mod collector;
pub mod error;
pub mod pivot;
pub mod transformer;
pub mod units;

pub use collector::UnitCollector;
pub use error::{Result, TransformError, UnitValidationError};
pub use pivot::reshape;
pub use transformer::{MappedRow, RowTransformer, TransformOutput, UNDEFINED_UNIT, UNKNOWN_MODEL};
pub use units::{normalize_cell, normalize_unit, validate_unit};
