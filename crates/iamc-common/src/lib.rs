//! Shared utilities for the IAMC conversion crates.
//!
//! Text normalisation used for key matching, numeric formatting used when a
//! numeric cell has to serve as a lookup key, and Polars `AnyValue` helpers
//! for the delimited-file reader.

pub mod numeric;
pub mod polars;
pub mod text;

// Re-export commonly used functions at crate root for convenience
pub use numeric::{format_numeric, parse_f64, parse_i64, parse_year};
pub use polars::any_to_string;
pub use text::{collapse_whitespace, normalize_header, split_components};
