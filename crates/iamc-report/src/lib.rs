//! Output side of the IAMC conversion pipeline.
//!
//! Writes the per-file wide tables, reconciles observed units back into the
//! control workbook, and produces the run log and the input overview.

pub mod error;
pub mod overview;
pub mod run_log;
pub mod suggestions;
pub mod wide;
mod workbook;

pub use error::{ReportError, Result};
pub use overview::{overview_table, write_overview};
pub use run_log::{LogLevel, RunLog};
pub use suggestions::{
    CONFLICTS_SHEET, ControlUpdate, OBSERVED_SHEET, Reconciliation, conflicts_table,
    observed_table, reconcile, update_control_workbook,
};
pub use wide::{OutputFormat, output_file_name, write_wide_table};
