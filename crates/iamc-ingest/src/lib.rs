//! File ingestion for the IAMC conversion pipeline.
//!
//! Everything that touches the filesystem on the way in lives here:
//! spreadsheets through calamine, delimited files through the Polars CSV
//! reader, and the control/dictionary tables that drive the mapping.
//! All readers produce [`iamc_model::RawTable`] values.

pub mod control;
pub mod delimited;
pub mod dictionary;
pub mod error;
pub mod overview;
pub mod polars_utils;
pub mod source;
pub mod workbook;

pub use control::{ControlTable, load_control_table};
pub use delimited::{parse_separator, read_delimited, sniff_separator};
pub use dictionary::{DictionaryFile, load_dictionary_file};
pub use error::{IngestError, Result};
pub use overview::{OverviewEntry, OverviewScan, scan_input_dir};
pub use source::{LoadedSource, SourceFormat, SourceRequest, load_source};
pub use workbook::{read_all_sheets, read_sheet, sheet_names};
