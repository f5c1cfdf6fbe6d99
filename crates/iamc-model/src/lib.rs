pub mod error;
pub mod mapping;
pub mod record;
pub mod table;
pub mod units;
pub mod wide;

pub use error::{FailureKind, ModelError, Result};
pub use mapping::{ColumnConfig, FileIdentity, MappingRule};
pub use record::{CanonicalRecord, YearLabel};
pub use table::{CellValue, RawRecord, RawTable};
pub use units::{ObservationKey, Provenance, UnitSuggestion};
pub use wide::{KEY_COLUMNS, WideKey, WideRow, WideTable};
