#![deny(unsafe_code)]

//! Mapping resolution.
//!
//! Turns control-table rows into [`FileGroup`]s (one per source file and
//! model) and holds the lookup dictionaries used while transforming rows.
//!
//! Two tie-break rules coexist and are intentional:
//!
//! * column selection for a group comes from its **first** row;
//! * the variable dictionary keeps the **last** row for a repeated original
//!   value.

pub mod dictionary;
pub mod group;

pub use dictionary::{DictionarySet, ValueDictionary, VariableDictionary};
pub use group::{ConfigConflict, FileGroup, group};
