//! Library side of the `konverter` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
