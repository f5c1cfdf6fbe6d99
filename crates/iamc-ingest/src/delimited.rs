//! Delimited-file reading.
//!
//! Data files go through the Polars CSV reader with schema inference turned
//! off, so every column arrives as text and no leading zeros or year labels
//! are reinterpreted. Header-only peeks for the overview use the `csv` crate.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use iamc_common::normalize_header;
use iamc_model::RawTable;
use polars::prelude::{CsvEncoding, CsvReadOptions, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::polars_utils::dataframe_to_table;
use crate::workbook::ensure_file;

/// Separator used when a mapping row leaves the field blank.
pub const DEFAULT_SEPARATOR: u8 = b',';

/// Turns a configured separator into a single byte.
///
/// Blank means comma; `\t` and `tab` spell a tab.
pub fn parse_separator(raw: Option<&str>) -> Result<u8> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_SEPARATOR);
    };
    if raw == "\t" {
        return Ok(b'\t');
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_SEPARATOR);
    }
    if trimmed == "\\t" || trimmed.eq_ignore_ascii_case("tab") {
        return Ok(b'\t');
    }
    match trimmed.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(IngestError::InvalidSeparator {
            separator: raw.to_string(),
        }),
    }
}

/// Reads a delimited file with a header row into a text-only table.
pub fn read_delimited(path: &Path, separator: u8) -> Result<RawTable> {
    ensure_file(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .finish()
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
    let table = dataframe_to_table(&df, path)?;
    debug!(
        path = %path.display(),
        separator = %char::from(separator).escape_default(),
        rows = table.len(),
        columns = table.width(),
        "delimited file loaded"
    );
    Ok(table)
}

/// Guesses the separator from the first line: the most frequent of `;`,
/// `,` and tab, with comma winning ties and empty lines.
pub fn sniff_separator(path: &Path) -> Result<u8> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut first = String::new();
    BufReader::new(file)
        .read_line(&mut first)
        .map_err(|e| IngestError::read(path, e))?;
    Ok(sniff_line(&first))
}

fn sniff_line(line: &str) -> u8 {
    let count = |sep: char| line.chars().filter(|c| *c == sep).count();
    let candidates = [(b',', count(',')), (b';', count(';')), (b'\t', count('\t'))];
    candidates
        .iter()
        .fold((DEFAULT_SEPARATOR, 0), |best, &(sep, n)| {
            if n > best.1 { (sep, n) } else { best }
        })
        .0
}

/// Reads only the header row of a delimited file.
pub fn read_header(path: &Path, separator: u8) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvHeader {
            path: path.to_path_buf(),
            source,
        })?;
    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|source| IngestError::CsvHeader {
            path: path.to_path_buf(),
            source,
        })?;
    if !found {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(normalize_header).collect())
}
