//! DataFrame to [`RawTable`] conversion.

use std::path::Path;

use iamc_common::{any_to_string, normalize_header};
use iamc_model::{CellValue, RawTable};
use polars::prelude::{AnyValue, DataFrame};

use crate::error::{IngestError, Result};

/// Copies a DataFrame read from `path` into a [`RawTable`]. Nulls become
/// empty cells; every other value keeps its text form.
pub fn dataframe_to_table(df: &DataFrame, path: &Path) -> Result<RawTable> {
    let columns = df.get_columns();
    let headers: Vec<String> = columns
        .iter()
        .map(|col| normalize_header(col.name().as_str()))
        .collect();
    let mut rows = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let mut cells = Vec::with_capacity(columns.len());
        for col in columns {
            let value = col.get(row_idx).map_err(|source| IngestError::CsvParse {
                path: path.to_path_buf(),
                source,
            })?;
            cells.push(any_to_cell(value));
        }
        if !cells.iter().all(CellValue::is_blank) {
            rows.push(cells);
        }
    }
    RawTable::new(headers, rows).map_err(|source| IngestError::Table {
        path: path.to_path_buf(),
        source,
    })
}

fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Empty,
        other => {
            let text = any_to_string(other);
            if text.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text)
            }
        }
    }
}
