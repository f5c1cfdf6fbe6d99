//! Source data file loading.

use std::path::Path;

use iamc_model::RawTable;
use tracing::debug;

use crate::delimited::{parse_separator, read_delimited};
use crate::error::{IngestError, Result};
use crate::workbook::read_sheet;

/// How a source file is read, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Delimited,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" => Some(SourceFormat::Workbook),
            "csv" => Some(SourceFormat::Delimited),
            _ => None,
        }
    }
}

/// Everything needed to load one source file.
#[derive(Debug, Clone, Copy)]
pub struct SourceRequest<'a> {
    pub path: &'a Path,
    /// Sheet for workbooks; `None` means the first sheet.
    pub sheet: Option<&'a str>,
    /// Separator for delimited files; `None` means comma.
    pub separator: Option<&'a str>,
    /// Delimited files whose name contains one of these carry a leading
    /// row-index column that is dropped.
    pub index_patterns: &'a [String],
}

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub table: RawTable,
    /// Resolved sheet name; empty for delimited files.
    pub sheet: String,
    pub format: SourceFormat,
}

/// Loads a source file into a table with trimmed headers.
pub fn load_source(request: &SourceRequest<'_>) -> Result<LoadedSource> {
    let path = request.path;
    let format = SourceFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string(),
    })?;
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let (sheet, mut table) = match format {
        SourceFormat::Workbook => read_sheet(path, request.sheet)?,
        SourceFormat::Delimited => {
            let separator = parse_separator(request.separator)?;
            let mut table = read_delimited(path, separator)?;
            if has_index_column(path, request.index_patterns) {
                debug!(path = %path.display(), "dropping leading index column");
                table.drop_first_column();
            }
            (String::new(), table)
        }
    };
    table.trim_headers();
    Ok(LoadedSource {
        table,
        sheet,
        format,
    })
}

fn has_index_column(path: &Path, patterns: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns
        .iter()
        .any(|pattern| !pattern.is_empty() && name.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/b.XLSX")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("b.csv")),
            Some(SourceFormat::Delimited)
        );
        assert_eq!(SourceFormat::from_path(Path::new("b.json")), None);
        assert_eq!(SourceFormat::from_path(Path::new("b")), None);
    }

    #[test]
    fn index_pattern_matches_file_name_only() {
        let patterns = vec!["250424".to_string()];
        assert!(has_index_column(Path::new("x/results_250424.csv"), &patterns));
        assert!(!has_index_column(Path::new("250424/results.csv"), &patterns));
        assert!(!has_index_column(Path::new("results.csv"), &[String::new()]));
    }
}
