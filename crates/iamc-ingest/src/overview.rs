//! Input directory overview.
//!
//! Walks an input tree and lists, for every data file and sheet, the column
//! headers it carries. Analysts use the result as the starting point for a
//! control table, so the entries use the control table's vocabulary.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::delimited::{read_header, sniff_separator};
use crate::error::{IngestError, Result};
use crate::source::SourceFormat;
use crate::workbook::read_all_sheets;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewEntry {
    /// First directory below the input root, empty for top-level files.
    pub source_model: String,
    /// Directory of the file relative to the input root, `/`-separated.
    pub file_location: String,
    pub file_name: String,
    /// Empty for delimited files.
    pub sheet_name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OverviewScan {
    pub entries: Vec<OverviewEntry>,
    /// Files that could not be read, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

/// Scans `root` recursively. Files are visited in path order.
pub fn scan_input_dir(root: &Path) -> Result<OverviewScan> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut scan = OverviewScan::default();
    for path in files {
        let Some(format) = SourceFormat::from_path(&path) else {
            continue;
        };
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let file_location = relative
            .parent()
            .map(|dir| {
                dir.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        let source_model = file_location
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let sheets = match read_columns(&path, format) {
            Ok(sheets) => sheets,
            Err(error) => {
                warn!(path = %path.display(), %error, "could not read file for overview");
                scan.failures.push((path.clone(), error.to_string()));
                continue;
            }
        };
        for (sheet_name, columns) in sheets {
            scan.entries.push(OverviewEntry {
                source_model: source_model.clone(),
                file_location: file_location.clone(),
                file_name: file_name.clone(),
                sheet_name,
                columns,
            });
        }
    }
    debug!(root = %root.display(), entries = scan.entries.len(), "overview scan complete");
    Ok(scan)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

fn read_columns(path: &Path, format: SourceFormat) -> Result<Vec<(String, Vec<String>)>> {
    match format {
        SourceFormat::Delimited => {
            let separator = sniff_separator(path)?;
            Ok(vec![(String::new(), read_header(path, separator)?)])
        }
        SourceFormat::Workbook => Ok(read_all_sheets(path)?
            .into_iter()
            .map(|(name, table)| (name, table.headers().to_vec()))
            .collect()),
    }
}
