use std::fs;
use std::path::Path;

use iamc_ingest::{
    IngestError, SourceFormat, SourceRequest, load_control_table, load_dictionary_file,
    load_source, scan_input_dir,
};
use iamc_model::{CellValue, FailureKind};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Writes a workbook; cells that parse as numbers are stored as numbers.
fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).expect("sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(v) => sheet.write_number(r as u32, c as u16, v),
                    Err(_) => sheet.write_string(r as u32, c as u16, *cell),
                }
                .expect("write cell");
            }
        }
    }
    workbook.save(path).expect("save workbook");
}

const MAPPING_HEADER: [&str; 14] = [
    "File location",
    "File name",
    "Source model",
    "Sheet name",
    "Separator",
    "Variable column",
    "Variable value (original)",
    "Variable name (new)",
    "Source Scenario",
    "Source Region",
    "Source Year",
    "Source Value",
    "Source Unit",
    "Unit",
];

#[test]
fn control_table_with_region_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_workbook(
        &path,
        &[
            (
                "variable_mapping",
                vec![
                    MAPPING_HEADER.to_vec(),
                    vec![
                        "TIMES", "out.csv", "TIMES", "", ";", "sortingstream", "Recycling",
                        "Recycling Rate", "scenario", "region", "year", "value", "", "%",
                    ],
                ],
            ),
            (
                "region_mapping",
                vec![
                    vec!["Source_Region", "Target_Region"],
                    vec!["Germany", "DE"],
                    vec!["", "ignored"],
                ],
            ),
        ],
    );

    let control = load_control_table(&path).expect("load control table");
    let rules = control.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].identity.file_name, "out.csv");
    assert_eq!(rules[0].config.separator.as_deref(), Some(";"));
    assert_eq!(rules[0].config.unit_override.as_deref(), Some("%"));
    assert_eq!(rules[0].config.unit_column, None);
    assert_eq!(
        control.region_pairs(),
        vec![("Germany".to_string(), "DE".to_string())]
    );
}

#[test]
fn control_table_fills_optional_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_workbook(
        &path,
        &[(
            "variable_mapping",
            vec![
                MAPPING_HEADER[..8].to_vec(),
                vec!["", "a.csv", "M", "", "", "var", "x", "X"],
            ],
        )],
    );

    let control = load_control_table(&path).expect("load control table");
    assert!(control.regions.is_none());
    assert!(control.mapping.has_column("Source Unit"));
    assert!(control.region_pairs().is_empty());
}

#[test]
fn control_table_missing_columns_are_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_workbook(
        &path,
        &[(
            "variable_mapping",
            vec![vec!["File location", "File name", "Variable column"]],
        )],
    );

    let err = load_control_table(&path).expect_err("missing columns");
    match err {
        IngestError::MissingColumns { sheet, columns, .. } => {
            assert_eq!(sheet, "variable_mapping");
            assert_eq!(
                columns,
                vec![
                    "Source model".to_string(),
                    "Variable value (original)".to_string(),
                    "Variable name (new)".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn control_table_requires_mapping_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_workbook(&path, &[("Sheet1", vec![vec!["a"]])]);
    let err = load_control_table(&path).expect_err("no mapping sheet");
    assert!(matches!(err, IngestError::SheetNotFound { .. }));

    let missing = dir.path().join("nope.xlsx");
    let err = load_control_table(&missing).expect_err("no file");
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn dictionary_file_requires_every_pair() {
    let dir = TempDir::new().expect("temp dir");
    let good = dir.path().join("dict.xlsx");
    write_workbook(
        &good,
        &[
            (
                "variables",
                vec![vec!["names mapping", "DE variable name"], vec!["co2", "Emissions|CO2"]],
            ),
            (
                "regions",
                vec![vec!["source_region", "target_region"], vec!["Germany", "DE"]],
            ),
            (
                "models",
                vec![vec!["source_models", "target_models"], vec!["times", "TIMES-DE"]],
            ),
            (
                "scenarios",
                vec![vec!["source_scenario", "target_scenario"], vec!["ref", "Reference"]],
            ),
        ],
    );
    let dict = load_dictionary_file(&good).expect("dictionary");
    assert_eq!(dict.models, vec![("times".to_string(), "TIMES-DE".to_string())]);
    assert_eq!(dict.scenarios[0].1, "Reference");

    let bad = dir.path().join("bad.xlsx");
    write_workbook(
        &bad,
        &[
            (
                "variables",
                vec![vec!["names mapping", "DE variable name"]],
            ),
            ("regions", vec![vec!["source_region", "target"]]),
            ("models", vec![vec!["source_models", "target_models"]]),
            ("scenarios", vec![vec!["source_scenario", "target_scenario"]]),
        ],
    );
    let err = load_dictionary_file(&bad).expect_err("bad regions sheet");
    match err {
        IngestError::MissingColumns { sheet, columns, .. } => {
            assert_eq!(sheet, "regions");
            assert_eq!(columns, vec!["target_region".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn delimited_source_with_separator_and_index_column() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("export_250424.csv");
    fs::write(
        &path,
        "idx;region ; year;value\n0;DE;2020;5\n1;FR;2021;\n",
    )
    .expect("write csv");

    let patterns = vec!["250424".to_string()];
    let loaded = load_source(&SourceRequest {
        path: &path,
        sheet: None,
        separator: Some(";"),
        index_patterns: &patterns,
    })
    .expect("load csv");

    assert_eq!(loaded.format, SourceFormat::Delimited);
    assert_eq!(loaded.sheet, "");
    assert_eq!(
        loaded.table.headers(),
        &["region".to_string(), "year".to_string(), "value".to_string()]
    );
    let second = loaded.table.record(1).expect("row");
    assert_eq!(second.text("region"), "FR");
    assert_eq!(second.get("value"), Some(&CellValue::Empty));
}

#[test]
fn workbook_source_by_name_or_first_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("results.xlsx");
    write_workbook(
        &path,
        &[
            ("Info", vec![vec!["note"], vec!["generated"]]),
            (
                "Data",
                vec![vec![" region", "year", "value"], vec!["DE", "2020", "1.5"]],
            ),
        ],
    );

    let named = load_source(&SourceRequest {
        path: &path,
        sheet: Some("Data"),
        separator: None,
        index_patterns: &[],
    })
    .expect("load named sheet");
    assert_eq!(named.sheet, "Data");
    let row = named.table.record(0).expect("row");
    assert_eq!(row.text("region"), "DE");
    assert_eq!(row.get("year"), Some(&CellValue::Number(2020.0)));

    let first = load_source(&SourceRequest {
        path: &path,
        sheet: None,
        separator: None,
        index_patterns: &[],
    })
    .expect("load first sheet");
    assert_eq!(first.sheet, "Info");

    let err = load_source(&SourceRequest {
        path: &path,
        sheet: Some("Summary"),
        separator: None,
        index_patterns: &[],
    })
    .expect_err("unknown sheet");
    assert!(matches!(err, IngestError::SheetNotFound { .. }));
    assert_eq!(err.kind(), FailureKind::FileSkip);
}

#[test]
fn unsupported_and_missing_sources() {
    let dir = TempDir::new().expect("temp dir");
    let json = dir.path().join("data.json");
    fs::write(&json, "{}").expect("write json");
    let err = load_source(&SourceRequest {
        path: &json,
        sheet: None,
        separator: None,
        index_patterns: &[],
    })
    .expect_err("unsupported");
    assert!(matches!(err, IngestError::UnsupportedExtension { ref extension, .. } if extension == "json"));

    let missing = dir.path().join("missing.csv");
    let err = load_source(&SourceRequest {
        path: &missing,
        sheet: None,
        separator: None,
        index_patterns: &[],
    })
    .expect_err("missing");
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn overview_lists_files_and_sheets() {
    let dir = TempDir::new().expect("temp dir");
    let model_dir = dir.path().join("TIMES").join("run1");
    fs::create_dir_all(&model_dir).expect("create dirs");
    fs::write(model_dir.join("a.csv"), "region;year;value\nDE;2020;1\n").expect("csv");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("txt");
    write_workbook(
        &dir.path().join("top.xlsx"),
        &[("S1", vec![vec!["x", "y"]]), ("S2", vec![vec!["z"]])],
    );

    let scan = scan_input_dir(dir.path()).expect("scan");
    assert!(scan.failures.is_empty());
    assert_eq!(scan.entries.len(), 3);

    let csv = scan
        .entries
        .iter()
        .find(|e| e.file_name == "a.csv")
        .expect("csv entry");
    assert_eq!(csv.source_model, "TIMES");
    assert_eq!(csv.file_location, "TIMES/run1");
    assert_eq!(csv.columns, vec!["region", "year", "value"]);

    let sheets: Vec<&str> = scan
        .entries
        .iter()
        .filter(|e| e.file_name == "top.xlsx")
        .map(|e| e.sheet_name.as_str())
        .collect();
    assert_eq!(sheets, vec!["S1", "S2"]);

    let err = scan_input_dir(&dir.path().join("absent")).expect_err("no dir");
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}
