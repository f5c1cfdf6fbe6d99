use std::fs;

use calamine::{Data, Reader, Xlsx, open_workbook};
use iamc_model::{
    CellValue, ObservationKey, RawTable, UnitSuggestion, WideKey, WideRow, WideTable, YearLabel,
};
use iamc_report::{
    CONFLICTS_SHEET, OBSERVED_SHEET, OutputFormat, conflicts_table, observed_table, reconcile,
    update_control_workbook, write_wide_table,
};
use proptest::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn suggestion(original: &str, canonical: &str, model: &str, unit: Option<&str>, conflict: bool) -> UnitSuggestion {
    UnitSuggestion {
        key: ObservationKey::new(original, canonical, model),
        suggested_unit: unit.map(str::to_string),
        observations: 2,
        units_seen: unit.map(|u| format!("{u}×2")).unwrap_or_default(),
        example_value: Some("1.5".to_string()),
        conflict,
        sources: "a.csv:a:unit".to_string(),
    }
}

fn control(rows: &[[&str; 4]]) -> RawTable {
    let headers = [
        "Variable value (original)",
        "Variable name (new)",
        "Source model",
        "Unit",
    ]
    .iter()
    .map(|h| (*h).to_string())
    .collect();
    let rows = rows
        .iter()
        .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
        .collect();
    RawTable::new(headers, rows).expect("control table")
}

#[test]
fn fills_only_blank_unambiguous_units() {
    let table = control(&[
        ["co2_ind", "Emissions|CO2|Industry", "TIMES", ""],
        ["co2_pow", "Emissions|CO2|Power", "TIMES", "Mt CO2/yr"],
        ["ch4", "Emissions|CH4", "TIMES", ""],
        ["n2o", "Emissions|N2O", "TIMES", ""],
    ]);
    let suggestions = vec![
        suggestion("co2_ind", "Emissions|CO2|Industry", "TIMES", Some("Mt CO2/yr"), false),
        suggestion("co2_pow", "Emissions|CO2|Power", "TIMES", Some("kt CO2/yr"), false),
        suggestion("ch4", "Emissions|CH4", "TIMES", Some("kt CH4/yr"), true),
    ];
    let result = reconcile(&table, &suggestions);

    assert_eq!(result.fill_count, 1);
    assert_eq!(result.table.cell(0, 3), Some(&CellValue::from("Mt CO2/yr")));
    assert_eq!(result.table.cell(1, 3), Some(&CellValue::from("Mt CO2/yr")));
    assert!(result.table.cell(2, 3).is_some_and(CellValue::is_blank));
    assert_eq!(result.conflicting_rows, vec![2]);
    assert_eq!(result.unmatched_rows, vec![3]);
    assert_eq!(result.unmatched_keys(), vec!["n2o | Emissions|N2O | TIMES"]);
}

#[test]
fn rows_with_a_unit_are_never_unmatched() {
    let table = control(&[
        ["co2", "Emissions|CO2", "TIMES", "Mt CO2/yr"],
        ["ch4", "Emissions|CH4", "TIMES", ""],
        ["n2o", "Emissions|N2O", "TIMES", "kt N2O/yr"],
    ]);
    let suggestions = vec![suggestion("ch4", "Emissions|CH4", "TIMES", Some("kt CH4/yr"), false)];
    let result = reconcile(&table, &suggestions);

    assert_eq!(result.fill_count, 1);
    assert!(result.unmatched_rows.is_empty());
    assert!(result.unmatched_keys().is_empty());
}

#[test]
fn join_collapses_whitespace_but_keeps_user_text() {
    let table = control(&[["co2  ind ", " Emissions|CO2", "TIMES", ""]]);
    let suggestions = vec![suggestion("co2 ind", "Emissions|CO2", "TIMES", Some("Mt"), false)];
    let result = reconcile(&table, &suggestions);
    assert_eq!(result.fill_count, 1);
    assert_eq!(result.table.cell(0, 0), Some(&CellValue::from("co2  ind ")));
}

#[test]
fn missing_unit_column_is_added() {
    let headers = vec![
        "Variable value (original)".to_string(),
        "Variable name (new)".to_string(),
        "Source model".to_string(),
    ];
    let table = RawTable::new(
        headers,
        vec![vec!["x".into(), "X".into(), "M".into()]],
    )
    .expect("table");
    let result = reconcile(&table, &[suggestion("x", "X", "M", Some("EJ/yr"), false)]);
    assert!(result.table.has_column("Unit"));
    assert_eq!(result.table.cell(0, 3), Some(&CellValue::from("EJ/yr")));
}

#[test]
fn report_tables_order_conflicts_last() {
    let suggestions = vec![
        suggestion("b", "B", "M", Some("kt"), true),
        suggestion("a", "A", "M", Some("Mt"), false),
    ];
    let observed = observed_table(&suggestions);
    assert_eq!(observed.len(), 2);
    assert_eq!(observed.cell(0, 1), Some(&CellValue::from("A")));
    assert_eq!(observed.cell(1, 7), Some(&CellValue::Bool(true)));

    let conflicts = conflicts_table(&suggestions);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts.cell(0, 0), Some(&CellValue::from("b")));
}

proptest! {
    #[test]
    fn reconcile_is_idempotent(units in prop::collection::vec(prop::option::of("[a-z]{1,4}"), 1..8)) {
        let rows: Vec<[String; 4]> = units
            .iter()
            .enumerate()
            .map(|(i, _)| [format!("v{i}"), format!("V{i}"), "M".to_string(), String::new()])
            .collect();
        let borrowed: Vec<[&str; 4]> = rows
            .iter()
            .map(|r| [r[0].as_str(), r[1].as_str(), r[2].as_str(), r[3].as_str()])
            .collect();
        let table = control(&borrowed);
        let suggestions: Vec<UnitSuggestion> = units
            .iter()
            .enumerate()
            .map(|(i, u)| suggestion(&format!("v{i}"), &format!("V{i}"), "M", u.as_deref(), false))
            .collect();

        let first = reconcile(&table, &suggestions);
        let second = reconcile(&first.table, &suggestions);
        prop_assert_eq!(second.fill_count, 0);
        prop_assert_eq!(&second.table, &first.table);
        prop_assert_eq!(first.fill_count, units.iter().filter(|u| u.is_some()).count());
    }
}

fn write_control(path: &std::path::Path, with_stale_conflicts: bool) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("variable_mapping").expect("name");
    let header = ["Variable value (original)", "Variable name (new)", "Source model", "Unit"];
    for (c, h) in header.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).expect("header");
    }
    sheet.write_string(1, 0, "co2").expect("cell");
    sheet.write_string(1, 1, "Emissions|CO2").expect("cell");
    sheet.write_string(1, 2, "TIMES").expect("cell");

    let regions = workbook.add_worksheet();
    regions.set_name("region_mapping").expect("name");
    regions.write_string(0, 0, "Source_Region").expect("cell");
    regions.write_string(0, 1, "Target_Region").expect("cell");
    regions.write_string(1, 0, "DE").expect("cell");
    regions.write_string(1, 1, "Germany").expect("cell");

    if with_stale_conflicts {
        let stale = workbook.add_worksheet();
        stale.set_name(CONFLICTS_SHEET).expect("name");
        stale.write_string(0, 0, "old").expect("cell");
    }
    workbook.save(path).expect("save");
}

#[test]
fn control_workbook_update_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_control(&path, true);

    let suggestions = vec![suggestion("co2", "Emissions|CO2", "TIMES", Some("Mt CO2/yr"), false)];
    let update = update_control_workbook(&path, &suggestions, false).expect("update");
    assert_eq!(update.fill_count, 1);
    assert_eq!(update.observed, 1);
    assert_eq!(update.conflicts, 0);
    assert!(update.written);

    let mut workbook: Xlsx<_> = open_workbook(&path).expect("open");
    let names = workbook.sheet_names().to_vec();
    assert_eq!(names, vec!["variable_mapping", "region_mapping", OBSERVED_SHEET]);
    let mapping = workbook.worksheet_range("variable_mapping").expect("mapping");
    assert_eq!(mapping.get((1, 3)), Some(&Data::String("Mt CO2/yr".to_string())));
    let regions = workbook.worksheet_range("region_mapping").expect("regions");
    assert_eq!(regions.get((1, 1)), Some(&Data::String("Germany".to_string())));
    assert!(!dir.path().join("mapping.xlsx.partial").exists());
}

#[test]
fn dry_run_leaves_workbook_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("mapping.xlsx");
    write_control(&path, false);
    let before = fs::read(&path).expect("read");

    let suggestions = vec![suggestion("co2", "Emissions|CO2", "TIMES", Some("Mt"), false)];
    let update = update_control_workbook(&path, &suggestions, true).expect("update");
    assert_eq!(update.fill_count, 1);
    assert!(!update.written);
    assert_eq!(fs::read(&path).expect("read"), before);
}

fn wide_table() -> WideTable {
    let key = |variable: &str| WideKey {
        model: "TIMES".to_string(),
        scenario: "Base".to_string(),
        region: "Germany".to_string(),
        variable: variable.to_string(),
        unit: "Mt CO2/yr".to_string(),
    };
    WideTable {
        years: vec![YearLabel::Year(2020), YearLabel::Year(2030)],
        rows: vec![
            WideRow {
                key: key("Emissions|CO2"),
                values: vec![Some(100.0), Some(2.5)],
            },
            WideRow {
                key: key("Emissions|CO2|Power"),
                values: vec![None, Some(40.0)],
            },
        ],
    }
}

#[test]
fn csv_output_formats_numbers() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("out").join("pyam_TIMES-x.csv");
    write_wide_table(&path, "pyam_data", &wide_table(), OutputFormat::Csv).expect("write");
    let text = fs::read_to_string(&path).expect("read");
    insta::assert_snapshot!(text, @r"
    model,scenario,region,variable,unit,2020,2030
    TIMES,Base,Germany,Emissions|CO2,Mt CO2/yr,100,2.5
    TIMES,Base,Germany,Emissions|CO2|Power,Mt CO2/yr,,40
    ");
}

#[test]
fn xlsx_output_has_named_sheet_and_numbers() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("pyam_TIMES-x.xlsx");
    write_wide_table(&path, "pyam_data", &wide_table(), OutputFormat::Xlsx).expect("write");

    let mut workbook: Xlsx<_> = open_workbook(&path).expect("open");
    let range = workbook.worksheet_range("pyam_data").expect("sheet");
    assert_eq!(range.get((0, 5)), Some(&Data::String("2020".to_string())));
    assert_eq!(range.get((1, 5)), Some(&Data::Float(100.0)));
    assert_eq!(range.get((2, 6)), Some(&Data::Float(40.0)));
}

#[test]
fn overview_workbook_lists_each_sheet() {
    use iamc_ingest::{OverviewEntry, OverviewScan};

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("output").join("overview.xlsx");
    let scan = OverviewScan {
        entries: vec![OverviewEntry {
            source_model: "times".to_string(),
            file_location: "times/2024".to_string(),
            file_name: "results.csv".to_string(),
            sheet_name: String::new(),
            columns: vec!["region".to_string(), "year".to_string()],
        }],
        failures: Vec::new(),
    };
    iamc_report::write_overview(&path, &scan).expect("write overview");

    let mut workbook: Xlsx<_> = open_workbook(&path).expect("open");
    let range = workbook.worksheet_range("overview").expect("sheet");
    assert_eq!(range.get((0, 4)), Some(&Data::String("Column names".to_string())));
    assert_eq!(range.get((1, 2)), Some(&Data::String("results.csv".to_string())));
    assert_eq!(range.get((1, 4)), Some(&Data::String("region, year".to_string())));
}
