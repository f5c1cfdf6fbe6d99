//! End-to-end runs of the conversion pipeline on temporary directories.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use iamc_cli::config::RunSettings;
use iamc_cli::pipeline::run_convert;
use iamc_cli::types::GroupStatus;
use iamc_model::FailureKind;
use iamc_report::OutputFormat;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

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

fn mapping_row<'a>(location: &'a str, file: &'a str, original: &'a str, new: &'a str) -> [&'a str; 14] {
    [
        location, file, "TIMES", "", ",", "var", original, new, "scenario", "region", "year",
        "value", "unit", "",
    ]
}

fn write_control(path: &Path, rows: &[[&str; 14]]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("variable_mapping").expect("name");
    for (c, header) in MAPPING_HEADER.iter().enumerate() {
        sheet.write_string(0, c as u16, *header).expect("header");
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                sheet
                    .write_string((r + 1) as u32, c as u16, *cell)
                    .expect("cell");
            }
        }
    }
    let regions = workbook.add_worksheet();
    regions.set_name("region_mapping").expect("name");
    regions.write_string(0, 0, "Source_Region").expect("cell");
    regions.write_string(0, 1, "Target_Region").expect("cell");
    regions.write_string(1, 0, "DE").expect("cell");
    regions.write_string(1, 1, "Germany").expect("cell");
    workbook.save(path).expect("save control");
}

fn write_source(dir: &Path) {
    let times = dir.join("input").join("times");
    fs::create_dir_all(&times).expect("input dir");
    fs::write(
        times.join("results.csv"),
        "region,scenario,year,value,unit,var\n\
         DE,Base,2020,100,mtco2,co2\n\
         DE,Base,2030,80,mtco2,co2\n\
         FR,Base,2020,5,kt CH4,ch4\n\
         DE,Base,2020,1,EJ,other\n",
    )
    .expect("write csv");
}

fn write_dictionary(path: &Path, models: &[(&str, &str)]) {
    let sheets = [
        ("variables", "names mapping", "DE variable name"),
        ("regions", "source_region", "target_region"),
        ("models", "source_models", "target_models"),
        ("scenarios", "source_scenario", "target_scenario"),
    ];
    let mut workbook = Workbook::new();
    for (name, source, target) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).expect("name");
        sheet.write_string(0, 0, source).expect("header");
        sheet.write_string(0, 1, target).expect("header");
        if name == "models" {
            for (r, (from, to)) in models.iter().enumerate() {
                sheet.write_string((r + 1) as u32, 0, *from).expect("cell");
                sheet.write_string((r + 1) as u32, 1, *to).expect("cell");
            }
        }
    }
    workbook.save(path).expect("save dictionary");
}

fn settings(dir: &Path, format: OutputFormat) -> RunSettings {
    RunSettings {
        input_dir: dir.join("input"),
        output_dir: dir.join("output"),
        mapping: dir.join("mapping.xlsx"),
        format,
        ..RunSettings::default()
    }
}

#[test]
fn converts_files_and_isolates_failures() {
    let dir = TempDir::new().expect("temp dir");
    write_source(dir.path());
    write_control(
        &dir.path().join("mapping.xlsx"),
        &[
            mapping_row("times", "results.csv", "co2", "Emissions|CO2"),
            mapping_row("times", "results.csv", "ch4", "Emissions|CH4"),
            mapping_row("missing", "gone.csv", "x", "X"),
        ],
    );

    let result = run_convert(&settings(dir.path(), OutputFormat::Csv)).expect("run");

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].status, GroupStatus::Written);
    assert_eq!(result.groups[0].rows, 3);
    assert_eq!(result.groups[0].unmapped, 1);
    assert_eq!(
        result.groups[1].status,
        GroupStatus::Skipped(FailureKind::FileSkip)
    );
    assert_eq!(result.written(), 1);
    assert_eq!(result.skipped(), 1);

    let output = dir.path().join("output").join("pyam_TIMES-results.csv");
    let text = fs::read_to_string(&output).expect("output csv");
    insta::assert_snapshot!(text, @r"
    model,scenario,region,variable,unit,2020,2030
    TIMES,Base,FR,Emissions|CH4,kt CH4,5,
    TIMES,Base,Germany,Emissions|CO2,mtco2,100,80
    ");

    let log = fs::read_to_string(dir.path().join("output").join("error_log.txt")).expect("log");
    assert!(log.starts_with("# run started "));
    assert!(log.contains("WARNING - 1 variables found but not mapped:"));
    assert!(log.contains("WARNING -   other"));
    assert!(log.contains("WARNING -   FR"));
    assert!(log.contains("ERROR - file skipped:"));
    assert_eq!(result.errors, 1);

    let units = result.units.expect("unit update");
    assert_eq!(units.fill_count, 2);
    assert_eq!(units.conflicts, 0);
    assert!(units.written);

    let mut workbook: Xlsx<_> = open_workbook(dir.path().join("mapping.xlsx")).expect("open");
    let mapping = workbook.worksheet_range("variable_mapping").expect("mapping");
    assert_eq!(mapping.get((1, 13)), Some(&Data::String("Mt CO2".to_string())));
    assert_eq!(mapping.get((2, 13)), Some(&Data::String("kt CH4".to_string())));
    assert!(workbook.sheet_names().contains(&"auto_units_observed".to_string()));
}

#[test]
fn dry_run_keeps_control_workbook() {
    let dir = TempDir::new().expect("temp dir");
    write_source(dir.path());
    let control = dir.path().join("mapping.xlsx");
    write_control(
        &control,
        &[mapping_row("times", "results.csv", "co2", "Emissions|CO2")],
    );
    let before = fs::read(&control).expect("read control");

    let mut settings = settings(dir.path(), OutputFormat::Xlsx);
    settings.dry_run = true;
    let result = run_convert(&settings).expect("run");

    let units = result.units.expect("unit update");
    assert_eq!(units.fill_count, 1);
    assert!(!units.written);
    assert_eq!(fs::read(&control).expect("read control"), before);

    let output = dir.path().join("output").join("pyam_TIMES-results.xlsx");
    let mut workbook: Xlsx<_> = open_workbook(&output).expect("open output");
    let range = workbook.worksheet_range("pyam_data").expect("sheet");
    assert_eq!(range.get((1, 2)), Some(&Data::String("Germany".to_string())));
    assert_eq!(range.get((1, 5)), Some(&Data::Float(100.0)));
}

#[test]
fn missing_control_table_is_fatal_but_logged() {
    let dir = TempDir::new().expect("temp dir");
    let result = run_convert(&settings(dir.path(), OutputFormat::Xlsx));
    assert!(result.is_err());

    let log = fs::read_to_string(dir.path().join("output").join("error_log.txt")).expect("log");
    assert!(log.contains("ERROR - fatal configuration error: load control table"));
}

#[test]
fn empty_mapping_result_writes_no_file() {
    let dir = TempDir::new().expect("temp dir");
    write_source(dir.path());
    write_control(
        &dir.path().join("mapping.xlsx"),
        &[mapping_row("times", "results.csv", "n2o", "Emissions|N2O")],
    );
    let mut settings = settings(dir.path(), OutputFormat::Csv);
    settings.unit_suggestions = false;

    let result = run_convert(&settings).expect("run");
    assert_eq!(result.groups[0].status, GroupStatus::Empty);
    assert!(result.units.is_none());
    assert!(!dir.path().join("output").join("pyam_TIMES-results.csv").exists());
}

#[test]
fn renamed_model_still_fills_control_units() {
    let dir = TempDir::new().expect("temp dir");
    write_source(dir.path());
    write_control(
        &dir.path().join("mapping.xlsx"),
        &[mapping_row("times", "results.csv", "co2", "Emissions|CO2")],
    );
    let dictionary = dir.path().join("dictionary.xlsx");
    write_dictionary(&dictionary, &[("TIMES", "TIMES-PanEU")]);
    let mut settings = settings(dir.path(), OutputFormat::Csv);
    settings.dictionary = Some(dictionary);

    let result = run_convert(&settings).expect("run");
    assert_eq!(result.groups[0].status, GroupStatus::Written);

    let output = dir.path().join("output").join("pyam_TIMES-results.csv");
    let text = fs::read_to_string(&output).expect("output csv");
    assert!(text.contains("TIMES-PanEU,Base,Germany,Emissions|CO2,mtco2,100,80"));

    let units = result.units.expect("unit update");
    assert_eq!(units.fill_count, 1);
    assert!(units.unmatched.is_empty());

    let mut workbook: Xlsx<_> = open_workbook(dir.path().join("mapping.xlsx")).expect("open");
    let mapping = workbook.worksheet_range("variable_mapping").expect("mapping");
    assert_eq!(mapping.get((1, 13)), Some(&Data::String("Mt CO2".to_string())));
}
