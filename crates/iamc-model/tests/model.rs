use iamc_model::mapping::{FILE_LOCATION, FILE_NAME, SEPARATOR, SOURCE_MODEL, UNIT, VARIABLE_NEW};
use iamc_model::{
    CellValue, MappingRule, ObservationKey, Provenance, RawTable, UnitSuggestion, YearLabel,
};

#[test]
fn mapping_rule_reads_control_row() {
    let table = RawTable::new(
        vec![
            FILE_LOCATION.to_string(),
            FILE_NAME.to_string(),
            SOURCE_MODEL.to_string(),
            SEPARATOR.to_string(),
            "Variable column".to_string(),
            "Variable value (original)".to_string(),
            VARIABLE_NEW.to_string(),
            UNIT.to_string(),
        ],
        vec![vec![
            "TIMES".into(),
            " results.csv ".into(),
            "TIMES-DE".into(),
            ";".into(),
            "sector | fuel".into(),
            "Industry | Gas".into(),
            "Final Energy|Industry|Gas".into(),
            CellValue::Empty,
        ]],
    )
    .expect("control table");

    let record = table.record(0).expect("row");
    let rule = MappingRule::from_record(0, &record);

    assert_eq!(rule.identity.file_name, "results.csv");
    assert_eq!(rule.identity.source_model, "TIMES-DE");
    assert_eq!(rule.config.separator.as_deref(), Some(";"));
    assert!(rule.config.is_composite_variable());
    assert_eq!(rule.config.unit_override, None);
    assert_eq!(rule.config.sheet_name, None);
    assert_eq!(rule.new_name, "Final Energy|Industry|Gas");
}

#[test]
fn year_labels_from_cells() {
    assert_eq!(
        YearLabel::from_cell(&CellValue::Number(2030.0)),
        YearLabel::Year(2030)
    );
    assert_eq!(
        YearLabel::from_cell(&CellValue::from("2030 ")),
        YearLabel::Year(2030)
    );
    let label = YearLabel::from_cell(&CellValue::from("2020-2030"));
    assert_eq!(label.to_string(), "2020-2030");
    assert!(YearLabel::from_cell(&CellValue::Empty).is_blank());
}

#[test]
fn provenance_renders_colon_separated() {
    let source = Provenance {
        file: "results.xlsx".to_string(),
        sheet: "Data".to_string(),
        column: "variable".to_string(),
    };
    assert_eq!(source.to_string(), "results.xlsx:Data:variable");
}

#[test]
fn suggestion_serializes_flat() {
    let suggestion = UnitSuggestion {
        key: ObservationKey::new(" CO2 ", "Emissions|CO2", "TIMES"),
        suggested_unit: Some("kt CO2".to_string()),
        observations: 4,
        units_seen: "kt CO2×3; Mt CO2×1".to_string(),
        example_value: Some("12.5".to_string()),
        conflict: true,
        sources: "a.csv::var; b.xlsx:Data:var".to_string(),
    };
    assert!(!suggestion.is_fillable());
    insta::assert_json_snapshot!(suggestion, @r#"
    {
      "original_variable": "CO2",
      "canonical_variable": "Emissions|CO2",
      "model": "TIMES",
      "suggested_unit": "kt CO2",
      "observations": 4,
      "units_seen": "kt CO2×3; Mt CO2×1",
      "example_value": "12.5",
      "conflict": true,
      "sources": "a.csv::var; b.xlsx:Data:var"
    }
    "#);
}
