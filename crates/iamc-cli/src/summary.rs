use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use iamc_cli::types::{ConvertResult, GroupStatus, GroupSummary};
use iamc_model::FailureKind;

pub fn print_summary(result: &ConvertResult) {
    println!("Output: {}", result.output_dir.display());
    println!("Run log: {}", result.log_path.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Model"),
        header_cell("Rows"),
        header_cell("Unmapped"),
        header_cell("Status"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    let mut total_rows = 0usize;
    let mut total_unmapped = 0usize;
    for summary in &result.groups {
        total_rows += summary.rows;
        total_unmapped += summary.unmapped;
        table.add_row(vec![
            Cell::new(&summary.file),
            Cell::new(&summary.model),
            Cell::new(summary.rows),
            count_cell(summary.unmapped, Color::Yellow),
            status_cell(&summary.status),
            output_cell(summary),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} written, {} skipped", result.written(), result.skipped()))
            .fg(Color::Cyan),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        count_cell(total_unmapped, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if let Some(units) = &result.units {
        let verb = if units.written { "filled" } else { "would fill (dry run)" };
        println!(
            "Units: {verb} {} cell(s); {} key(s) observed, {} with conflicting units",
            units.fill_count, units.observed, units.conflicts
        );
    }
    if result.errors > 0 || result.warnings > 0 {
        eprintln!(
            "{} error(s), {} warning(s); see {}",
            result.errors,
            result.warnings,
            result.log_path.display()
        );
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &GroupStatus) -> Cell {
    match status {
        GroupStatus::Written => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        GroupStatus::Empty => dim_cell("empty"),
        GroupStatus::Skipped(FailureKind::ColumnMissing) => {
            Cell::new("missing column").fg(Color::Red)
        }
        GroupStatus::Skipped(FailureKind::ReshapeFailure) => {
            Cell::new("reshape failed").fg(Color::Red)
        }
        GroupStatus::Skipped(_) => Cell::new("skipped").fg(Color::Red),
    }
}

fn output_cell(summary: &GroupSummary) -> Cell {
    match summary.output.as_ref().and_then(|p| p.file_name()) {
        Some(name) => Cell::new(name.to_string_lossy()),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
