use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use tabula_core::{BatchReport, PairReport};

pub fn print_summary(report: &BatchReport) {
    println!("{}", summary_table(report));
    println!(
        "{} completed, {} failed, {} skipped, {} rows written",
        report.completed.len(),
        report.failed.len(),
        report.skipped.len(),
        report.total_rows_written()
    );
    if !report.failed.is_empty() {
        eprintln!("Errors:");
        for failure in &report.failed {
            eprintln!("- {}: {}", failure.output_id, failure.error);
        }
    }
}

/// One row per output in run order: completed, then failed, then skipped.
pub fn summary_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Input"),
        header_cell("Rows in"),
        header_cell("Excluded"),
        header_cell("Rows out"),
        header_cell("Destination"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);

    for pair in &report.completed {
        table.add_row(vec![
            output_cell(&pair.output_id),
            Cell::new(&pair.input_id),
            Cell::new(pair.source_rows),
            count_cell(pair.excluded_rows),
            Cell::new(pair.output_rows),
            destination_cell(pair),
            Cell::new("OK").fg(Color::Green).add_attribute(Attribute::Bold),
        ]);
    }
    for failure in &report.failed {
        table.add_row(vec![
            output_cell(&failure.output_id),
            Cell::new(&failure.input_id),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(format!("FAILED ({})", failure.error.kind()))
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        ]);
    }
    for output_id in &report.skipped {
        table.add_row(vec![
            Cell::new(output_id).fg(Color::DarkGrey),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new("SKIPPED").fg(Color::Yellow),
        ]);
    }
    table
}

fn output_cell(output_id: &str) -> Cell {
    Cell::new(output_id)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn destination_cell(pair: &PairReport) -> Cell {
    match &pair.destination {
        Some(path) => Cell::new(path.display()),
        None => dim_cell("(dry run)"),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
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
        .set_width(140);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
        ]);
    }
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
