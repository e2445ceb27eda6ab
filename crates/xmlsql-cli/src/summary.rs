use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use xmlsql_model::{FileReport, FileStatus};

use xmlsql_cli::types::{CheckResult, ConvertResult};

pub fn print_summary(result: &ConvertResult) {
    let report = &result.report;
    println!("Config: {}", report.config.display());
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", report.output_dir.display());
    }
    if let Some(path) = &result.report_path {
        println!("Run report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("File #"),
        header_cell("Records"),
        header_cell("Converted"),
        header_cell("Skipped"),
        header_cell("Rows"),
        header_cell("Status"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);

    let mut total_records = 0usize;
    let mut total_converted = 0usize;
    for file in &report.files {
        total_records += file.records;
        total_converted += file.converted;
        table.add_row(vec![
            Cell::new(file_label(&file.source))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&file.file_number),
            Cell::new(file.records),
            Cell::new(file.converted),
            count_cell(file.skipped, Color::Yellow),
            Cell::new(file.rows),
            status_cell(file.status),
            output_cell(file),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        Cell::new(total_converted).add_attribute(Attribute::Bold),
        count_cell(report.total_skipped(), Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(report.total_rows()).add_attribute(Attribute::Bold),
        count_cell(report.failed_files(), Color::Red).add_attribute(Attribute::Bold),
        dim_cell(format!("{:.2}s", result.elapsed.as_secs_f64())),
    ]);
    println!("{table}");

    let problems: Vec<&FileReport> = report
        .files
        .iter()
        .filter(|file| !file.errors.is_empty())
        .collect();
    if !problems.is_empty() {
        eprintln!("Errors:");
        for file in problems {
            for error in &file.errors {
                eprintln!("- {}: {error}", file_label(&file.source));
            }
        }
    }
}

pub fn print_check(result: &CheckResult) {
    println!("Config: {}", result.config.display());
    println!("Record: <{}>", result.record_tag);
    println!("Identifier: {}", result.identifier);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Counter"),
        header_cell("Opened at"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    for summary in &result.tables {
        table.add_row(vec![
            Cell::new(&summary.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            match &summary.counter {
                Some(counter) => Cell::new(counter),
                None => dim_cell("-"),
            },
            Cell::new(&summary.path),
            if summary.columns.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(summary.columns.join(", "))
            },
        ]);
    }
    println!("{table}");
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn status_cell(status: FileStatus) -> Cell {
    match status {
        FileStatus::Converted => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        FileStatus::NoRecords => Cell::new("EMPTY").fg(Color::Yellow),
        FileStatus::Failed => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn output_cell(file: &FileReport) -> Cell {
    match &file.output {
        Some(path) => Cell::new(path.display()),
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

fn apply_table_style(table: &mut Table) {
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
    if table.column_count() >= 8 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
