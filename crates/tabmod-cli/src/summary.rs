use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabmod_cli::PipelineResult;

/// Render the per-step summary of a pipeline run.
pub fn render_summary(result: &PipelineResult) -> String {
    let mut lines = vec![format!(
        "Pipeline: {} ({} step{})",
        result.pipeline_kind,
        result.steps.len(),
        if result.steps.len() == 1 { "" } else { "s" }
    )];

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Modifier"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    for index in [0, 2, 3, 4] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (index, step) in result.steps.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(step.kind)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(step.rows_before),
            rows_cell(step.rows_before, step.rows_after),
            Cell::new(step.columns_after),
        ]);
    }
    table.add_row(vec![
        dim_cell("-"),
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.rows_in).add_attribute(Attribute::Bold),
        Cell::new(result.table.row_count()).add_attribute(Attribute::Bold),
        Cell::new(result.table.column_count()).add_attribute(Attribute::Bold),
    ]);
    lines.push(table.to_string());

    for kind in &result.dropped {
        lines.push(format!("skipped: unregistered modifier kind `{kind}`"));
    }
    for error in &result.errors {
        lines.push(format!("error: {error}"));
    }
    lines.join("\n")
}

/// Style for listing tables such as `kinds`.
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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

/// Row count after a step, red when the step dropped rows.
fn rows_cell(before: usize, after: usize) -> Cell {
    let cell = Cell::new(after);
    if after < before {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
