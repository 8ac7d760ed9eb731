use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use wavetab_cli::pipeline::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.out_dir.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }
    for wave_id in &result.skipped {
        println!("Skipped: {wave_id} (input not found)");
    }

    let mut wave_table = Table::new();
    wave_table.set_header(vec![
        header_cell("Wave"),
        header_cell("Records"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut wave_table);
    align_column(&mut wave_table, 1, CellAlignment::Right);
    for wave in &result.waves {
        wave_table.add_row(vec![
            Cell::new(&wave.wave_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(wave.records),
            Cell::new(wave.source.display()),
        ]);
    }
    wave_table.add_row(vec![
        Cell::new("STACKED")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.stacked_records).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{wave_table}");

    if result.tables.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Path"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for written in &result.tables {
        table.add_row(vec![
            Cell::new(&written.name),
            Cell::new(written.rows),
            Cell::new(written.path.display()),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn flag_cell(ok: bool) -> Cell {
    if ok {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
