//! Human-readable rendering of outcomes, diagnostics and query rows.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use greenhouse_model::{Diagnostic, ErrorKind, Metadata, ReadingStatus};
use greenhouse_query::{QueryPage, QueryRow};

use crate::ingest::IngestOutcome;

/// One-line description of an ingest outcome.
pub fn describe_outcome(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Accepted { id, readings } => {
            format!("accepted {id} ({readings} readings)")
        }
        IngestOutcome::Rejected {
            class,
            diagnostic,
            total,
        } => {
            let more = match total.saturating_sub(1) {
                0 => String::new(),
                n => format!(" (+{n} more)"),
            };
            format!("{}: {diagnostic}{more}", class.label())
        }
        IngestOutcome::NoContent => "invalid: document is empty".to_string(),
    }
}

/// Reading counts per status, e.g. `3 readings: 2 ok, 1 out_of_range`.
pub fn describe_metadata(metadata: &Metadata) -> String {
    let counts: Vec<String> = [
        ReadingStatus::Ok,
        ReadingStatus::OutOfRange,
        ReadingStatus::UnknownRange,
    ]
    .into_iter()
    .filter_map(|status| match metadata.count_status(status) {
        0 => None,
        n => Some(format!("{n} {status}")),
    })
    .collect();
    let mut line = format!(
        "{} @ {}: {} sensors, {} readings",
        metadata.name,
        metadata.place,
        metadata.sensors.len(),
        metadata.readings.len()
    );
    if !counts.is_empty() {
        line.push_str(": ");
        line.push_str(&counts.join(", "));
    }
    line
}

pub fn diagnostics_table(diagnostics: &[Diagnostic]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Code"),
        header_cell("Location"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, diagnostic) in diagnostics.iter().enumerate() {
        table.add_row(vec![
            dim_cell(idx + 1),
            code_cell(diagnostic),
            match &diagnostic.location {
                Some(location) => Cell::new(location),
                None => dim_cell("-"),
            },
            Cell::new(&diagnostic.message),
        ]);
    }
    table
}

pub fn rows_table(page: &QueryPage) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Greenhouse"),
        header_cell("Sensor"),
        header_cell("Kind"),
        header_cell("Timestamp"),
        header_cell("Value"),
        header_cell("Status"),
    ]);
    apply_rows_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for row in &page.items {
        table.add_row(row_cells(row));
    }
    table
}

/// Footer line for a query page, e.g. `page 2 of 3 (45 matching readings)`.
pub fn describe_page(page: &QueryPage) -> String {
    let pages = page.total.div_ceil(page.per_page.max(1)).max(1);
    format!(
        "page {} of {pages} ({} matching readings)",
        page.page, page.total
    )
}

fn row_cells(row: &QueryRow) -> Vec<Cell> {
    vec![
        Cell::new(&row.source_id),
        Cell::new(format!("{} ({})", row.name, row.place)),
        optional_cell(row.sensor_ref.as_deref()),
        optional_cell(row.kind.as_deref()),
        Cell::new(&row.timestamp),
        match row.value {
            Some(value) => Cell::new(value),
            None => dim_cell("-"),
        },
        status_cell(row.status),
    ]
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_rows_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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

fn code_cell(diagnostic: &Diagnostic) -> Cell {
    let color = match diagnostic.code.kind() {
        ErrorKind::Syntax | ErrorKind::Schema => Color::Red,
        ErrorKind::BusinessRule if diagnostic.code.is_conflict() => Color::Magenta,
        ErrorKind::BusinessRule => Color::Yellow,
    };
    Cell::new(diagnostic.code).fg(color)
}

fn status_cell(status: ReadingStatus) -> Cell {
    match status {
        ReadingStatus::Ok => Cell::new(status).fg(Color::Green),
        ReadingStatus::OutOfRange => Cell::new(status)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        ReadingStatus::UnknownRange => Cell::new(status).fg(Color::Yellow),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
