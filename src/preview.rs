//! Aligned text rendering of a snapshot for the `preview` command.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::PreviewArgs,
    io_utils,
    settings::Settings,
    snapshot::{self, COLUMNS, ReadOptions, Snapshot},
};

/// Cells wider than this are cut and end in `…`.
pub const MAX_CELL_WIDTH: usize = 40;

pub fn execute(args: &PreviewArgs, settings: &Settings) -> Result<()> {
    let input = settings.cache(args.input.as_deref());
    let options = ReadOptions {
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        mode: settings.compat(args.compat),
    };
    let snapshot = snapshot::load_snapshot(&input, options)
        .with_context(|| format!("Reading schema CSV {input:?}"))?
        .unwrap_or_default();
    print!("{}", render_snapshot(&snapshot, args.rows));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        snapshot.len().min(args.rows),
        snapshot.len(),
        input
    );
    Ok(())
}

/// Renders the first `limit` rows under the canonical column names. Absent
/// values show as `NULL` so they are distinguishable from empty text.
pub fn render_snapshot(snapshot: &Snapshot, limit: usize) -> String {
    let rows = snapshot
        .rows
        .iter()
        .take(limit)
        .map(|row| {
            let mut cells = row.cells();
            if row.normalization.is_none() {
                cells[6] = "NULL".to_string();
            }
            if row.example.is_none() {
                cells[7] = "NULL".to_string();
            }
            cells.iter().map(|cell| fit_cell(cell)).collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = COLUMNS.iter().map(|c| c.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let headers = COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn fit_cell(value: &str) -> String {
    let flat = value.replace(['\n', '\r', '\t'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut = flat.chars().take(MAX_CELL_WIDTH - 1).collect::<String>();
    cut.push('…');
    cut
}
