//! Terminal rendering of the pager state.

use colored::Colorize;
use itertools::Itertools;

use crate::catalog::Artwork;
use crate::pager::{Pager, SelectionSet};
use crate::utils::truncate;

const COLUMNS: [(&str, usize); 7] = [
    ("ID", 8),
    ("Title", 32),
    ("Place of Origin", 16),
    ("Artist", 24),
    ("Inscriptions", 18),
    ("Start Date", 10),
    ("End Date", 10),
];

fn year(value: i32) -> String {
    if value == 0 {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}

fn checkbox(checked: bool) -> String {
    if checked {
        "[x]".green().bold().to_string()
    } else {
        "[ ]".to_string()
    }
}

fn row_cells(record: &Artwork) -> [String; 7] {
    [
        record.id.to_string(),
        record.title.clone(),
        record.place_of_origin.clone(),
        record.artist_display.clone(),
        record.inscriptions.clone(),
        year(record.date_start),
        year(record.date_end),
    ]
}

fn format_cells(cells: &[String]) -> String {
    cells
        .iter()
        .zip(COLUMNS.iter())
        .map(|(cell, (_, width))| format!("{:<width$}", truncate(cell, *width), width = *width))
        .join(" ")
}

/// Render the page window, paging footer and selection count. While an error
/// is set only the error message is rendered.
pub fn render_page(pager: &Pager) -> String {
    if let Some(err) = pager.error() {
        return format!("{}\n", err.red().bold());
    }

    let mut out = String::new();
    let header_cells: Vec<String> = COLUMNS.iter().map(|(name, _)| name.to_string()).collect();
    out.push_str(&format!(
        "{} {}\n",
        checkbox(pager.is_all_selected()),
        format_cells(&header_cells).bold()
    ));

    if pager.window().is_empty() {
        out.push_str("    No artworks on this page.\n");
    }
    for record in pager.window() {
        out.push_str(&format!(
            "{} {}\n",
            checkbox(pager.is_selected(record.id)),
            format_cells(&row_cells(record))
        ));
    }

    let cursor = pager.cursor();
    let (first, last) = cursor.showing(pager.window().len());
    out.push('\n');
    out.push_str(&format!(
        "Showing {first} to {last} of {} artworks :: page {}/{} :: {} per page\n",
        cursor.total(),
        cursor.page(),
        cursor.total_pages(),
        cursor.size()
    ));
    out.push_str(&format!(
        "{}\n",
        format!("Selected: {} items", pager.selection().len()).bold()
    ));
    out
}

/// Render the selection as a compact list.
pub fn render_selection_list(selection: &SelectionSet) -> String {
    if selection.is_empty() {
        return "Nothing selected.\n".to_string();
    }
    let mut out = selection
        .iter()
        .map(|r| {
            format!(
                "{:>8}  {}",
                r.id,
                truncate(&format!("{} ({})", r.title, r.artist_display), 72)
            )
        })
        .join("\n");
    out.push('\n');
    out.push_str(&format!("Selected: {} items\n", selection.len()));
    out
}
