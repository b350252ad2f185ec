//! Tabular listings.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// A borderless table with a dimmed header row.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::DarkGrey)));
    if !super::output::color_enabled() {
        table.force_no_tty();
    }
    table
}

/// A yes/no cell colored by outcome.
pub fn flag(ok: bool) -> Cell {
    if ok {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}
