use crate::cli::utils::{join_categories, join_details};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use serde::Serialize;
use whoip::{Category, Match, SourceStatus};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  JSON
--------------------------------------------------------------------------------------*/

pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Tables
--------------------------------------------------------------------------------------*/

fn new_table<const COLUMNS: usize>(headers: [&str; COLUMNS]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(headers.map(|header| {
        Cell::new(header)
            .add_attribute(Attribute::Bold)
            .fg(Color::Green)
    }));

    table
}

/*-----------------------------------------------------------------------------
  Match Table
-----------------------------------------------------------------------------*/

pub fn match_table(matches: &[Match]) {
    let mut table = new_table(["IP Prefix", "Source", "Categories", "Details"]);

    for found in matches {
        table.add_row(vec![
            Cell::new(found.prefix.network).add_attribute(Attribute::Bold),
            Cell::new(&found.name),
            Cell::new(join_categories(&found.categories)),
            Cell::new(join_details(&found.prefix.details)),
        ]);
    }

    // Right-align the IP Prefix column
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    summary_table.add_row(vec![Cell::new(matches.len()), Cell::new("Matching sources")]);
    if let Some(column) = summary_table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{summary_table}");
}

/*-----------------------------------------------------------------------------
  Category Table
-----------------------------------------------------------------------------*/

pub fn category_table(categories: &[Category]) {
    let mut table = new_table(["Category", "Description"]);

    for category in categories {
        table.add_row(vec![
            Cell::new(&category.id).add_attribute(Attribute::Bold),
            Cell::new(&category.description),
        ]);
    }

    println!("{table}");
}

/*-----------------------------------------------------------------------------
  Source Table
-----------------------------------------------------------------------------*/

pub fn source_table(sources: &[SourceStatus]) {
    let mut table = new_table(["Source", "Name", "Refresh Interval", "Last Update", "Prefixes"]);

    for source in sources {
        table.add_row(vec![
            Cell::new(&source.key).add_attribute(Attribute::Bold),
            Cell::new(&source.name),
            Cell::new(format!("{}h", source.refresh_interval_secs / 3600)),
            Cell::new(
                source
                    .last_update
                    .map(|last_update| last_update.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string()),
            ),
            Cell::new(source.prefixes),
        ]);
    }

    // Right-align the Prefixes column
    if let Some(column) = table.column_mut(4) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");
}
