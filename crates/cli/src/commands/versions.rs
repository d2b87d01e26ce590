// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use mipsvm_state::StateVersion;

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let rows: Vec<_> = StateVersion::all().collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tag", "Name", "Encoding", "Status"]);

    for row in StateVersion::all() {
        table.add_row(vec![
            row.version.as_u32().to_string(),
            row.name.to_string(),
            format!("{:?}", row.encoding),
            format!("{:?}", row.status),
        ]);
    }

    println!("\nKnown State Versions\n");
    println!("{table}\n");

    Ok(())
}
