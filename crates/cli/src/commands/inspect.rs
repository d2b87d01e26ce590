// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use mipsvm_state::{is_binary_container, read_state, FsOpener, StateVersion};
use std::path::Path;

/// Bytes in front of the payload: the version tag, or nothing for textual files.
pub fn header_len(path: &Path) -> usize {
    if is_binary_container(path) {
        StateVersion::WIDTH
    } else {
        0
    }
}

pub fn run(path: &Path) -> anyhow::Result<()> {
    let state = read_state(path).with_context(|| format!("reading {}", path.display()))?;
    // Re-open only to report the framing; the stream is dropped immediately.
    let (_, compression) = FsOpener.open_with_compression(path)?;
    let digest = blake3::hash(&state.payload);

    let header_len = header_len(path);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);

    table.add_row(vec!["File", &path.display().to_string()]);
    table.add_row(vec!["Version", &format!("{} ({})", state.version, state.version.as_u32())]);
    table.add_row(vec!["Encoding", &format!("{:?}", state.version.encoding())]);
    table.add_row(vec!["Status", &format!("{:?}", state.version.status())]);
    table.add_row(vec!["Compression", compression.as_str()]);
    table.add_row(vec!["Header Bytes", &header_len.to_string()]);
    table.add_row(vec!["Payload Bytes", &state.payload.len().to_string()]);
    table.add_row(vec!["Payload BLAKE3", &digest.to_hex().to_string()]);

    println!("\nState File\n");
    println!("{table}\n");

    Ok(())
}
