// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use mipsvm_state::{write_state, StateVersion, VersionedState};
use std::path::Path;

/// Write `input` as the payload of a state container at `output`.
pub fn run(version: StateVersion, input: &Path, output: &Path) -> anyhow::Result<()> {
    let payload = std::fs::read(input).with_context(|| format!("reading payload {}", input.display()))?;
    let len = payload.len();

    write_state(output, &VersionedState::new(version, payload))
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(output = %output.display(), version = %version, payload_len = len, "wrote state container");
    println!("Wrote {} ({} bytes payload) as {}", output.display(), len, version);
    Ok(())
}
