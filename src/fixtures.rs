// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::Result;
use crate::state::{self, VersionedState};
use crate::version::StateVersion;

use std::fs;
use std::path::{Path, PathBuf};

pub struct ScenarioPaths {
    pub json: PathBuf,
    pub binary: PathBuf,
    pub gzip: PathBuf,
    pub unknown: PathBuf,
    pub short: PathBuf,
    pub empty: PathBuf,
}

/// Deterministic filler standing in for a serialized VM state.
pub fn sample_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}

/// Writes one file per detection outcome into `dir`.
pub fn generate_state_scenario(dir: &Path) -> Result<ScenarioPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    // 1. Textual state
    let json = dir.join("state.json");
    let doc = br#"{"version":1,"memory":[],"pc":0,"exited":false}"#.to_vec();
    state::write_state(&json, &VersionedState::new(StateVersion::TEXTUAL_SINGLE_THREADED, doc))?;

    // 2. Raw and gzip binary containers
    let binary = dir.join("state.bin");
    state::write_state(
        &binary,
        &VersionedState::new(StateVersion::SINGLE_THREADED_2, sample_payload(128)),
    )?;

    let gzip = dir.join("state.bin.gz");
    state::write_state(
        &gzip,
        &VersionedState::new(StateVersion::MULTI_THREADED_64_2, sample_payload(4096)),
    )?;

    // 3. Broken containers, written by hand since write_state refuses them
    let unknown = dir.join("unknown.bin");
    let mut bytes = 7u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&sample_payload(16));
    fs::write(&unknown, bytes)?;

    let short = dir.join("short.bin");
    fs::write(&short, [0x02u8, 0x00])?;

    let empty = dir.join("empty.bin");
    fs::write(&empty, b"")?;

    Ok(ScenarioPaths {
        json,
        binary,
        gzip,
        unknown,
        short,
        empty,
    })
}
