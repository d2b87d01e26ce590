// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! mipsvm-state: version detection and container I/O for MIPS VM state snapshots.

pub mod config;
pub mod detect;
pub mod error;
pub mod fixtures;
pub mod opener;
pub mod reader;
pub mod state;
pub mod version;

pub use config::DetectorConfig;
pub use detect::{detect_version, VersionDetector};
pub use error::{Result, StateError};
pub use opener::{is_binary_container, Compression, FsOpener, StreamOpener};
pub use state::{read_state, write_state, VersionedState};
pub use version::{is_valid_state_version, StateVersion};
