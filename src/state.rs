// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Versioned state containers.
//!
//! Binary layout:
//! [u32 LE] State version
//! [u8...]  Payload, opaque to this crate
//!
//! Textual files carry no header; the payload is the document itself. Either
//! form is gzip-framed when the path ends in `.gz`.

use byteorder::{LittleEndian, WriteBytesExt};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::detect::VersionDetector;
use crate::error::{Result, StateError};
use crate::opener::{is_binary_container, CompressedWriter, Compression, FsOpener};
use crate::version::{is_valid_state_version, StateVersion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedState {
    pub version: StateVersion,
    pub payload: Vec<u8>,
}

impl VersionedState {
    pub fn new(version: StateVersion, payload: Vec<u8>) -> Self {
        Self { version, payload }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsString::from(".tmp"));
    PathBuf::from(name)
}

/// Atomically write `state` to `path`.
pub fn write_state(path: impl AsRef<Path>, state: &VersionedState) -> Result<()> {
    let path = path.as_ref();
    let binary = is_binary_container(path);

    if binary && !is_valid_state_version(state.version.as_u32()) {
        return Err(StateError::UnknownVersion(state.version.as_u32()));
    }
    if !binary && !state.version.is_textual() {
        return Err(StateError::EncodingMismatch {
            path: path.to_path_buf(),
            version: state.version,
        });
    }

    let tmp = tmp_path(path);
    let written = (|| -> std::io::Result<()> {
        let file = File::create(&tmp)?;
        let mut w = CompressedWriter::new(file, Compression::for_path(path));
        if binary {
            w.write_u32::<LittleEndian>(state.version.as_u32())?;
        }
        w.write_all(&state.payload)?;
        let file = w.finish()?;
        file.sync_data()?;
        fs::rename(&tmp, path)
    })();
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp); // may never have been created
        return Err(e.into());
    }

    tracing::debug!(
        path = %path.display(),
        version = state.version.as_u32(),
        payload_len = state.payload.len(),
        "wrote state file"
    );
    Ok(())
}

/// Read a state file from the local file system.
pub fn read_state(path: impl AsRef<Path>) -> Result<VersionedState> {
    VersionDetector::new(FsOpener).load(path)
}
