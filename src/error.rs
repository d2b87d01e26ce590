// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::version::StateVersion;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to decompress {}: {source}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Short read: needed {needed} bytes, found {got}")]
    ShortRead { needed: usize, got: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Unknown state version: {0}")]
    UnknownVersion(u32),
    #[error("State version {version} cannot be stored at {}", path.display())]
    EncodingMismatch { path: PathBuf, version: StateVersion },
    #[error("Payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("Invalid state version name: {0}")]
    InvalidVersionName(String),
}

impl StateError {
    /// The file system or device failed, independent of the file's contents.
    pub fn is_environmental(&self) -> bool {
        matches!(self, StateError::Open { .. } | StateError::Io(_))
    }

    /// The bytes were readable but do not form a container we understand.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            StateError::Decompress { .. }
                | StateError::ShortRead { .. }
                | StateError::UnknownVersion(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
