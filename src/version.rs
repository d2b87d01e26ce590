// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! State version registry.
//!
//! Every on-disk encoding of VM state is named by a [`StateVersion`]. The set
//! is append-only: a value is never reassigned, and a retired version keeps
//! its row so that old snapshots still decode to the same tag.
//!
//! [`REGISTRY`] is the only place versions are listed. Validation, name
//! lookup, parsing and iteration all read from it.

use core::fmt;
use core::str::FromStr;
use serde::{Serialize, Serializer};

use crate::error::StateError;

/// How a version is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Self-describing document, dispatched by path classification.
    Textual,
    /// Fixed-width tag followed by a version-specific payload.
    Binary,
}

/// Whether new snapshots are still produced in this encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Supported,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: StateVersion,
    pub name: &'static str,
    pub encoding: Encoding,
    pub status: Status,
}

/// Tag identifying the on-disk encoding of a VM state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateVersion(u32);

impl StateVersion {
    /// Reserved for files classified as textual. Never valid in a binary header.
    pub const TEXTUAL_SINGLE_THREADED: StateVersion = StateVersion(0);
    pub const SINGLE_THREADED: StateVersion = StateVersion(1);
    pub const MULTI_THREADED: StateVersion = StateVersion(2);
    pub const SINGLE_THREADED_2: StateVersion = StateVersion(3);
    pub const MULTI_THREADED_64: StateVersion = StateVersion(4);
    pub const MULTI_THREADED_64_2: StateVersion = StateVersion(5);
    pub const MULTI_THREADED_2: StateVersion = StateVersion(6);

    /// Width in bytes of the tag at the start of a binary container.
    pub const WIDTH: usize = 4;

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Registry row for this version.
    pub fn info(self) -> &'static VersionInfo {
        // Constructors only admit registered values.
        REGISTRY
            .iter()
            .find(|row| row.version == self)
            .unwrap_or(&REGISTRY[0])
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn encoding(self) -> Encoding {
        self.info().encoding
    }

    pub fn status(self) -> Status {
        self.info().status
    }

    pub fn is_textual(self) -> bool {
        self.encoding() == Encoding::Textual
    }

    /// All registered versions in ascending order.
    pub fn all() -> impl Iterator<Item = &'static VersionInfo> {
        REGISTRY.iter()
    }

    /// Binary tags that may appear in a container header.
    pub fn binary() -> impl Iterator<Item = StateVersion> {
        REGISTRY
            .iter()
            .filter(|row| row.encoding == Encoding::Binary)
            .map(|row| row.version)
    }
}

pub static REGISTRY: [VersionInfo; 7] = [
    VersionInfo {
        version: StateVersion::TEXTUAL_SINGLE_THREADED,
        name: "singlethreaded-json",
        encoding: Encoding::Textual,
        status: Status::Supported,
    },
    VersionInfo {
        version: StateVersion::SINGLE_THREADED,
        name: "singlethreaded",
        encoding: Encoding::Binary,
        status: Status::Retired,
    },
    VersionInfo {
        version: StateVersion::MULTI_THREADED,
        name: "multithreaded",
        encoding: Encoding::Binary,
        status: Status::Retired,
    },
    VersionInfo {
        version: StateVersion::SINGLE_THREADED_2,
        name: "singlethreaded-2",
        encoding: Encoding::Binary,
        status: Status::Supported,
    },
    VersionInfo {
        version: StateVersion::MULTI_THREADED_64,
        name: "multithreaded64",
        encoding: Encoding::Binary,
        status: Status::Retired,
    },
    VersionInfo {
        version: StateVersion::MULTI_THREADED_64_2,
        name: "multithreaded64-2",
        encoding: Encoding::Binary,
        status: Status::Supported,
    },
    VersionInfo {
        version: StateVersion::MULTI_THREADED_2,
        name: "multithreaded-2",
        encoding: Encoding::Binary,
        status: Status::Supported,
    },
];

fn lookup(value: u32) -> Option<&'static VersionInfo> {
    REGISTRY.iter().find(|row| row.version.0 == value)
}

/// True when `value` may appear as the tag of a binary container.
pub fn is_valid_state_version(value: u32) -> bool {
    matches!(lookup(value), Some(row) if row.encoding == Encoding::Binary)
}

impl TryFrom<u32> for StateVersion {
    type Error = StateError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        lookup(value)
            .map(|row| row.version)
            .ok_or(StateError::UnknownVersion(value))
    }
}

impl From<StateVersion> for u32 {
    fn from(v: StateVersion) -> u32 {
        v.0
    }
}

impl fmt::Display for StateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a registered name or its decimal value.
impl FromStr for StateVersion {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(row) = REGISTRY.iter().find(|row| row.name == s) {
            return Ok(row.version);
        }
        match s.parse::<u32>() {
            Ok(value) => StateVersion::try_from(value),
            Err(_) => Err(StateError::InvalidVersionName(s.to_string())),
        }
    }
}

impl Serialize for StateVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
