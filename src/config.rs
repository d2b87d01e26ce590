// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Upper bound on payload bytes read by `VersionDetector::load`.
    pub max_payload_len: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_payload_len: 256 * 1024 * 1024,
        }
    }
}
