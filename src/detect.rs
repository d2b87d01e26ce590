// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! State version detection.
//!
//! Path classification decides the dispatch: a textual path yields
//! [`StateVersion::TEXTUAL_SINGLE_THREADED`] without touching the file. A
//! binary path is opened (inflating gzip if present) and its leading `u32`
//! tag is checked against the registry.

use std::path::Path;

use crate::config::DetectorConfig;
use crate::error::{Result, StateError};
use crate::opener::{is_binary_container, is_inflate_error, FsOpener, StreamOpener};
use crate::reader::{BinaryReader, UIntSource};
use crate::state::VersionedState;
use crate::version::{is_valid_state_version, StateVersion};

/// Read the leading tag from `src` and validate it.
pub fn read_version_tag<S: UIntSource>(src: &mut S) -> Result<StateVersion> {
    let tag = src.read_uint::<u32>()?;
    if !is_valid_state_version(tag) {
        return Err(StateError::UnknownVersion(tag));
    }
    StateVersion::try_from(tag)
}

/// Report inflate failures against the file they came from.
fn attribute(path: &Path, err: StateError) -> StateError {
    match err {
        StateError::Io(source) if is_inflate_error(&source) => StateError::Decompress {
            path: path.to_path_buf(),
            source,
        },
        err => err,
    }
}

pub struct VersionDetector<O> {
    opener: O,
    config: DetectorConfig,
}

impl<O: StreamOpener> VersionDetector<O> {
    pub fn new(opener: O) -> Self {
        Self::with_config(opener, DetectorConfig::default())
    }

    pub fn with_config(opener: O, config: DetectorConfig) -> Self {
        Self { opener, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect(&self, path: impl AsRef<Path>) -> Result<StateVersion> {
        let path = path.as_ref();
        if !is_binary_container(path) {
            tracing::debug!(path = %path.display(), "textual state file, skipping header");
            return Ok(StateVersion::TEXTUAL_SINGLE_THREADED);
        }

        let stream = self.opener.open_decompressed(path)?;
        let mut reader = BinaryReader::new(stream);
        let version = read_version_tag(&mut reader).map_err(|e| attribute(path, e))?;
        tracing::debug!(path = %path.display(), version = version.as_u32(), "detected state version");
        Ok(version)
    }

    /// Detect the version and read the rest of the file as its payload.
    ///
    /// For textual files the payload is the whole (decompressed) document.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<VersionedState> {
        let path = path.as_ref();
        let stream = self.opener.open_decompressed(path)?;
        let mut reader = BinaryReader::new(stream);

        let version = if is_binary_container(path) {
            read_version_tag(&mut reader).map_err(|e| attribute(path, e))?
        } else {
            StateVersion::TEXTUAL_SINGLE_THREADED
        };
        let payload = reader
            .read_to_end(self.config.max_payload_len)
            .map_err(|e| attribute(path, e))?;
        tracing::debug!(
            path = %path.display(),
            version = version.as_u32(),
            payload_len = payload.len(),
            "loaded state file"
        );

        Ok(VersionedState { version, payload })
    }
}

/// Detect the state version of a file on the local file system.
pub fn detect_version(path: impl AsRef<Path>) -> Result<StateVersion> {
    VersionDetector::new(FsOpener).detect(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{self, Cursor, Read};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        live: AtomicUsize,
    }

    struct Tracked {
        inner: Cursor<Vec<u8>>,
        counters: Arc<Counters>,
    }

    impl Read for Tracked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// In-memory opener that counts opens and outstanding streams.
    #[derive(Default)]
    struct CountingOpener {
        files: HashMap<PathBuf, Vec<u8>>,
        counters: Arc<Counters>,
    }

    impl CountingOpener {
        fn with(mut self, path: &str, bytes: &[u8]) -> Self {
            self.files.insert(PathBuf::from(path), bytes.to_vec());
            self
        }
    }

    impl StreamOpener for CountingOpener {
        fn open_decompressed(&self, path: &Path) -> Result<Box<dyn Read>> {
            let bytes = self.files.get(path).cloned().ok_or_else(|| StateError::Open {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })?;
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            self.counters.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Tracked {
                inner: Cursor::new(bytes),
                counters: self.counters.clone(),
            }))
        }
    }

    struct FailingSource;

    impl UIntSource for FailingSource {
        fn read_uint<T: crate::reader::UInt>(&mut self) -> Result<T> {
            Err(StateError::Io(io::Error::new(io::ErrorKind::Other, "device gone")))
        }
    }

    #[test]
    fn test_textual_path_short_circuits() {
        let opener = CountingOpener::default().with("state.json", b"\x07\x00\x00\x00garbage");
        let counters = opener.counters.clone();
        let detector = VersionDetector::new(opener);

        let v = detector.detect("state.json").unwrap();
        assert_eq!(v, StateVersion::TEXTUAL_SINGLE_THREADED);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_every_binary_version_round_trips() {
        for v in StateVersion::binary() {
            let mut bytes = v.as_u32().to_le_bytes().to_vec();
            bytes.extend_from_slice(b"payload");
            let detector = VersionDetector::new(CountingOpener::default().with("state.bin", &bytes));
            assert_eq!(detector.detect("state.bin").unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_version_carries_value() {
        // In memory, so no framing is sniffed; see the gzip-magic case in tests/.
        for u in [0u32, 7, 8, 255, 0x8b1f, u32::MAX] {
            let detector = VersionDetector::new(CountingOpener::default().with("state.bin", &u.to_le_bytes()));
            match detector.detect("state.bin") {
                Err(StateError::UnknownVersion(value)) => assert_eq!(value, u),
                other => panic!("expected UnknownVersion({u}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_short_header() {
        for len in 0..StateVersion::WIDTH {
            let bytes = vec![0x02; len];
            let detector = VersionDetector::new(CountingOpener::default().with("state.bin", &bytes));
            let err = detector.detect("state.bin").unwrap_err();
            assert!(matches!(err, StateError::ShortRead { needed: 4, got } if got == len));
        }
    }

    #[test]
    fn test_streams_released_on_every_outcome() {
        let opener = CountingOpener::default()
            .with("ok.bin", &[3, 0, 0, 0, 9, 9])
            .with("unknown.bin", &[7, 0, 0, 0])
            .with("short.bin", &[2, 0]);
        let counters = opener.counters.clone();
        let detector = VersionDetector::new(opener);

        assert!(detector.detect("ok.bin").is_ok());
        assert!(detector.detect("unknown.bin").is_err());
        assert!(detector.detect("short.bin").is_err());
        assert!(detector.detect("missing.bin").is_err());
        assert!(detector.load("ok.bin").is_ok());

        assert_eq!(counters.opened.load(Ordering::SeqCst), 4);
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_read_error_surfaces_unmodified() {
        let err = read_version_tag(&mut FailingSource).unwrap_err();
        assert!(matches!(err, StateError::Io(ref e) if e.kind() == io::ErrorKind::Other));
    }

    #[test]
    fn test_attribute_only_rewrites_inflate_errors() {
        let path = Path::new("state.bin.gz");

        let plain = attribute(path, StateError::Io(io::Error::new(io::ErrorKind::Other, "disk")));
        assert!(matches!(plain, StateError::Io(_)));

        let short = attribute(path, StateError::ShortRead { needed: 4, got: 1 });
        assert!(matches!(short, StateError::ShortRead { needed: 4, got: 1 }));
    }

    #[test]
    fn test_load_splits_header_and_payload() {
        let detector = VersionDetector::new(
            CountingOpener::default()
                .with("state.bin", &[5, 0, 0, 0, 0xDE, 0xAD])
                .with("state.json", b"{\"pc\":0}"),
        );

        let state = detector.load("state.bin").unwrap();
        assert_eq!(state.version, StateVersion::MULTI_THREADED_64_2);
        assert_eq!(state.payload, vec![0xDE, 0xAD]);

        let state = detector.load("state.json").unwrap();
        assert_eq!(state.version, StateVersion::TEXTUAL_SINGLE_THREADED);
        assert_eq!(state.payload, b"{\"pc\":0}".to_vec());
    }

    #[test]
    fn test_load_respects_payload_limit() {
        let config = DetectorConfig { max_payload_len: 2 };
        let detector = VersionDetector::with_config(
            CountingOpener::default().with("state.bin", &[3, 0, 0, 0, 1, 2, 3]),
            config,
        );
        assert!(matches!(
            detector.load("state.bin"),
            Err(StateError::PayloadTooLarge { limit: 2 })
        ));
    }
}
