// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Path classification and (de)compressing streams.

use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::error::{Result, StateError};
use crate::version::StateVersion;

/// Suffixes that mark a state file as a textual encoding.
pub const TEXTUAL_SUFFIXES: [&str; 2] = [".json", ".json.gz"];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True unless the file name marks the state as textual.
///
/// Only the path is inspected; no I/O happens here.
pub fn is_binary_container(path: impl AsRef<Path>) -> bool {
    let name = match path.as_ref().file_name() {
        Some(name) => name.to_string_lossy(),
        None => return true,
    };
    !TEXTUAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Marks an I/O error as raised while inflating, not by the device.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct InflateError(io::Error);

/// True when `err` was raised by a decompressing stream from [`FsOpener`].
pub fn is_inflate_error(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<InflateError>())
}

/// Tags every failure of the wrapped decoder with [`InflateError`].
struct Inflate<R>(R);

impl<R: Read> Read for Inflate<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| match e.kind() {
            io::ErrorKind::Interrupted => e,
            kind => io::Error::new(kind, InflateError(e)),
        })
    }
}

/// Supported compression framings.
///
/// Framing is recognized by leading magic, so a raw container whose tag has
/// `0x8b1f` in its low 16 bits reads as gzip and fails with `Decompress`.
/// No registered version has that bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// Classify a stream by its leading bytes.
    pub fn sniff(prefix: &[u8]) -> Self {
        if prefix.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Framing used when writing to `path`.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext == "gz" => Compression::Gzip,
            _ => Compression::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
        }
    }
}

/// Opens state files for reading.
pub trait StreamOpener {
    /// Open `path`, inflating the payload when it is compressed.
    ///
    /// Dropping the returned reader releases the underlying file.
    fn open_decompressed(&self, path: &Path) -> Result<Box<dyn Read>>;
}

/// Opens files from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOpener;

impl FsOpener {
    /// Like [`StreamOpener::open_decompressed`], also reporting the framing found.
    pub fn open_with_compression(&self, path: &Path) -> Result<(Box<dyn Read>, Compression)> {
        let open_err = |source| StateError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_err)?;
        let mut reader = BufReader::new(file);
        let compression = Compression::sniff(reader.fill_buf().map_err(open_err)?);
        tracing::debug!(path = %path.display(), compression = compression.as_str(), "opened state file");

        let stream: Box<dyn Read> = match compression {
            Compression::None => Box::new(reader),
            Compression::Gzip => {
                let mut decoder = Inflate(MultiGzDecoder::new(reader));
                // Inflate enough for the version tag now so a broken or
                // truncated stream is reported against the path.
                let mut prefix = Vec::with_capacity(StateVersion::WIDTH);
                (&mut decoder)
                    .take(StateVersion::WIDTH as u64)
                    .read_to_end(&mut prefix)
                    .map_err(|source| StateError::Decompress {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Box::new(Cursor::new(prefix).chain(decoder))
            }
        };
        Ok((stream, compression))
    }
}

impl StreamOpener for FsOpener {
    fn open_decompressed(&self, path: &Path) -> Result<Box<dyn Read>> {
        self.open_with_compression(path).map(|(reader, _)| reader)
    }
}

/// Writer that applies a [`Compression`] framing to everything written.
pub enum CompressedWriter<W: Write> {
    Raw(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> CompressedWriter<W> {
    pub fn new(inner: W, compression: Compression) -> Self {
        match compression {
            Compression::None => CompressedWriter::Raw(inner),
            Compression::Gzip => {
                CompressedWriter::Gzip(GzEncoder::new(inner, flate2::Compression::default()))
            }
        }
    }

    /// Flush any framing trailer and hand back the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            CompressedWriter::Raw(mut w) => {
                w.flush()?;
                Ok(w)
            }
            CompressedWriter::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedWriter::Raw(w) => w.write(buf),
            CompressedWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedWriter::Raw(w) => w.flush(),
            CompressedWriter::Gzip(w) => w.flush(),
        }
    }
}
