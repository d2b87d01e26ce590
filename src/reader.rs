// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-width integer decoding over a byte stream.
//!
//! All integers are little-endian. The reader never buffers, peeks, or skips:
//! each call consumes exactly the width of the requested type.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read};

use crate::error::{Result, StateError};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Unsigned integer types the reader can decode.
pub trait UInt: Copy + sealed::Sealed {
    const WIDTH: usize;

    fn decode(buf: &[u8]) -> Self;
}

impl UInt for u8 {
    const WIDTH: usize = 1;

    fn decode(buf: &[u8]) -> Self {
        buf[0]
    }
}

impl UInt for u16 {
    const WIDTH: usize = 2;

    fn decode(buf: &[u8]) -> Self {
        LittleEndian::read_u16(buf)
    }
}

impl UInt for u32 {
    const WIDTH: usize = 4;

    fn decode(buf: &[u8]) -> Self {
        LittleEndian::read_u32(buf)
    }
}

impl UInt for u64 {
    const WIDTH: usize = 8;

    fn decode(buf: &[u8]) -> Self {
        LittleEndian::read_u64(buf)
    }
}

/// Anything that can fill a fixed-width integer.
pub trait UIntSource {
    fn read_uint<T: UInt>(&mut self) -> Result<T>;
}

pub struct BinaryReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Drain the remainder of the stream, failing once more than `limit` bytes appear.
    pub fn read_to_end(&mut self, limit: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let read = (&mut self.inner)
            .take(limit.saturating_add(1))
            .read_to_end(&mut out)?;
        if read as u64 > limit {
            return Err(StateError::PayloadTooLarge { limit });
        }
        self.offset += read as u64;
        Ok(out)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut got = 0;
        while got < buf.len() {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => {
                    return Err(StateError::ShortRead {
                        needed: buf.len(),
                        got,
                    })
                }
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StateError::Io(e)),
            }
        }
        self.offset += got as u64;
        Ok(())
    }
}

impl<R: Read> UIntSource for BinaryReader<R> {
    fn read_uint<T: UInt>(&mut self) -> Result<T> {
        let mut buf = [0u8; 8];
        let buf = &mut buf[..T::WIDTH];
        self.fill(buf)?;
        Ok(T::decode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((b, rest)) if !buf.is_empty() => {
                    buf[0] = *b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_little_endian_widths() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F];
        let mut r = BinaryReader::new(&bytes[..]);

        assert_eq!(r.read_uint::<u8>().unwrap(), 0x01);
        assert_eq!(r.read_uint::<u16>().unwrap(), 0x0302);
        assert_eq!(r.read_uint::<u32>().unwrap(), 0x0706_0504);
        assert_eq!(r.read_uint::<u64>().unwrap(), 0x0F0E_0D0C_0B0A_0908);
        assert_eq!(r.offset(), 15);
    }

    #[test]
    fn test_reassembles_partial_reads() {
        let mut r = BinaryReader::new(Trickle(&[0x06, 0, 0, 0]));
        assert_eq!(r.read_uint::<u32>().unwrap(), 6);
    }

    #[test]
    fn test_short_read_reports_progress() {
        let mut r = BinaryReader::new(&[0x02, 0x00][..]);
        let err = r.read_uint::<u32>().unwrap_err();
        assert!(matches!(err, StateError::ShortRead { needed: 4, got: 2 }));
    }

    #[test]
    fn test_empty_stream_is_short_read() {
        let mut r = BinaryReader::new(io::empty());
        let err = r.read_uint::<u32>().unwrap_err();
        assert!(matches!(err, StateError::ShortRead { needed: 4, got: 0 }));
    }

    #[test]
    fn test_io_failure_is_not_short_read() {
        let mut r = BinaryReader::new(Broken);
        match r.read_uint::<u32>() {
            Err(StateError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_to_end_limit() {
        let mut r = BinaryReader::new(&[1, 2, 3, 4, 5][..]);
        assert_eq!(r.read_uint::<u8>().unwrap(), 1);
        assert_eq!(r.read_to_end(4).unwrap(), vec![2, 3, 4, 5]);
        assert_eq!(r.offset(), 5);

        let mut r = BinaryReader::new(&[1, 2, 3, 4, 5][..]);
        assert!(matches!(r.read_to_end(4), Err(StateError::PayloadTooLarge { limit: 4 })));
    }
}
