// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte sinks and sources.
//!
//! Codecs write to a [`ByteSink`] and read from a [`ByteSource`]; neither
//! owns the underlying buffer or stream.

use crate::error::{FormatError, Result};
use std::io::{ErrorKind, Read, Write};

/// Chunk size used when reading length-prefixed payloads from a stream.
const READ_CHUNK: usize = 8 * 1024;

/// Destination of encoded bytes.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    /// Bytes written so far.
    fn written(&self) -> usize;
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn written(&self) -> usize {
        self.len()
    }
}

/// Sink over any [`Write`] implementation.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(FormatError::from)
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Origin of bytes to decode.
pub trait ByteSource {
    /// Fill `buf` completely or fail with [`FormatError::Truncated`].
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()>;

    fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Read `len` bytes into a fresh buffer.
    ///
    /// Memory grows with the bytes actually read, so a forged length cannot
    /// force a large allocation up front.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        if let Some(remaining) = self.remaining_hint() {
            if remaining < len {
                return Err(FormatError::Truncated {
                    offset: self.position(),
                    needed: len - remaining,
                });
            }
            let mut out = vec![0u8; len];
            self.read_exact_into(&mut out)?;
            return Ok(out);
        }

        let mut out = Vec::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        while out.len() < len {
            let n = (len - out.len()).min(READ_CHUNK);
            self.read_exact_into(&mut chunk[..n])?;
            out.extend_from_slice(&chunk[..n]);
        }
        Ok(out)
    }

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    /// Bytes left, when the source knows.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

/// Bounds-checked source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Borrow the next `len` bytes without copying.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let slice = self.read_slice(buf.len())?;
        buf.copy_from_slice(slice);
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let slice = self.read_slice(1)?;
        Ok(slice[0])
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_slice(len).map(<[u8]>::to_vec)
    }

    fn position(&self) -> usize {
        self.offset
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

/// Source over any [`Read`] implementation.
#[derive(Debug)]
pub struct IoSource<R: Read> {
    inner: R,
    position: usize,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(FormatError::Truncated {
                offset: self.position,
                needed: buf.len(),
            }),
            Err(e) => Err(FormatError::Io(e)),
        }
    }

    fn position(&self) -> usize {
        self.position
    }
}
