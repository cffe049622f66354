//! Bounds-checked sequential reader over an in-memory buffer

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Sequential little-endian reader over a borrowed byte slice.
///
/// Reads are all-or-nothing: a read that does not fit in the remaining
/// bytes returns [`Error::Truncated`] and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `n` bytes, borrowing them from the underlying buffer.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Skip exactly `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read(n).map(|_| ())
    }

    /// Look at the next four bytes without advancing.
    pub fn peek_tag(&self) -> Result<[u8; 4]> {
        let bytes = self.peek(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a four byte tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let tag = self.peek_tag()?;
        self.pos += 4;
        Ok(tag)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read(4).map(LittleEndian::read_i32)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read(4).map(LittleEndian::read_u32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read(8).map(LittleEndian::read_u64)
    }

    /// Re-borrow `len` bytes starting at an absolute `offset`.
    ///
    /// Used to look back at a chunk payload that has already been consumed.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::Truncated {
                offset,
                needed: len,
                remaining: self.data.len().saturating_sub(offset),
            })
    }

    fn peek(&self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            tracing::trace!(
                "Short read at offset {}: wanted {} bytes, {} left",
                self.pos,
                n,
                self.remaining()
            );
            return Err(Error::Truncated {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(&self.data[self.pos..self.pos + n])
    }
}
