//! Chunk framing
//!
//! A chunk is `tag(4) length(i32) payload[length] crc(u32)`. [`Chunk::start`]
//! opens one, payload reads are charged against the declared length, and
//! [`Chunk::finish`] closes it by reading the trailing CRC.

#![allow(clippy::doc_markdown)]

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::{self, ChecksumMode};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Size of the `tag` + `length` chunk header.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of the trailing CRC field.
pub const CHUNK_CRC_SIZE: usize = 4;

/// Four byte chunk type tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    /// The raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The tag as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl From<[u8; 4]> for ChunkTag {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag(\"{self}\")")
    }
}

/// What a chunk carries, decided from its tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// A compressed HEALPix tile record.
    HealpixTile,
    /// Anything else; the payload is skipped without interpretation.
    Opaque(ChunkTag),
}

impl ChunkKind {
    /// Tags starting with an ASCII uppercase letter are HEALPix tiles.
    pub fn from_tag(tag: ChunkTag) -> Self {
        if tag.0[0].is_ascii_uppercase() {
            Self::HealpixTile
        } else {
            Self::Opaque(tag)
        }
    }

    pub fn is_tile(&self) -> bool {
        matches!(self, Self::HealpixTile)
    }
}

/// A chunk whose payload is being read.
///
/// Borrows the file cursor mutably until it is closed with [`Chunk::finish`].
#[derive(Debug)]
pub struct Chunk<'c, 'a> {
    cursor: &'c mut ByteCursor<'a>,
    tag: ChunkTag,
    offset: usize,
    declared: usize,
    consumed: usize,
}

/// Everything known about a chunk once its CRC has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedChunk {
    /// Chunk type tag.
    pub tag: ChunkTag,
    /// Offset of the chunk header from the start of the file.
    pub offset: usize,
    /// Declared payload length.
    pub length: usize,
    /// The stored CRC field.
    pub crc: u32,
}

impl<'c, 'a> Chunk<'c, 'a> {
    /// Open the next chunk.
    ///
    /// Returns `Ok(None)` when the cursor is exhausted, which is how a
    /// well-formed file ends.
    pub fn start(cursor: &'c mut ByteCursor<'a>) -> Result<Option<Self>> {
        if cursor.is_empty() {
            return Ok(None);
        }

        let offset = cursor.position();
        let tag = ChunkTag(cursor.read_tag()?);
        let length = cursor.read_i32()?;
        let declared =
            usize::try_from(length).map_err(|_| Error::InvalidChunkLength { tag, length })?;

        tracing::trace!("Chunk {} at offset {}: {} payload bytes", tag, offset, declared);

        Ok(Some(Self {
            cursor,
            tag,
            offset,
            declared,
            consumed: 0,
        }))
    }

    pub fn tag(&self) -> ChunkTag {
        self.tag
    }

    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_tag(self.tag)
    }

    /// Offset of the chunk header from the start of the file.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn declared_length(&self) -> usize {
        self.declared
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Payload bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.declared - self.consumed
    }

    /// Read `n` payload bytes.
    ///
    /// Fails with [`Error::ChunkOverrun`] if the read would pass the declared
    /// length, and with [`Error::Truncated`] if the buffer ends first. In
    /// both cases nothing is consumed.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let requested = self.consumed.saturating_add(n);
        if requested > self.declared {
            return Err(Error::ChunkOverrun {
                tag: self.tag,
                declared: self.declared,
                requested,
            });
        }

        let bytes = self.cursor.read(n)?;
        self.consumed = requested;
        Ok(bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read(4).map(LittleEndian::read_i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read(8).map(LittleEndian::read_u64)
    }

    /// Consume the rest of the payload without looking at it.
    pub fn skip_remaining(&mut self) -> Result<()> {
        self.read(self.remaining()).map(|_| ())
    }

    /// Close the chunk: read its CRC and apply the checksum policy.
    pub fn finish(self, mode: ChecksumMode) -> Result<ClosedChunk> {
        if self.consumed != self.declared {
            return Err(Error::ChunkLengthMismatch {
                tag: self.tag,
                declared: self.declared,
                consumed: self.consumed,
            });
        }

        let crc = LittleEndian::read_u32(self.cursor.read(CHUNK_CRC_SIZE)?);
        if mode.computes() {
            let payload = self
                .cursor
                .slice(self.offset + CHUNK_HEADER_SIZE, self.declared)?;
            checksum::check(mode, self.tag, payload, crc)?;
        }

        Ok(ClosedChunk {
            tag: self.tag,
            offset: self.offset,
            length: self.declared,
            crc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_bytes(tag: &[u8; 4], payload: &[u8], crc: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(tag);
        out.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(ChunkKind::from_tag(ChunkTag(*b"STAR")), ChunkKind::HealpixTile);
        assert_eq!(ChunkKind::from_tag(ChunkTag(*b"Zzzz")), ChunkKind::HealpixTile);
        assert_eq!(
            ChunkKind::from_tag(ChunkTag(*b"meta")),
            ChunkKind::Opaque(ChunkTag(*b"meta"))
        );
        assert!(!ChunkKind::from_tag(ChunkTag(*b"_ABC")).is_tile());
        assert!(!ChunkKind::from_tag(ChunkTag([0xC3, b'A', b'B', b'C'])).is_tile());
    }

    #[test]
    fn test_tag_display_escapes_binary() {
        assert_eq!(ChunkTag(*b"STAR").to_string(), "STAR");
        assert_eq!(ChunkTag([b'A', 0, b'B', 0xFF]).to_string(), "A\\x00B\\xff");
    }

    #[test]
    fn test_empty_cursor_is_end_of_stream() {
        let mut cursor = ByteCursor::new(&[]);
        assert!(Chunk::start(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_read_and_finish() {
        let data = chunk_bytes(b"meta", &[1, 0, 0, 0, 7, 7], 0xDEAD_BEEF);
        let mut cursor = ByteCursor::new(&data);

        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        assert_eq!(chunk.tag(), ChunkTag(*b"meta"));
        assert_eq!(chunk.declared_length(), 6);
        assert_eq!(chunk.read_i32().unwrap(), 1);
        assert_eq!(chunk.consumed(), 4);
        chunk.skip_remaining().unwrap();

        let closed = chunk.finish(ChecksumMode::Ignore).unwrap();
        assert_eq!(closed.crc, 0xDEAD_BEEF);
        assert_eq!(closed.length, 6);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_finish_leaves_cursor_on_next_chunk() {
        let mut data = chunk_bytes(b"meta", b"abc", 7);
        data.extend(chunk_bytes(b"next", b"", 0));
        let mut cursor = ByteCursor::new(&data);

        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        chunk.skip_remaining().unwrap();
        let closed = chunk.finish(ChecksumMode::Ignore).unwrap();
        assert_eq!(closed.crc, 7);
        assert_eq!(cursor.position(), CHUNK_HEADER_SIZE + 3 + CHUNK_CRC_SIZE);

        let next = Chunk::start(&mut cursor).unwrap().unwrap();
        assert_eq!(next.tag(), ChunkTag(*b"next"));
        assert_eq!(next.offset(), CHUNK_HEADER_SIZE + 3 + CHUNK_CRC_SIZE);
    }

    #[test]
    fn test_overrun_is_an_error() {
        let data = chunk_bytes(b"meta", &[1, 2], 0);
        let mut cursor = ByteCursor::new(&data);

        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        let err = chunk.read_i32().unwrap_err();
        assert!(matches!(
            err,
            Error::ChunkOverrun { declared: 2, requested: 4, .. }
        ));
        assert_eq!(chunk.consumed(), 0);
    }

    #[test]
    fn test_negative_length_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(b"meta");
        data.extend_from_slice(&(-1i32).to_le_bytes());
        let mut cursor = ByteCursor::new(&data);

        let err = Chunk::start(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::InvalidChunkLength { length: -1, .. }));
    }

    #[test]
    fn test_finish_before_payload_consumed() {
        let data = chunk_bytes(b"meta", &[1, 2, 3], 0);
        let mut cursor = ByteCursor::new(&data);

        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        chunk.read(1).unwrap();
        let err = chunk.finish(ChecksumMode::Ignore).unwrap_err();
        assert!(matches!(
            err,
            Error::ChunkLengthMismatch { declared: 3, consumed: 1, .. }
        ));
    }

    #[test]
    fn test_missing_crc_is_truncated() {
        let mut data = chunk_bytes(b"meta", &[1, 2], 0);
        data.truncate(data.len() - 2);
        let mut cursor = ByteCursor::new(&data);

        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        chunk.skip_remaining().unwrap();
        assert!(matches!(
            chunk.finish(ChecksumMode::Ignore),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_verify_mode_checks_payload_crc() {
        let payload = b"hello";
        let good = chunk_bytes(b"meta", payload, checksum::crc32(payload));
        let mut cursor = ByteCursor::new(&good);
        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        chunk.skip_remaining().unwrap();
        assert!(chunk.finish(ChecksumMode::Verify).is_ok());

        let bad = chunk_bytes(b"meta", payload, 0);
        let mut cursor = ByteCursor::new(&bad);
        let mut chunk = Chunk::start(&mut cursor).unwrap().unwrap();
        chunk.skip_remaining().unwrap();
        assert!(matches!(
            chunk.finish(ChecksumMode::Verify),
            Err(Error::ChecksumMismatch { .. })
        ));
    }
}
