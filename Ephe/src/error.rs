//! Error types for `ephe`

#![allow(clippy::doc_markdown)]

use thiserror::Error;

use crate::chunk::ChunkTag;

/// The error type for EPHE decoding operations.
///
/// Every variant is terminal for the decode call that produced it: the
/// decoder never retries a chunk and never returns a partial result.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error while loading a buffer from disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Container Errors ====================
    /// The buffer ran out in the middle of a read.
    #[error("truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Cursor position where the read was attempted.
        offset: usize,
        /// Number of bytes the read asked for.
        needed: usize,
        /// Number of bytes left in the buffer.
        remaining: usize,
    },

    /// The buffer does not start with the `EPHE` magic.
    #[error("invalid EPHE magic: expected EPHE, found {0:?}")]
    BadMagic([u8; 4]),

    /// The container version is not the one supported version.
    #[error("unsupported EPHE version: {version} (supported: {})", crate::FILE_VERSION)]
    UnsupportedVersion {
        /// The version number found in the file.
        version: i32,
    },

    // ==================== Chunk Errors ====================
    /// A chunk header declared a negative payload length.
    #[error("chunk {tag} declares invalid length {length}")]
    InvalidChunkLength {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// The raw length field.
        length: i32,
    },

    /// A payload read would run past the chunk's declared length.
    #[error("chunk {tag} overrun: read of {requested} bytes exceeds declared length {declared}")]
    ChunkOverrun {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// Declared payload length.
        declared: usize,
        /// Total payload bytes the read would have consumed.
        requested: usize,
    },

    /// A chunk was closed before its declared payload was fully consumed.
    #[error("chunk {tag} closed after {consumed} of {declared} payload bytes")]
    ChunkLengthMismatch {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// Declared payload length.
        declared: usize,
        /// Payload bytes actually consumed.
        consumed: usize,
    },

    /// Stored chunk CRC does not match the payload (strict mode only).
    #[error("chunk {tag} checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// CRC stored in the file.
        expected: u32,
        /// CRC computed over the payload.
        actual: u32,
    },

    // ==================== Tile Errors ====================
    /// A tile's nuniq does not encode any HEALPix (order, pixel) pair.
    #[error("invalid HEALPix nuniq: {0}")]
    InvalidNuniq(u64),

    /// A tile size field is negative.
    #[error("tile {tag} has invalid {field}: {value}")]
    InvalidTileSize {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// Name of the size field.
        field: &'static str,
        /// The raw field value.
        value: i32,
    },

    /// A tile's declared uncompressed size exceeds the configured limit.
    #[error("tile {tag} declares {size} uncompressed bytes (limit: {limit})")]
    TileTooLarge {
        /// Tag of the offending chunk.
        tag: ChunkTag,
        /// Declared uncompressed size.
        size: usize,
        /// Configured `max_tile_size`.
        limit: usize,
    },

    // ==================== Compression Errors ====================
    /// Zlib inflation failed or produced the wrong number of bytes.
    #[error("decompression failed: {message}")]
    DecompressionFailed {
        /// The error message.
        message: String,
    },

    // ==================== Consumer Errors ====================
    /// The tile sink reported a failure; decoding stopped.
    #[error("tile sink aborted at {tag} order {order} pixel {pixel}: {message}")]
    SinkAborted {
        /// Tag of the tile being delivered.
        tag: ChunkTag,
        /// HEALPix order of the tile.
        order: u8,
        /// HEALPix pixel of the tile.
        pixel: u64,
        /// The sink's error, rendered with its context chain.
        message: String,
    },

    // ==================== Configuration Errors ====================
    /// Decode options could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// A specialized Result type for `ephe` operations.
pub type Result<T> = std::result::Result<T, Error>;
