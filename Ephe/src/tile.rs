//! HEALPix tile records
//!
//! The payload of an uppercase-tagged chunk:
//!
//! ```text
//! version            i32
//! nuniq              u64
//! uncompressed_size  i32
//! compressed_size    i32
//! data               [u8; compressed_size]   (zlib)
//! ```

#![allow(clippy::doc_markdown)]

use crate::checksum::ChecksumMode;
use crate::chunk::{Chunk, ChunkTag};
use crate::compression;
use crate::error::{Error, Result};
use crate::healpix::HealpixIndex;
use crate::options::DecodeOptions;

/// Size of the fixed fields preceding the compressed data.
pub const TILE_HEADER_SIZE: usize = 20;

/// Fixed fields of a tile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileHeader {
    /// Producer-defined tile format version.
    pub version: i32,
    /// Raw NUNIQ as stored.
    pub nuniq: u64,
    /// Address decoded from `nuniq`.
    pub index: HealpixIndex,
    pub uncompressed_size: usize,
    pub compressed_size: usize,
}

impl TileHeader {
    /// Read the fixed tile fields from an open chunk.
    pub fn read(chunk: &mut Chunk<'_, '_>) -> Result<Self> {
        let tag = chunk.tag();
        let version = chunk.read_i32()?;
        let nuniq = chunk.read_u64()?;
        let index = HealpixIndex::from_nuniq(nuniq)?;
        let uncompressed_size = size_field(tag, "uncompressed size", chunk.read_i32()?)?;
        let compressed_size = size_field(tag, "compressed size", chunk.read_i32()?)?;

        Ok(Self {
            version,
            nuniq,
            index,
            uncompressed_size,
            compressed_size,
        })
    }
}

fn size_field(tag: ChunkTag, field: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidTileSize { tag, field, value })
}

/// A decoded tile, borrowed for the duration of one sink call.
///
/// `data` points into a buffer the decoder drops as soon as the sink
/// returns; copy it (e.g. with [`Tile::to_decoded`]) to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<'t> {
    /// Chunk tag; distinguishes tile families (e.g. star catalogs).
    pub tag: ChunkTag,
    /// Tile format version.
    pub version: i32,
    /// HEALPix address.
    pub index: HealpixIndex,
    /// Decompressed tile bytes.
    pub data: &'t [u8],
}

impl Tile<'_> {
    pub fn order(&self) -> u8 {
        self.index.order
    }

    pub fn pixel(&self) -> u64 {
        self.index.pixel
    }

    /// Copy the tile out of the decoder's scratch buffer.
    pub fn to_decoded(&self) -> DecodedTile {
        DecodedTile {
            tag: self.tag,
            version: self.version,
            index: self.index,
            data: self.data.to_vec(),
        }
    }
}

/// An owned copy of a [`Tile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTile {
    pub tag: ChunkTag,
    pub version: i32,
    pub index: HealpixIndex,
    pub data: Vec<u8>,
}

impl DecodedTile {
    /// Borrow as a [`Tile`].
    pub fn as_tile(&self) -> Tile<'_> {
        Tile {
            tag: self.tag,
            version: self.version,
            index: self.index,
            data: &self.data,
        }
    }
}

/// Read a whole tile record from `chunk` and inflate its payload.
///
/// Size limits are enforced before anything is allocated: the uncompressed
/// size against `options.max_tile_size`, the compressed size against what is
/// left of the chunk. In [`ChecksumMode::Verify`] the zlib stream must also
/// end exactly at `compressed_size`.
pub(crate) fn decode_tile(
    chunk: &mut Chunk<'_, '_>,
    options: &DecodeOptions,
) -> Result<(TileHeader, Vec<u8>)> {
    let tag = chunk.tag();
    let header = TileHeader::read(chunk)?;

    if header.uncompressed_size > options.max_tile_size {
        return Err(Error::TileTooLarge {
            tag,
            size: header.uncompressed_size,
            limit: options.max_tile_size,
        });
    }

    if header.compressed_size > chunk.remaining() {
        return Err(Error::ChunkOverrun {
            tag,
            declared: chunk.declared_length(),
            requested: chunk.consumed() + header.compressed_size,
        });
    }

    let compressed = chunk.read(header.compressed_size)?;
    let data = if options.checksum == ChecksumMode::Verify {
        compression::inflate_strict(compressed, header.uncompressed_size)?
    } else {
        compression::inflate(compressed, header.uncompressed_size)?
    };

    tracing::debug!(
        "Tile {} {}: {} -> {} bytes (version {})",
        tag,
        header.index,
        header.compressed_size,
        header.uncompressed_size,
        header.version
    );

    Ok((header, data))
}
