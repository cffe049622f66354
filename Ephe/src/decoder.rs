//! EPHE file decoding
//!
//! ```text
//! File  := magic("EPHE") version(i32 = 2) Chunk*
//! Chunk := tag(4) length(i32) payload[length] crc(u32)
//! ```
//!
//! Chunks are visited in file order. Tile chunks are inflated and handed to
//! a [`TileSink`]; every other chunk is skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::chunk::{Chunk, ChunkKind, ChunkTag};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::options::DecodeOptions;
use crate::tile::{self, DecodedTile, Tile, TileHeader};

/// EPHE magic bytes
pub const MAGIC: [u8; 4] = *b"EPHE";

/// The only container version this decoder reads
pub const FILE_VERSION: i32 = 2;

/// Size of the magic + version file header.
pub const FILE_HEADER_SIZE: usize = 8;

/// Receiver for decoded tiles.
///
/// `tile.data` is only valid for the duration of the call. Returning an
/// error stops the decode with [`Error::SinkAborted`].
pub trait TileSink {
    fn accept(&mut self, tile: &Tile<'_>) -> anyhow::Result<()>;
}

impl<F> TileSink for F
where
    F: FnMut(&Tile<'_>) -> anyhow::Result<()>,
{
    fn accept(&mut self, tile: &Tile<'_>) -> anyhow::Result<()> {
        self(tile)
    }
}

/// Collects owned copies of every tile.
impl TileSink for Vec<DecodedTile> {
    fn accept(&mut self, tile: &Tile<'_>) -> anyhow::Result<()> {
        self.push(tile.to_decoded());
        Ok(())
    }
}

/// Counters for a completed decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Total chunks read.
    pub chunks: usize,
    /// Tiles delivered to the sink.
    pub tiles: usize,
    /// Chunks skipped without interpretation.
    pub opaque: usize,
    /// Sum of tile compressed sizes.
    pub compressed_bytes: usize,
    /// Sum of tile uncompressed sizes.
    pub uncompressed_bytes: usize,
}

/// Framing-level description of one chunk, as reported by
/// [`EphDecoder::list_chunks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    pub tag: ChunkTag,
    pub kind: ChunkKind,
    /// Offset of the chunk header from the start of the file.
    pub offset: usize,
    /// Declared payload length.
    pub length: usize,
    /// Stored CRC field.
    pub crc: u32,
    /// Tile fields, for tile chunks.
    pub tile: Option<TileHeader>,
}

/// Validate the magic and version, leaving the cursor on the first chunk.
fn read_file_header(cursor: &mut ByteCursor<'_>) -> Result<()> {
    let magic = cursor.read_tag()?;
    if magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let version = cursor.read_i32()?;
    if version != FILE_VERSION {
        return Err(Error::UnsupportedVersion { version });
    }

    Ok(())
}

/// Decoder for EPHE buffers.
///
/// # Example
///
/// ```no_run
/// use ephe::{DecodeOptions, EphDecoder};
///
/// let data = std::fs::read("stars.eph")?;
/// let decoder = EphDecoder::new(DecodeOptions::strict());
/// let summary = decoder.decode_with(&data, |tile| {
///     println!("{} {} ({} bytes)", tile.tag, tile.index, tile.data.len());
///     Ok(())
/// })?;
/// println!("{} tiles", summary.tiles);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EphDecoder {
    options: DecodeOptions,
}

impl EphDecoder {
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode `data`, handing every tile to `sink` in file order.
    ///
    /// A tile is delivered only after its chunk has been closed, so in
    /// [`ChecksumMode::Verify`](crate::ChecksumMode::Verify) the sink never
    /// sees a tile whose CRC does not match.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; nothing after it is decoded.
    pub fn decode<S: TileSink + ?Sized>(&self, data: &[u8], sink: &mut S) -> Result<DecodeSummary> {
        let mut cursor = ByteCursor::new(data);
        read_file_header(&mut cursor)?;

        let mut summary = DecodeSummary::default();
        while let Some(mut chunk) = Chunk::start(&mut cursor)? {
            summary.chunks += 1;

            let decoded = match chunk.kind() {
                ChunkKind::HealpixTile => Some(tile::decode_tile(&mut chunk, &self.options)?),
                ChunkKind::Opaque(tag) => {
                    tracing::debug!(
                        "Skipping chunk {} at offset {} ({} bytes)",
                        tag,
                        chunk.offset(),
                        chunk.declared_length()
                    );
                    chunk.skip_remaining()?;
                    None
                }
            };
            let closed = chunk.finish(self.options.checksum)?;

            let Some((header, bytes)) = decoded else {
                summary.opaque += 1;
                continue;
            };

            let tile = Tile {
                tag: closed.tag,
                version: header.version,
                index: header.index,
                data: &bytes,
            };
            sink.accept(&tile).map_err(|e| Error::SinkAborted {
                tag: closed.tag,
                order: header.index.order,
                pixel: header.index.pixel,
                message: format!("{e:#}"),
            })?;

            summary.tiles += 1;
            summary.compressed_bytes += header.compressed_size;
            summary.uncompressed_bytes += header.uncompressed_size;
        }

        tracing::debug!(
            "Decoded {} chunks: {} tiles, {} skipped",
            summary.chunks,
            summary.tiles,
            summary.opaque
        );
        Ok(summary)
    }

    /// [`decode`](Self::decode) with a closure as the sink.
    pub fn decode_with<F>(&self, data: &[u8], mut sink: F) -> Result<DecodeSummary>
    where
        F: FnMut(&Tile<'_>) -> anyhow::Result<()>,
    {
        self.decode(data, &mut sink)
    }

    /// Decode every tile into owned storage.
    pub fn read_tiles(&self, data: &[u8]) -> Result<Vec<DecodedTile>> {
        let mut tiles = Vec::new();
        self.decode(data, &mut tiles)?;
        Ok(tiles)
    }

    /// Load a file and decode it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the same
    /// errors as [`decode`](Self::decode).
    pub fn decode_file<P, S>(&self, path: P, sink: &mut S) -> Result<DecodeSummary>
    where
        P: AsRef<Path>,
        S: TileSink + ?Sized,
    {
        let path = path.as_ref();
        tracing::info!("Decoding {}", path.display());

        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        self.decode(&buffer, sink)
    }

    /// Walk the chunk framing without inflating anything.
    ///
    /// Tile chunks report their fixed header fields; the compressed data is
    /// skipped. The checksum policy still applies.
    pub fn list_chunks(&self, data: &[u8]) -> Result<Vec<ChunkInfo>> {
        let mut cursor = ByteCursor::new(data);
        read_file_header(&mut cursor)?;

        let mut chunks = Vec::new();
        while let Some(mut chunk) = Chunk::start(&mut cursor)? {
            let kind = chunk.kind();
            let tile = if kind.is_tile() {
                Some(TileHeader::read(&mut chunk)?)
            } else {
                None
            };
            chunk.skip_remaining()?;
            let closed = chunk.finish(self.options.checksum)?;

            chunks.push(ChunkInfo {
                tag: closed.tag,
                kind,
                offset: closed.offset,
                length: closed.length,
                crc: closed.crc,
                tile,
            });
        }

        Ok(chunks)
    }
}

/// Decode `data` with default options, calling `sink` for every tile.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("stars.eph")?;
/// ephe::decode(&data, |tile| {
///     println!("order {} pixel {}: {} bytes", tile.order(), tile.pixel(), tile.data.len());
///     Ok(())
/// })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode<F>(data: &[u8], sink: F) -> Result<()>
where
    F: FnMut(&Tile<'_>) -> anyhow::Result<()>,
{
    EphDecoder::default().decode_with(data, sink).map(|_| ())
}

/// Decode every tile in `data` into owned storage, with default options.
pub fn read_tiles(data: &[u8]) -> Result<Vec<DecodedTile>> {
    EphDecoder::default().read_tiles(data)
}

/// List the chunks in `data`, with default options.
pub fn list_chunks(data: &[u8]) -> Result<Vec<ChunkInfo>> {
    EphDecoder::default().list_chunks(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: &[u8; 4], version: i32) -> Vec<u8> {
        let mut out = magic.to_vec();
        out.extend_from_slice(&version.to_le_bytes());
        out
    }

    fn opaque_chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&0u32.to_le_bytes());
        out
    }

    fn no_tiles(_: &Tile<'_>) -> anyhow::Result<()> {
        anyhow::bail!("no tile expected")
    }

    #[test]
    fn test_header_only_file() {
        let data = header(&MAGIC, FILE_VERSION);
        let summary = EphDecoder::default().decode_with(&data, no_tiles).unwrap();
        assert_eq!(summary, DecodeSummary::default());
    }

    #[test]
    fn test_bad_magic() {
        let mut data = header(b"XPHE", FILE_VERSION);
        data.extend(opaque_chunk(b"meta", b"x"));
        assert!(matches!(decode(&data, no_tiles), Err(Error::BadMagic(m)) if &m == b"XPHE"));
    }

    #[test]
    fn test_unsupported_version() {
        let data = header(&MAGIC, 3);
        assert!(matches!(
            decode(&data, no_tiles),
            Err(Error::UnsupportedVersion { version: 3 })
        ));
    }

    #[test]
    fn test_short_header_is_truncated() {
        for len in 0..FILE_HEADER_SIZE {
            let data = &header(&MAGIC, FILE_VERSION)[..len];
            assert!(matches!(decode(data, no_tiles), Err(Error::Truncated { .. })));
        }
    }

    #[test]
    fn test_opaque_chunks_skipped() {
        let mut data = header(&MAGIC, FILE_VERSION);
        data.extend(opaque_chunk(b"meta", b"catalog: hipparcos"));
        data.extend(opaque_chunk(b"\0\0\0\0", b""));

        let summary = EphDecoder::default().decode_with(&data, no_tiles).unwrap();
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.opaque, 2);
        assert_eq!(summary.tiles, 0);
    }

    #[test]
    fn test_list_opaque_chunks() {
        let mut data = header(&MAGIC, FILE_VERSION);
        data.extend(opaque_chunk(b"meta", b"abc"));

        let chunks = list_chunks(&data).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].tag, ChunkTag(*b"meta"));
        assert_eq!(chunks[0].offset, FILE_HEADER_SIZE);
        assert_eq!(chunks[0].length, 3);
        assert_eq!(chunks[0].tile, None);
    }
}
