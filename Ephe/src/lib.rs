//! # ephe
//!
//! A pure-Rust decoder for EPHE containers: flat sequences of chunks carrying
//! zlib-compressed, HEALPix-indexed data tiles (star catalog fragments and
//! similar sky data) for a rendering engine.
//!
//! The decoder works on an in-memory buffer, never panics on malformed input
//! and hands each tile to the caller as a borrowed slice.
//!
//! ## Quick Start
//!
//! ```no_run
//! let data = std::fs::read("stars.eph")?;
//!
//! ephe::decode(&data, |tile| {
//!     println!("{} order={} pixel={} {} bytes",
//!         tile.tag, tile.order(), tile.pixel(), tile.data.len());
//!     Ok(())
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Strict checksums
//!
//! Chunk CRCs are ignored by default, as older writers did not fill them in.
//!
//! ```no_run
//! use ephe::prelude::*;
//!
//! let data = std::fs::read("stars.eph")?;
//! let tiles = EphDecoder::new(DecodeOptions::strict()).read_tiles(&data)?;
//! # Ok::<(), ephe::Error>(())
//! ```

pub mod checksum;
pub mod chunk;
pub mod compression;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod healpix;
pub mod options;
pub mod tile;

// Re-exports for convenience
pub use checksum::ChecksumMode;
pub use chunk::{ChunkKind, ChunkTag};
pub use decoder::{
    ChunkInfo, DecodeSummary, EphDecoder, FILE_VERSION, MAGIC, TileSink, decode, list_chunks,
    read_tiles,
};
pub use error::{Error, Result};
pub use healpix::HealpixIndex;
pub use options::DecodeOptions;
pub use tile::{DecodedTile, Tile, TileHeader};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::checksum::ChecksumMode;
    pub use crate::chunk::{ChunkKind, ChunkTag};
    pub use crate::decoder::{ChunkInfo, DecodeSummary, EphDecoder, TileSink};
    pub use crate::error::{Error, Result};
    pub use crate::healpix::HealpixIndex;
    pub use crate::options::DecodeOptions;
    pub use crate::tile::{DecodedTile, Tile};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
