//! Decode options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! checksum = "verify"      # "ignore" (default), "warn" or "verify"
//! max_tile_size = 1048576  # bytes
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumMode;
use crate::error::Result;

/// Default cap on a single tile's uncompressed size (64 MiB).
pub const DEFAULT_MAX_TILE_SIZE: usize = 64 << 20;

/// Options controlling how an EPHE buffer is decoded.
///
/// # Example
///
/// ```
/// use ephe::{ChecksumMode, DecodeOptions};
///
/// let options = DecodeOptions::new()
///     .with_checksum(ChecksumMode::Verify)
///     .with_max_tile_size(1 << 20);
/// assert_eq!(options.max_tile_size, 1 << 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Treatment of the trailing chunk CRC.
    pub checksum: ChecksumMode,

    /// Largest uncompressed tile size accepted, in bytes.
    /// Tiles declaring more are rejected before anything is allocated.
    pub max_tile_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            checksum: ChecksumMode::Ignore,
            max_tile_size: DEFAULT_MAX_TILE_SIZE,
        }
    }
}

impl DecodeOptions {
    /// Options matching the historical reader: CRCs ignored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reject any chunk whose CRC does not match, and any tile
    /// with bytes after its zlib stream.
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_checksum(ChecksumMode::Verify)
    }

    /// Set the checksum policy.
    #[must_use]
    pub fn with_checksum(mut self, checksum: ChecksumMode) -> Self {
        self.checksum = checksum;
        self
    }

    /// Set the uncompressed tile size limit.
    #[must_use]
    pub fn with_max_tile_size(mut self, max_tile_size: usize) -> Self {
        self.max_tile_size = max_tile_size;
        self
    }

    /// Parse options from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the text is not
    /// valid TOML or contains unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
