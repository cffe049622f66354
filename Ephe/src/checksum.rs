//! Chunk checksum policy
//!
//! Every chunk ends with a 32-bit CRC field. Historically the field was
//! written but never validated by readers, and files exist in the wild whose
//! stored value is not a real checksum, so the default policy is to read and
//! discard it. Producers that do write CRC-32 (zlib polynomial) over the
//! chunk payload can opt into [`ChecksumMode::Verify`].

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkTag;
use crate::error::{Error, Result};

/// How the trailing chunk CRC is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumMode {
    /// Read the field and discard it.
    #[default]
    Ignore,
    /// Compute the CRC and log mismatches, but keep decoding.
    Warn,
    /// Reject the file on the first mismatch. Tile zlib streams must also
    /// end exactly at their declared compressed size.
    Verify,
}

impl ChecksumMode {
    /// Whether this mode needs the payload CRC computed at all.
    pub fn computes(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// CRC-32 of a chunk payload, as stored by checksum-aware producers.
pub fn crc32(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}

/// Apply `mode` to a closed chunk's payload and stored CRC.
pub(crate) fn check(mode: ChecksumMode, tag: ChunkTag, payload: &[u8], stored: u32) -> Result<()> {
    if !mode.computes() {
        return Ok(());
    }

    let actual = crc32(payload);
    if actual == stored {
        return Ok(());
    }

    if mode == ChecksumMode::Verify {
        return Err(Error::ChecksumMismatch {
            tag,
            expected: stored,
            actual,
        });
    }

    tracing::warn!(
        "Checksum mismatch in chunk {}: stored {:#010x}, computed {:#010x}",
        tag,
        stored,
        actual
    );
    Ok(())
}
