//! Tile payload decompression

use std::io::Read;

use flate2::bufread::ZlibDecoder;

use crate::error::{Error, Result};

/// Inflate a zlib stream that must expand to exactly `expected_size` bytes.
///
/// Output is capped at one byte past the expected size, so a payload that
/// lies about its size cannot make this allocate more than the caller
/// already agreed to. Bytes after the end of the zlib stream are ignored;
/// use [`inflate_strict`] to reject them.
pub fn inflate(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let (decompressed, trailing) = inflate_stream(compressed, expected_size)?;
    if trailing > 0 {
        tracing::debug!("Ignoring {} bytes after end of Zlib stream", trailing);
    }
    Ok(decompressed)
}

/// [`inflate`], but the zlib stream must also fill `compressed` exactly.
pub fn inflate_strict(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let (decompressed, trailing) = inflate_stream(compressed, expected_size)?;
    if trailing > 0 {
        return Err(Error::DecompressionFailed {
            message: format!("{trailing} trailing bytes after end of Zlib stream"),
        });
    }
    Ok(decompressed)
}

/// Inflate and report how many input bytes the stream left unread.
fn inflate_stream(compressed: &[u8], expected_size: usize) -> Result<(Vec<u8>, usize)> {
    let limit = (expected_size as u64).saturating_add(1);
    let mut decoder = ZlibDecoder::new(compressed).take(limit);
    let mut decompressed = Vec::with_capacity(expected_size);

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::DecompressionFailed {
            message: format!("Failed to decompress Zlib data: {e}"),
        })?;

    if decompressed.len() != expected_size {
        return Err(Error::DecompressionFailed {
            message: format!(
                "size mismatch: expected {expected_size} bytes, stream produced {}{}",
                decompressed.len(),
                if decompressed.len() > expected_size { "+" } else { "" }
            ),
        });
    }

    let trailing = decoder.into_inner().into_inner().len();
    Ok((decompressed, trailing))
}
