//! Hand-assembled EPHE fixtures for integration tests.

#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn nuniq(order: u8, pixel: u64) -> u64 {
    4 * 4u64.pow(u32::from(order)) + pixel
}

/// Raw tile payload with an explicit declared uncompressed size.
pub fn tile_payload(version: i32, nuniq: u64, declared_size: i32, data: &[u8]) -> Vec<u8> {
    let compressed = zlib(data);
    let mut payload = Vec::new();
    payload.extend_from_slice(&version.to_le_bytes());
    payload.extend_from_slice(&nuniq.to_le_bytes());
    payload.extend_from_slice(&declared_size.to_le_bytes());
    payload.extend_from_slice(&(compressed.len() as i32).to_le_bytes());
    payload.extend_from_slice(&compressed);
    payload
}

/// Builds EPHE files chunk by chunk.
pub struct FileBuilder {
    bytes: Vec<u8>,
    /// Offset just past each chunk's CRC.
    boundaries: Vec<usize>,
    write_crc: bool,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self::with_header(b"EPHE", 2)
    }

    pub fn with_header(magic: &[u8; 4], version: i32) -> Self {
        let mut bytes = magic.to_vec();
        bytes.extend_from_slice(&version.to_le_bytes());
        let boundaries = vec![bytes.len()];
        Self {
            bytes,
            boundaries,
            write_crc: false,
        }
    }

    /// Store real CRC-32 values instead of zero.
    pub fn with_crc(mut self) -> Self {
        self.write_crc = true;
        self
    }

    pub fn chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> Self {
        let crc = if self.write_crc {
            crc32fast::hash(payload)
        } else {
            0
        };
        self.bytes.extend_from_slice(tag);
        self.bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self.bytes.extend_from_slice(&crc.to_le_bytes());
        self.boundaries.push(self.bytes.len());
        self
    }

    pub fn tile(self, tag: &[u8; 4], order: u8, pixel: u64, data: &[u8]) -> Self {
        let payload = tile_payload(1, nuniq(order, pixel), data.len() as i32, data);
        self.chunk(tag, &payload)
    }

    /// Offsets where the file can end and still be valid.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
