//! CLI command for listing EPHE chunks

use std::path::Path;

use ephe::{ChunkInfo, DecodeOptions, EphDecoder};

use super::{read_source, tag_matches};

fn describe(chunk: &ChunkInfo) -> String {
    let prefix = format!(
        "{:>10}  {}  {:>9}  crc={:08x}",
        chunk.offset, chunk.tag, chunk.length, chunk.crc
    );
    match chunk.tile {
        Some(tile) => format!(
            "{prefix}  tile v{} order={} pixel={} {} -> {} bytes",
            tile.version,
            tile.index.order,
            tile.index.pixel,
            tile.compressed_size,
            tile.uncompressed_size
        ),
        None => format!("{prefix}  (skipped)"),
    }
}

pub fn execute(
    source: &Path,
    tag: Option<&str>,
    count: bool,
    options: &DecodeOptions,
) -> anyhow::Result<()> {
    let data = read_source(source)?;
    let chunks = EphDecoder::new(*options).list_chunks(&data)?;

    let filtered: Vec<_> = chunks
        .iter()
        .filter(|c| tag_matches(tag, c.tag))
        .collect();

    if count {
        println!("{}", filtered.len());
        return Ok(());
    }

    println!("{:>10}  TAG   {:>9}  CRC", "OFFSET", "LENGTH");
    for chunk in &filtered {
        println!("{}", describe(chunk));
    }
    println!("\n{} of {} chunks", filtered.len(), chunks.len());

    Ok(())
}
