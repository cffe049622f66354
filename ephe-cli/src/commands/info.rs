//! CLI command for summarizing an EPHE file

use std::collections::BTreeMap;
use std::path::Path;

use ephe::{ChunkTag, DecodeOptions, EphDecoder};

use super::read_source;

/// Format byte size for human-readable output
fn format_size(bytes: usize) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

pub fn execute(source: &Path, options: &DecodeOptions) -> anyhow::Result<()> {
    let data = read_source(source)?;

    let mut per_order: BTreeMap<u8, usize> = BTreeMap::new();
    let mut per_tag: BTreeMap<ChunkTag, usize> = BTreeMap::new();

    let summary = EphDecoder::new(*options).decode_with(&data, |tile| {
        *per_order.entry(tile.order()).or_default() += 1;
        *per_tag.entry(tile.tag).or_default() += 1;
        Ok(())
    })?;

    println!("File:      {}", source.display());
    println!("Format:    EPHE v{}", ephe::FILE_VERSION);
    println!("Size:      {}", format_size(data.len()));
    println!("Chunks:    {}", summary.chunks);
    println!("Tiles:     {}", summary.tiles);
    println!("Skipped:   {}", summary.opaque);
    println!(
        "Payload:   {} compressed, {} uncompressed",
        format_size(summary.compressed_bytes),
        format_size(summary.uncompressed_bytes)
    );

    if !per_tag.is_empty() {
        println!("\nTiles by tag:");
        for (tag, count) in &per_tag {
            println!("  {tag}  {count}");
        }
    }

    if !per_order.is_empty() {
        println!("\nTiles by order:");
        for (order, count) in &per_order {
            println!("  Norder{order:<3} {count}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12");
        assert_eq!(format_size(2048), "2.0K");
        assert_eq!(format_size(3 * 1_048_576), "3.0M");
    }
}
