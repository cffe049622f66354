//! CLI command for extracting tiles to disk
//!
//! Tiles land in a HiPS-style tree: `<TAG>/Norder<o>/Dir<d>/Npix<p>.bin`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ephe::{DecodeOptions, EphDecoder, Tile};

use super::{read_source, tag_matches};

/// Tag as a safe directory name.
fn tag_dir(tile: &Tile<'_>) -> String {
    tile.tag
        .as_bytes()
        .iter()
        .map(|&b| if b.is_ascii_alphanumeric() { b as char } else { '_' })
        .collect()
}

/// Output path for one tile.
pub fn tile_path(destination: &Path, tile: &Tile<'_>) -> PathBuf {
    destination
        .join(tag_dir(tile))
        .join(format!("Norder{}", tile.order()))
        .join(format!("Dir{}", tile.index.hips_dir()))
        .join(format!("Npix{}.bin", tile.pixel()))
}

pub fn execute(
    source: &Path,
    destination: &Path,
    tag: Option<&str>,
    options: &DecodeOptions,
) -> anyhow::Result<()> {
    println!("Extracting {} to {}", source.display(), destination.display());

    let data = read_source(source)?;
    let mut written = 0usize;

    let summary = EphDecoder::new(*options).decode_with(&data, |tile| {
        if !tag_matches(tag, tile.tag) {
            return Ok(());
        }

        let path = tile_path(destination, tile);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, tile.data)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), tile.data.len());
        written += 1;
        Ok(())
    })?;

    println!("✓ Extracted {written} of {} tiles", summary.tiles);
    Ok(())
}
