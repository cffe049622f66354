use anyhow::Context;
use clap::{Args, Subcommand};
use ephe::{ChecksumMode, DecodeOptions};
use std::path::PathBuf;

pub mod extract;
pub mod info;
pub mod list;

/// Decoder settings shared by every command that reads tiles
#[derive(Args, Debug, Clone, Default)]
pub struct DecodeArgs {
    /// TOML file with decode options (checksum mode, max tile size)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reject chunks whose CRC does not match their payload
    #[arg(long)]
    pub strict: bool,

    /// Largest uncompressed tile accepted, in bytes
    #[arg(long)]
    pub max_tile_size: Option<usize>,
}

impl DecodeArgs {
    /// Config file first, then command-line overrides.
    pub fn to_options(&self) -> anyhow::Result<DecodeOptions> {
        let mut options = match &self.config {
            Some(path) => DecodeOptions::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DecodeOptions::default(),
        };

        if self.strict {
            options = options.with_checksum(ChecksumMode::Verify);
        }
        if let Some(size) = self.max_tile_size {
            options = options.with_max_tile_size(size);
        }

        tracing::debug!("Decode options: {:?}", options);
        Ok(options)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize an EPHE file
    Info {
        /// Source EPHE file
        #[arg(short, long)]
        source: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List the chunks of an EPHE file without decompressing
    List {
        /// Source EPHE file
        #[arg(short, long)]
        source: PathBuf,

        /// Only show chunks with this tag (e.g. "STAR")
        #[arg(long)]
        tag: Option<String>,

        /// Only print the number of matching chunks
        #[arg(long)]
        count: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Decompress every tile into a HiPS-style directory tree
    Extract {
        /// Source EPHE file
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        destination: PathBuf,

        /// Only extract tiles with this tag
        #[arg(long)]
        tag: Option<String>,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Info { source, decode } => info::execute(source, &decode.to_options()?),
            Commands::List {
                source,
                tag,
                count,
                decode,
            } => list::execute(source, tag.as_deref(), *count, &decode.to_options()?),
            Commands::Extract {
                source,
                destination,
                tag,
                decode,
            } => extract::execute(source, destination, tag.as_deref(), &decode.to_options()?),
        }
    }
}

/// Read the whole source file, with the path in the error.
pub(crate) fn read_source(source: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(source).with_context(|| format!("Failed to read {}", source.display()))
}

/// Case-sensitive tag filter; `None` matches everything.
pub(crate) fn tag_matches(filter: Option<&str>, tag: ephe::ChunkTag) -> bool {
    filter.is_none_or(|f| tag.as_bytes().as_slice() == f.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephe::ChunkTag;

    #[test]
    fn test_tag_matches() {
        let tag = ChunkTag(*b"STAR");
        assert!(tag_matches(None, tag));
        assert!(tag_matches(Some("STAR"), tag));
        assert!(!tag_matches(Some("star"), tag));
        assert!(!tag_matches(Some("STA"), tag));
    }

    #[test]
    fn test_decode_args_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("ephe.toml");
        std::fs::write(&config, "checksum = \"warn\"\nmax_tile_size = 100\n").unwrap();

        let args = DecodeArgs {
            config: Some(config),
            strict: false,
            max_tile_size: Some(200),
        };
        let options = args.to_options().unwrap();
        assert_eq!(options.checksum, ChecksumMode::Warn);
        assert_eq!(options.max_tile_size, 200);

        let strict = DecodeArgs {
            strict: true,
            ..DecodeArgs::default()
        };
        assert_eq!(strict.to_options().unwrap().checksum, ChecksumMode::Verify);
    }

    #[test]
    fn test_missing_config_is_error() {
        let args = DecodeArgs {
            config: Some(PathBuf::from("/nonexistent/ephe.toml")),
            ..DecodeArgs::default()
        };
        assert!(args.to_options().is_err());
    }
}
