use clap::Parser;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "ephe")]
#[command(about = "Inspect and extract EPHE HEALPix tile containers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
