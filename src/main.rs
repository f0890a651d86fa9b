use clap::Parser;
use dashstore::cli::{self, Cli};
use eyre::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli::resolve_config(&cli)?;

    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(cli::log_level(cli.verbose, &config)?)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli, &config)
}
