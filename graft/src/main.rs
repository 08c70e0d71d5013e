mod commands;
mod descriptor;
mod ops;
mod reports;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Cli;

/// Environment variable holding a tracing filter, e.g. `graft_codegen=debug`.
const LOG_ENV: &str = "GRAFT_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);
    cli.run()
}

fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
