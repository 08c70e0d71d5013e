mod check;
mod completions;
mod feature;
mod injectable;
mod list;
mod service;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use feature::FeatureCommand;
use injectable::InjectableCommand;
use list::ListCommand;
use service::ServiceCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for graft_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "graft")]
#[command(version)]
#[command(about = "Scaffold services, stores and feature flags into a TypeScript project")]
pub(crate) struct Cli {
    /// Log more (-v for info, -vv for debug). GRAFT_LOG overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(cmd) => cmd.run(),
            Commands::List(cmd) => cmd.run(),
            Commands::Injectable(cmd) => cmd.run(),
            Commands::Service(cmd) => cmd.run(),
            Commands::Feature(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate graft.toml and the files it points at
    Check(CheckCommand),

    /// List the registrations of a category
    List(ListCommand),

    /// Generate a domain store, screen store or plain service
    Injectable(InjectableCommand),

    /// Generate a service with API calls
    Service(ServiceCommand),

    /// Add the server configs and optimizations of a feature
    Feature(FeatureCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
