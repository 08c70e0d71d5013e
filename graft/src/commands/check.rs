use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use graft_manifest::GraftToml;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to graft.toml (defaults to ./graft.toml)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let graft_toml = GraftToml::open(&self.config).unwrap_or_exit();
        let project = ops::open_project(&graft_toml, true);

        let report = ops::check(&graft_toml, &project);
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
