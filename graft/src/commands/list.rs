use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use graft_core::InjectableCategory;
use graft_manifest::GraftToml;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ListCommand {
    /// Category to list: service, domain-store or screen-store
    pub category: InjectableCategory,

    /// Path to graft.toml (defaults to ./graft.toml)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,
}

impl ListCommand {
    pub fn run(&self) -> Result<()> {
        let graft_toml = GraftToml::open(&self.config).unwrap_or_exit();
        let project = ops::open_project(&graft_toml, true);

        let report = ops::list(&project, self.category)?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
