use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use graft_manifest::GraftToml;
use tracing::info;

use super::UnwrapOrExit;
use crate::{
    descriptor::load_feature,
    ops,
    reports::{GenerateReport, ProgressPrinter, Report, TerminalOutput},
};

#[derive(Args)]
pub struct FeatureCommand {
    /// TOML file listing the feature's configs and optimizations
    pub descriptor: PathBuf,

    /// Path to graft.toml (defaults to ./graft.toml)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,

    /// Stage the output without touching the project
    #[arg(long)]
    pub dry_run: bool,
}

impl FeatureCommand {
    pub fn run(&self) -> Result<()> {
        let graft_toml = GraftToml::open(&self.config).unwrap_or_exit();
        let project = ops::open_project(&graft_toml, self.dry_run);

        let feature = load_feature(&self.descriptor)?;
        info!(
            name = %feature.name,
            configs = feature.configs.len(),
            optimizations = feature.optimizations.len(),
            "generating feature"
        );

        let mut out = TerminalOutput::new();
        let mut printer = ProgressPrinter::new();
        let generation =
            project.generate_feature(&feature, |steps| printer.observe(steps, &mut out))?;

        let element = format!("feature {}", feature.name);
        GenerateReport::new(element, generation, graft_toml.base_dir(), self.dry_run)
            .render(&mut out);
        Ok(())
    }
}
