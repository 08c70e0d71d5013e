use std::path::PathBuf;

use clap::Args;
use eyre::{Result, WrapErr};
use graft_manifest::GraftToml;
use tracing::info;

use super::UnwrapOrExit;
use crate::{
    descriptor::Descriptor,
    ops,
    reports::{GenerateReport, ProgressPrinter, Report, TerminalOutput},
};

#[derive(Args)]
pub struct ServiceCommand {
    /// TOML file describing the service and its API requests
    pub descriptor: PathBuf,

    /// Path to graft.toml (defaults to ./graft.toml)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,

    /// Stage the output without touching the project
    #[arg(long)]
    pub dry_run: bool,
}

impl ServiceCommand {
    pub fn run(&self) -> Result<()> {
        let graft_toml = GraftToml::open(&self.config).unwrap_or_exit();
        let project = ops::open_project(&graft_toml, self.dry_run);

        let descriptor = Descriptor::from_file(&self.descriptor)?;
        let service = descriptor
            .new_service(&project)
            .wrap_err_with(|| format!("Invalid descriptor {}", self.descriptor.display()))?;
        info!(
            name = %service.injectable.injectable.name,
            requests = service.api_requests.len(),
            "generating service"
        );

        let mut out = TerminalOutput::new();
        let mut printer = ProgressPrinter::new();
        let generation =
            project.generate_service(&service, |steps| printer.observe(steps, &mut out))?;

        let element = format!("service {}", service.injectable.injectable.name);
        GenerateReport::new(element, generation, graft_toml.base_dir(), self.dry_run)
            .render(&mut out);
        Ok(())
    }
}
