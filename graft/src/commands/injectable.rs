use std::path::PathBuf;

use clap::Args;
use eyre::{Result, WrapErr};
use graft_codegen::ProgressStep;
use graft_core::InjectableCategory;
use graft_manifest::GraftToml;
use tracing::info;

use super::UnwrapOrExit;
use crate::{
    descriptor::Descriptor,
    ops,
    reports::{GenerateReport, ProgressPrinter, Report, TerminalOutput},
};

#[derive(Args)]
pub struct InjectableCommand {
    /// Category of the new element: service, domain-store or screen-store
    pub category: InjectableCategory,

    /// TOML file describing the element
    pub descriptor: PathBuf,

    /// Path to graft.toml (defaults to ./graft.toml)
    #[arg(short, long, default_value = "graft.toml")]
    pub config: PathBuf,

    /// Stage the output without touching the project
    #[arg(long)]
    pub dry_run: bool,
}

impl InjectableCommand {
    pub fn run(&self) -> Result<()> {
        let graft_toml = GraftToml::open(&self.config).unwrap_or_exit();
        let project = ops::open_project(&graft_toml, self.dry_run);

        let descriptor = Descriptor::from_file(&self.descriptor)?;
        let invalid = || format!("Invalid descriptor {}", self.descriptor.display());

        let mut out = TerminalOutput::new();
        let mut printer = ProgressPrinter::new();
        let observer = |steps: &[ProgressStep]| printer.observe(steps, &mut out);

        // A service descriptor may still carry API requests.
        let (name, generation) = if self.category == InjectableCategory::Service {
            let service = descriptor.new_service(&project).wrap_err_with(invalid)?;
            info!(
                name = %service.injectable.injectable.name,
                category = %self.category,
                "generating"
            );
            let generation = project.generate_service(&service, observer)?;
            (service.injectable.injectable.name, generation)
        } else {
            let item = descriptor
                .new_injectable(self.category, &project)
                .wrap_err_with(invalid)?;
            info!(
                name = %item.injectable.name,
                category = %self.category,
                "generating"
            );
            let generation = project.generate_injectable(self.category, &item, observer)?;
            (item.injectable.name, generation)
        };

        let element = format!("{} {name}", self.category.label().to_lowercase());
        GenerateReport::new(element, generation, graft_toml.base_dir(), self.dry_run)
            .render(&mut out);
        Ok(())
    }
}
