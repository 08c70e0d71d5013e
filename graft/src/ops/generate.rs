//! Project setup shared by the generating commands.

use std::sync::Arc;

use graft_codegen::CommandTools;
use graft_manifest::GraftToml;
use graft_typescript::Project;
use tracing::debug;

/// Open the destination project with the tools configured in graft.toml.
///
/// Tool commands run from the directory holding graft.toml.
pub fn open_project(graft_toml: &GraftToml, dry_run: bool) -> Project {
    let tools = &graft_toml.manifest().tools;
    debug!(format = ?tools.format, lint_fix = ?tools.lint_fix, "configuring source tools");
    let tools = CommandTools::new(tools.format.clone(), tools.lint_fix.clone())
        .current_dir(graft_toml.base_dir());
    Project::from_toml(graft_toml, Arc::new(tools)).dry_run(dry_run)
}
