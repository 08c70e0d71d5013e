//! Check operation - manifest and project validation.

use graft_core::InjectableCategory;
use graft_manifest::GraftToml;
use graft_typescript::Project;

use crate::reports::{CheckReport, ProjectFile};

/// Execute the check operation.
///
/// Looks for every file the manifest names and reads each dependency
/// container. An unreadable container is an error, a missing feature file
/// only a warning since features are optional.
pub fn check(graft_toml: &GraftToml, project: &Project) -> CheckReport {
    let manifest = graft_toml.manifest();
    let registry = &manifest.registry;
    let feature = &manifest.feature;

    let files = [
        ("registry.types_file", &registry.types_file),
        ("registry.service", &registry.service),
        ("registry.domain_store", &registry.domain_store),
        ("registry.screen_store", &registry.screen_store),
        ("feature.config_model", &feature.config_model),
        ("feature.config_defaults", &feature.config_defaults),
        ("feature.optimizations", &feature.optimizations),
        ("feature.optimization_defaults", &feature.optimization_defaults),
    ]
    .into_iter()
    .map(|(key, relative)| {
        let path = project.root().join(relative);
        ProjectFile {
            key,
            exists: path.is_file(),
            path,
        }
    })
    .collect();

    let mut errors = Vec::new();
    if !project.root().is_dir() {
        errors.push(format!(
            "project root {} is not a directory",
            project.root().display()
        ));
    }

    let mut registrations = Vec::new();
    for category in InjectableCategory::ALL {
        match project.available_injectables(category) {
            Ok(injectables) => registrations.push((category.label(), injectables.len())),
            Err(err) => errors.push(format!("{err:#}")),
        }
    }

    CheckReport {
        config_path: graft_toml.path().to_path_buf(),
        project_root: project.root().to_path_buf(),
        files,
        registrations,
        errors,
    }
}
