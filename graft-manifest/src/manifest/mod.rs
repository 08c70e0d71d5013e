//! Manifest types and parsing for graft.toml files.

mod file;
mod parse;
mod validate;

use std::path::{Path, PathBuf};

pub use file::GraftToml;
use graft_core::InjectableCategory;
use indexmap::IndexMap;
use serde::Deserialize;
pub use validate::ParseContext;

/// Root manifest for graft.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Destination tree layout
    #[serde(default)]
    pub project: ProjectConfig,

    /// Types registry and dependency containers
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Files edited by feature batches
    #[serde(default)]
    pub feature: FeatureConfig,

    /// External formatter and linter
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Service API generation
    #[serde(default)]
    pub api: ApiConfig,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Destination source root, relative to graft.toml
    pub root: String,
    /// Scratch directory for staged output, relative to graft.toml
    pub staging_dir: String,
    /// Directory of template overrides, relative to graft.toml
    pub templates_dir: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            staging_dir: ".graft/staging".to_string(),
            templates_dir: None,
        }
    }
}

/// `[registry]` section. Paths are relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Name of the registration call in container files
    pub call: String,
    pub types_file: String,
    pub service: String,
    pub domain_store: String,
    pub screen_store: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            call: "register".to_string(),
            types_file: "app/Types.ts".to_string(),
            service: "app/DependencyContainer.Services.ts".to_string(),
            domain_store: "app/DependencyContainer.DomainStores.ts".to_string(),
            screen_store: "app/DependencyContainer.ScreenStores.ts".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Container file for a category.
    pub fn container(&self, category: InjectableCategory) -> &str {
        match category {
            InjectableCategory::Service => &self.service,
            InjectableCategory::DomainStore => &self.domain_store,
            InjectableCategory::ScreenStore => &self.screen_store,
        }
    }
}

/// `[feature]` section. Paths are relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    pub config_model: String,
    pub config_model_class: String,
    /// Decorators applied to every generated server config member
    pub config_decorators: Vec<String>,
    pub config_defaults: String,
    pub config_defaults_object: String,
    pub optimizations: String,
    pub warm_launch_enum: String,
    pub cold_launch_enum: String,
    /// JSON file of optimization defaults
    pub optimization_defaults: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            config_model: "config/ConfigModel.ts".to_string(),
            config_model_class: "ConfigModel".to_string(),
            config_decorators: vec!["serializable".to_string(), "observable".to_string()],
            config_defaults: "config/ConfigDefaults.ts".to_string(),
            config_defaults_object: "ConfigDefaults".to_string(),
            optimizations: "optimizations/Optimizations.ts".to_string(),
            warm_launch_enum: "WarmLaunchOptimizations".to_string(),
            cold_launch_enum: "ColdLaunchOptimizations".to_string(),
            optimization_defaults: "optimizations/OptimizationDefaults.json".to_string(),
        }
    }
}

impl FeatureConfig {
    /// Enum that receives an optimization key.
    pub fn launch_enum(&self, fetch_on_warm_launch: bool) -> &str {
        if fetch_on_warm_launch {
            &self.warm_launch_enum
        } else {
            &self.cold_launch_enum
        }
    }
}

/// `[tools]` section. An empty argv disables the tool.
///
/// The placeholder `{path}` in any argument is replaced with the file path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub format: Vec<String>,
    pub lint_fix: Vec<String>,
}

/// `[api]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Import statements added to every generated Api file
    pub imports: Vec<String>,
    /// Target services keyed by the name used in service descriptors
    pub services: IndexMap<String, ApiServiceConfig>,
}

impl ApiConfig {
    /// Expression passed to the request helper for a target service.
    ///
    /// Unconfigured services fall back to the quoted service name.
    pub fn service_expression(&self, name: &str) -> String {
        match self.services.get(name) {
            Some(service) => service.expression.clone(),
            None => format!("'{}'", name),
        }
    }

    /// Imports required by the given target services, deduplicated.
    pub fn service_imports<'a>(&'a self, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut imports: Vec<&str> = Vec::new();
        for name in names {
            if let Some(import) = self.services.get(name).and_then(|s| s.import.as_deref())
                && !imports.contains(&import)
            {
                imports.push(import);
            }
        }
        imports
    }
}

/// `[api.services.<name>]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiServiceConfig {
    pub expression: String,
    #[serde(default)]
    pub import: Option<String>,
}

impl Manifest {
    /// Destination source root for a manifest located in `base_dir`.
    pub fn project_root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project.root)
    }

    /// Staging root for a manifest located in `base_dir`.
    pub fn staging_root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project.staging_dir)
    }

    /// Template override directory, if configured.
    pub fn templates_root(&self, base_dir: &Path) -> Option<PathBuf> {
        self.project
            .templates_dir
            .as_ref()
            .map(|dir| base_dir.join(dir))
    }
}
