//! Generation runs over a destination project.
//!
//! Each public operation builds a list of steps, runs them through a
//! [`StepRunner`] and commits the staged output in a final step. Nothing in
//! the destination tree changes until that last step runs.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use eyre::{Result, WrapErr, bail, eyre};
use graft_codegen::{
    ProgressStep, Session, SourceTools, Stager, StepRunner, TokenMap, expand_each, substitute,
    token_map, update_json,
};
use graft_core::{
    ApiRequestSpec, Feature, HttpVerb, Injectable, InjectableCategory, NewInjectable, NewService,
};
use graft_manifest::{ApiConfig, GraftToml, Manifest};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    editor::{MemberValue, insert_class_member, insert_enum_member, insert_object_member},
    interface::interface_from_json_str,
    registrations::{extract_registrations_from_file, insert_registration},
    templates::{self, Templates},
};

const FINALIZE_STEP: &str = "Copying and finalizing output";

/// Outcome of a successful generation.
#[derive(Debug, Default)]
pub struct Generation {
    pub steps: Vec<ProgressStep>,
    /// Destinations written, in commit order. Empty for a dry run.
    pub committed: Vec<PathBuf>,
    /// `(destination, staged file)` pairs a dry run left uncommitted.
    pub staged: Vec<(PathBuf, PathBuf)>,
}

/// State shared by the steps of one run.
struct Run {
    session: Session,
    committed: Vec<PathBuf>,
}

/// A destination project and everything needed to generate into it.
pub struct Project {
    manifest: Manifest,
    root: PathBuf,
    staging_root: PathBuf,
    templates: Templates,
    tools: Arc<dyn SourceTools>,
    dry_run: bool,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("staging_root", &self.staging_root)
            .field("templates", &self.templates)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Paths in `manifest` are resolved against `base_dir`.
    pub fn new(manifest: Manifest, base_dir: &Path, tools: Arc<dyn SourceTools>) -> Self {
        Self {
            root: manifest.project_root(base_dir),
            staging_root: manifest.staging_root(base_dir),
            templates: Templates::new(manifest.templates_root(base_dir)),
            manifest,
            tools,
            dry_run: false,
        }
    }

    pub fn from_toml(graft_toml: &GraftToml, tools: Arc<dyn SourceTools>) -> Self {
        Self::new(graft_toml.manifest().clone(), graft_toml.base_dir(), tools)
    }

    /// Stop before the finalize step and report the staged files instead.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Registrations found in the container of `category`, sorted by key.
    pub fn available_injectables(&self, category: InjectableCategory) -> Result<Vec<Injectable>> {
        let path = self.root.join(self.manifest.registry.container(category));
        let (injectables, _) = extract_registrations_from_file(&path, &self.manifest.registry.call)
            .wrap_err_with(|| {
                format!("Error reading {} registrations", category.label().to_lowercase())
            })?;
        Ok(injectables)
    }

    /// Look up registration keys across every container.
    pub fn resolve_dependencies(&self, keys: &[String]) -> Result<Vec<Injectable>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut available = Vec::new();
        for category in InjectableCategory::ALL {
            available.extend(self.available_injectables(category)?);
        }
        keys.iter()
            .map(|key| {
                available
                    .iter()
                    .find(|injectable| &injectable.registration_key == key)
                    .cloned()
                    .ok_or_else(|| eyre!("no registration found for '{key}'"))
            })
            .collect()
    }

    /// Add a domain store, screen store or service without API calls.
    pub fn generate_injectable(
        &self,
        category: InjectableCategory,
        item: &NewInjectable,
        observer: impl FnMut(&[ProgressStep]),
    ) -> Result<Generation> {
        if category == InjectableCategory::Service {
            return self.generate_service(&NewService::new(item.clone()), observer);
        }
        let steps = self.injectable_steps(category, item, None);
        self.execute(steps, observer).wrap_err_with(|| {
            format!(
                "Error generating {} {}",
                category.label().to_lowercase(),
                item.injectable.name
            )
        })
    }

    /// Add a service together with its API calls and their interfaces.
    pub fn generate_service(
        &self,
        service: &NewService,
        observer: impl FnMut(&[ProgressStep]),
    ) -> Result<Generation> {
        let category = InjectableCategory::Service;
        let steps = self.injectable_steps(category, &service.injectable, Some(service));
        let steps = steps.step_if(
            !service.api_requests.is_empty(),
            format!("Writing Api file for {}", api_file_path(service)),
            move |run: &mut Run| self.write_api_file(run, service),
        );
        self.execute(steps, observer).wrap_err_with(|| {
            format!(
                "Error generating {} {}",
                category.label().to_lowercase(),
                service.injectable.injectable.name
            )
        })
    }

    /// Add the configs and optimizations of a feature batch.
    pub fn generate_feature(
        &self,
        feature: &Feature,
        observer: impl FnMut(&[ProgressStep]),
    ) -> Result<Generation> {
        let config = &self.manifest.feature;
        let has_optimizations = !feature.optimizations.is_empty();
        let has_configs = !feature.configs.is_empty();

        let steps = StepRunner::new()
            .step_if(has_optimizations, "Updating Optimizations", move |run: &mut Run| {
                let path = run.session.resolve(&config.optimizations);
                let mut source = run.session.read(&path)?;
                for optimization in &feature.optimizations {
                    source = insert_enum_member(
                        &source,
                        config.launch_enum(optimization.fetch_on_warm_launch),
                        &optimization.key,
                        &optimization.name,
                        true,
                    )?;
                }
                run.session.stage(&path, &source)
            })
            .step_if(has_optimizations, "Updating Optimization Defaults", move |run: &mut Run| {
                let path = run.session.resolve(&config.optimization_defaults);
                let mut source = run.session.read(&path)?;
                for optimization in &feature.optimizations {
                    let value = json!({
                        "experiment": optimization.name,
                        "variables": optimization.variables,
                    });
                    source = update_json(&source, &optimization.name, value)?;
                }
                run.session.stage(&path, &source)
            })
            .step_if(has_configs, "Updating Server Configs", move |run: &mut Run| {
                let path = run.session.resolve(&config.config_model);
                let mut source = run.session.read(&path)?;
                for server_config in &feature.configs {
                    source = insert_class_member(
                        &source,
                        &config.config_model_class,
                        &server_config.name,
                        &server_config.default_value,
                        &config.config_decorators,
                    )?;
                }
                run.session.stage(&path, &source)
            })
            .step_if(has_configs, "Updating Server Config Defaults", move |run: &mut Run| {
                let path = run.session.resolve(&config.config_defaults);
                let mut source = run.session.read(&path)?;
                for server_config in &feature.configs {
                    source = insert_object_member(
                        &source,
                        &config.config_defaults_object,
                        &server_config.name,
                        MemberValue::Json(server_config.default_value.clone()),
                    )?;
                }
                run.session.stage(&path, &source)
            });

        self.execute(steps, observer)
            .wrap_err_with(|| format!("Error generating feature {}", feature.name))
    }

    fn injectable_steps<'a>(
        &'a self,
        category: InjectableCategory,
        item: &'a NewInjectable,
        service: Option<&'a NewService>,
    ) -> StepRunner<'a, Run> {
        let injectable = &item.injectable;
        let key = &injectable.registration_key;

        StepRunner::new()
            .step(format!("Adding {key} to App Types"), move |run: &mut Run| {
                self.add_to_types(run, injectable)
            })
            .step(format!("Adding {key} to Dependency Container"), move |run: &mut Run| {
                self.add_to_container(run, category, injectable)
            })
            .step(
                format!("Writing class file for {}.ts", injectable.module_path),
                move |run: &mut Run| self.write_class_file(run, category, item, service),
            )
    }

    fn execute(
        &self,
        steps: StepRunner<'_, Run>,
        observer: impl FnMut(&[ProgressStep]),
    ) -> Result<Generation> {
        let steps = steps.step_if(!self.dry_run, FINALIZE_STEP, |run: &mut Run| {
            run.committed = run.session.finalize()?;
            Ok(())
        });

        let stager = Stager::new(&self.root, &self.staging_root, Arc::clone(&self.tools));
        let mut run = Run {
            session: Session::new(stager),
            committed: Vec::new(),
        };
        let steps = steps.run(&mut run, observer)?;

        let staged: Vec<_> = run
            .session
            .pending()
            .map(|action| (action.destination().to_path_buf(), action.staged().to_path_buf()))
            .collect();
        if self.dry_run {
            info!(files = staged.len(), "dry run, nothing committed");
        } else {
            info!(files = run.committed.len(), "generation committed");
        }
        Ok(Generation {
            steps,
            committed: run.committed,
            staged,
        })
    }

    fn add_to_types(&self, run: &mut Run, injectable: &Injectable) -> Result<()> {
        let (object, member) = injectable.registry_parts().ok_or_else(|| {
            eyre!(
                "registration key '{}' has no registry object, expected `Types.Name`",
                injectable.registration_key
            )
        })?;
        let path = run.session.resolve(&self.manifest.registry.types_file);
        let source = run.session.read(&path)?;
        let value = MemberValue::Expr(format!("Symbol.for('{member}')"));
        let updated = insert_object_member(&source, object, member, value)?;
        run.session.stage(&path, &updated)
    }

    fn add_to_container(
        &self,
        run: &mut Run,
        category: InjectableCategory,
        injectable: &Injectable,
    ) -> Result<()> {
        let path = run.session.resolve(self.manifest.registry.container(category));
        let source = run.session.read(&path)?;
        let updated = insert_registration(&source, &self.manifest.registry.call, injectable)?;
        run.session.stage(&path, &updated)
    }

    fn write_class_file(
        &self,
        run: &mut Run,
        category: InjectableCategory,
        item: &NewInjectable,
        service: Option<&NewService>,
    ) -> Result<()> {
        let path = run
            .session
            .resolve(format!("{}.ts", item.injectable.module_path));
        if path.exists() {
            bail!("{} already exists", path.display());
        }

        let template = self.templates.get(templates::class_file(category))?;
        let mut tokens = self.class_tokens(item)?;
        if let Some(service) = service {
            tokens.extend(self.api_tokens(service)?);
        }
        run.session.stage(&path, &render(&template, &tokens))
    }

    fn write_api_file(&self, run: &mut Run, service: &NewService) -> Result<()> {
        let path = run.session.resolve(api_file_path(service));
        if path.exists() {
            bail!("{} already exists", path.display());
        }

        let template = self.templates.snippet(templates::SERVICE_API_FILE)?;
        let mut sections = Vec::with_capacity(service.api_requests.len());
        for request in &service.api_requests {
            let tokens = token_map([
                (
                    "__REQUEST_INTERFACE__",
                    interface_from_json_str(
                        &request.request_interface_name,
                        &request.request_schema_json,
                    )?,
                ),
                (
                    "__RESPONSE_INTERFACE__",
                    interface_from_json_str(
                        &request.response_interface_name,
                        &request.response_schema_json,
                    )?,
                ),
            ]);
            sections.push(substitute(&template, &tokens).trim_end().to_string());
        }
        let mut content = sections.join("\n\n");
        content.push('\n');
        run.session.stage(&path, &content)
    }

    fn class_tokens(&self, item: &NewInjectable) -> Result<TokenMap> {
        let mut tokens = injectable_tokens(&item.injectable);
        tokens.insert(
            "__TYPES_MODULE__".into(),
            types_module(&self.manifest.registry.types_file).to_string(),
        );
        tokens.insert("__REGISTRY_OBJECTS__".into(), registry_objects(item));

        for (token, snippet) in [
            ("__DEPENDENCY_MEMBERS__", templates::DEPENDENCY_MEMBER),
            ("__CONSTRUCTOR_INJECTION__", templates::CONSTRUCTOR_INJECTION),
            ("__DEPENDENCY_IMPORTS__", templates::IMPORT_DEPENDENCY),
            (
                "__CONSTRUCTOR_MEMBER_ASSIGNMENTS__",
                templates::CONSTRUCTOR_MEMBER_ASSIGNMENT,
            ),
        ] {
            let snippet = self.templates.snippet(snippet)?;
            tokens.insert(
                token.into(),
                expand_each(&snippet, &item.dependencies, injectable_tokens),
            );
        }
        Ok(tokens)
    }

    fn api_tokens(&self, service: &NewService) -> Result<TokenMap> {
        let api = &self.manifest.api;
        let api_filename = service.api_filename();
        let tokens_for = |request: &&ApiRequestSpec| request_tokens(request, &api_filename, api);
        let requests: Vec<&ApiRequestSpec> = service.api_requests.iter().collect();

        let mut imports = Vec::new();
        if !requests.is_empty() {
            let snippet = self.templates.snippet(templates::IMPORT_REQUEST_RESPONSE)?;
            imports.push(expand_each(&snippet, &requests, tokens_for));
            imports.extend(api.imports.iter().cloned());
            let services = requests.iter().map(|r| r.target_service.as_str());
            imports.extend(api.service_imports(services).into_iter().map(String::from));
        }
        let mut tokens = token_map([("__API_IMPORTS__", imports.join("\n"))]);

        for verb in HttpVerb::ALL {
            let (token, snippet) = match verb {
                HttpVerb::Get => ("__GET_API_CALLS__", templates::GET_REQUEST),
                HttpVerb::Post => ("__POST_API_CALLS__", templates::POST_REQUEST),
                HttpVerb::Put => ("__PUT_API_CALLS__", templates::PUT_REQUEST),
                HttpVerb::Delete => ("__DELETE_API_CALLS__", templates::DELETE_REQUEST),
            };
            let calls: Vec<&ApiRequestSpec> = service.requests_with(verb).collect();
            let snippet = self.templates.snippet(snippet)?;
            tokens.insert(token.into(), expand_each(&snippet, &calls, tokens_for));
        }
        Ok(tokens)
    }
}

/// Substitute `tokens`, dropping template lines that hold nothing but a
/// token whose value is empty.
fn render(template: &str, tokens: &TokenMap) -> String {
    let template: String = template
        .split_inclusive('\n')
        .filter(|line| !tokens.get(line.trim()).is_some_and(|value| value.is_empty()))
        .collect();
    substitute(&template, tokens)
}

fn injectable_tokens(injectable: &Injectable) -> TokenMap {
    token_map([
        ("__NAME__", injectable.name.clone()),
        ("__INTERFACE_NAME__", injectable.interface_name.clone()),
        ("__REGISTRATION_KEY__", injectable.registration_key.clone()),
        ("__CAMEL_CASE_NAME__", injectable.camel_case_name()),
        ("__MODULE_PATH__", injectable.module_path.clone()),
    ])
}

fn request_tokens(request: &ApiRequestSpec, api_filename: &str, api: &ApiConfig) -> TokenMap {
    token_map([
        ("__FUNCTION_NAME__", request.function_name.clone()),
        ("__REQUEST_INTERFACE_NAME__", request.request_interface_name.clone()),
        ("__RESPONSE_INTERFACE_NAME__", request.response_interface_name.clone()),
        ("__API_FILENAME__", api_filename.to_string()),
        ("__METHOD__", request.method.clone()),
        ("__RETRY_POLICY__", request.retry_policy.as_str().to_string()),
        ("__SERVICE__", api.service_expression(&request.target_service)),
    ])
}

/// Import specifier of the types file.
fn types_module(types_file: &str) -> &str {
    types_file.strip_suffix(".ts").unwrap_or(types_file)
}

/// Registry objects the class file references, sorted and deduplicated.
fn registry_objects(item: &NewInjectable) -> String {
    let mut objects: Vec<&str> = std::iter::once(&item.injectable)
        .chain(&item.dependencies)
        .filter_map(|injectable| injectable.registry_parts().map(|(object, _)| object))
        .collect();
    objects.sort_unstable();
    objects.dedup();
    debug!(objects = ?objects, "registry objects");
    objects.join(", ")
}

/// Project-relative path of the API file of `service`.
fn api_file_path(service: &NewService) -> String {
    let filename = service.api_filename();
    match service.injectable.injectable.module_dir() {
        "" => format!("{filename}.ts"),
        dir => format!("{dir}/{filename}.ts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injectable(name: &str, key: &str, module_path: &str) -> Injectable {
        Injectable::new(name, format!("I{name}"), key, module_path)
    }

    #[test]
    fn test_render_drops_empty_token_lines() {
        let tokens = token_map([("__A__", ""), ("__B__", "b")]);
        let out = render("x\n__A__\n  __B__\n__A__ y\n", &tokens);
        assert_eq!(out, "x\n  b\n y\n");
    }

    #[test]
    fn test_types_module() {
        assert_eq!(types_module("app/Types.ts"), "app/Types");
        assert_eq!(types_module("app/Types"), "app/Types");
    }

    #[test]
    fn test_registry_objects() {
        let item = NewInjectable::new(
            injectable("Cart", "ServiceTypes.Cart", "services/cart/Cart"),
            vec![
                injectable("Auth", "ServiceTypes.Auth", "services/auth/Auth"),
                injectable("Shop", "DomainStoreTypes.Shop", "stores/Shop"),
                injectable("Legacy", "Legacy", "legacy/Legacy"),
            ],
        );
        assert_eq!(registry_objects(&item), "DomainStoreTypes, ServiceTypes");
    }

    #[test]
    fn test_api_file_path() {
        let service = NewService::new(NewInjectable::new(
            injectable("Cart", "ServiceTypes.Cart", "services/cart/CartService"),
            Vec::new(),
        ));
        assert_eq!(api_file_path(&service), "services/cart/CartApi.ts");

        let top_level = NewService {
            api_filename: Some("Remote".into()),
            ..NewService::new(NewInjectable::new(
                injectable("Cart", "ServiceTypes.Cart", "Cart"),
                Vec::new(),
            ))
        };
        assert_eq!(api_file_path(&top_level), "Remote.ts");
    }
}
