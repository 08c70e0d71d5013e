//! TOML descriptors of the elements to generate.
//!
//! A descriptor names the new element and references its dependencies by
//! registration key. Anything left out is derived from the name the same
//! way for every element of a category.

use std::path::Path;

use eyre::{Result, WrapErr, bail, ensure};
use graft_core::{
    ApiRequestSpec, Feature, HttpVerb, Injectable, InjectableCategory, NewInjectable, NewService,
    RetryPolicy, capitalized_camel_case, is_identifier,
};
use graft_typescript::Project;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

/// Input of `graft injectable` and `graft service`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Descriptor {
    /// Base name, `Profile` for `ProfileStore`
    pub name: String,
    pub class_name: Option<String>,
    pub interface_name: Option<String>,
    pub registration_key: Option<String>,
    /// Module path relative to the project root, without extension
    pub module_path: Option<String>,
    /// Registration keys of the injected dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub api_filename: Option<String>,
    #[serde(default)]
    pub api_requests: Vec<ApiRequestDescriptor>,
}

/// One API call of a service descriptor.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiRequestDescriptor {
    pub verb: HttpVerb,
    /// Target backend, a key of `[api.services]`
    pub service: String,
    pub method: String,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    pub function_name: Option<String>,
    pub request_interface_name: Option<String>,
    pub response_interface_name: Option<String>,
    /// Sample request payload, a JSON string or a TOML table
    pub request: Value,
    /// Sample response payload, a JSON string or a TOML table
    pub response: Value,
}

impl Descriptor {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    /// The element itself, with every omitted name derived.
    pub fn injectable(&self, category: InjectableCategory) -> Result<Injectable> {
        let name = capitalized_camel_case(&self.name);
        ensure!(is_identifier(&name), "'{}' is not a valid name", self.name);

        let suffix = class_suffix(category);
        let class_name = match &self.class_name {
            Some(class_name) => class_name.clone(),
            None if name.ends_with(suffix) => name.clone(),
            None => format!("{name}{suffix}"),
        };
        ensure!(
            is_identifier(&class_name),
            "'{class_name}' is not a valid class name"
        );

        let interface_name = self
            .interface_name
            .clone()
            .unwrap_or_else(|| format!("I{class_name}"));
        ensure!(
            is_identifier(&interface_name),
            "'{interface_name}' is not a valid interface name"
        );

        let registration_key = self
            .registration_key
            .clone()
            .unwrap_or_else(|| format!("{}.{name}", registry_object(category)));
        let injectable = Injectable::new(
            class_name,
            interface_name,
            registration_key,
            self.module_path.clone().unwrap_or_default(),
        );
        if injectable.registry_parts().is_none() {
            bail!(
                "registration key '{}' must look like `Types.Name`",
                injectable.registration_key
            );
        }

        let module_path = match &self.module_path {
            Some(path) => path.trim_end_matches(".ts").to_string(),
            None => format!(
                "{}/{}/{}",
                category_dir(category),
                name.to_lowercase(),
                injectable.name
            ),
        };
        ensure!(
            !module_path.starts_with('/') && !module_path.split('/').any(|part| part == ".."),
            "module path '{module_path}' must stay inside the project root"
        );
        Ok(Injectable {
            module_path,
            ..injectable
        })
    }

    /// The element with its dependencies looked up in the project.
    pub fn new_injectable(
        &self,
        category: InjectableCategory,
        project: &Project,
    ) -> Result<NewInjectable> {
        ensure!(
            self.api_requests.is_empty() || category == InjectableCategory::Service,
            "only services take API requests"
        );
        let injectable = self.injectable(category)?;
        let dependencies = project.resolve_dependencies(&self.dependencies)?;
        Ok(NewInjectable::new(injectable, dependencies))
    }

    pub fn new_service(&self, project: &Project) -> Result<NewService> {
        let injectable = self.new_injectable(InjectableCategory::Service, project)?;
        let api_requests = self.api_requests()?;
        Ok(NewService {
            injectable,
            api_requests,
            api_filename: self.api_filename.clone(),
        })
    }

    fn api_requests(&self) -> Result<Vec<ApiRequestSpec>> {
        self.api_requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                request
                    .resolve()
                    .wrap_err_with(|| format!("Invalid API request #{}", index + 1))
            })
            .collect()
    }
}

impl ApiRequestDescriptor {
    fn resolve(&self) -> Result<ApiRequestSpec> {
        // `GET` calls read as fetches: fetchGwfProfile, IFetchGwfProfileRequest
        let prefix = match self.verb {
            HttpVerb::Get => "fetch".to_string(),
            verb => verb.as_str().to_lowercase(),
        };
        let stem = capitalized_camel_case(&format!("{prefix} {} {}", self.service, self.method));

        let function_name = self
            .function_name
            .clone()
            .unwrap_or_else(|| graft_core::lowercase_first_letter(&stem));
        ensure!(
            is_identifier(&function_name),
            "'{function_name}' is not a valid function name"
        );

        Ok(ApiRequestSpec {
            verb: self.verb,
            target_service: self.service.clone(),
            method: self.method.clone(),
            retry_policy: self.retry_policy,
            function_name,
            request_interface_name: self
                .request_interface_name
                .clone()
                .unwrap_or_else(|| format!("I{stem}Request")),
            response_interface_name: self
                .response_interface_name
                .clone()
                .unwrap_or_else(|| format!("I{stem}Response")),
            request_schema_json: sample_json("request", &self.request)?,
            response_schema_json: sample_json("response", &self.response)?,
        })
    }
}

/// Input of `graft feature`.
pub fn load_feature(path: &Path) -> Result<Feature> {
    let feature: Feature = read_toml(path)?;
    validate_feature(&feature)
        .wrap_err_with(|| format!("Invalid feature descriptor {}", path.display()))?;
    Ok(feature)
}

fn validate_feature(feature: &Feature) -> Result<()> {
    ensure!(!feature.name.is_empty(), "the feature needs a name");

    let mut seen = Vec::new();
    for config in &feature.configs {
        ensure!(
            is_identifier(&config.name),
            "server config name '{}' is not an identifier",
            config.name
        );
        ensure!(
            !seen.contains(&&config.name),
            "server config '{}' is listed twice",
            config.name
        );
        seen.push(&config.name);
    }

    let mut seen = Vec::new();
    for optimization in &feature.optimizations {
        ensure!(
            is_identifier(&optimization.key),
            "optimization key '{}' is not an identifier",
            optimization.key
        );
        ensure!(
            !optimization.name.is_empty(),
            "optimization '{}' needs a name",
            optimization.key
        );
        ensure!(
            optimization.variables.is_object(),
            "variables of optimization '{}' must be a table",
            optimization.key
        );
        ensure!(
            !seen.contains(&&optimization.key),
            "optimization '{}' is listed twice",
            optimization.key
        );
        seen.push(&optimization.key);
    }
    Ok(())
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).wrap_err_with(|| format!("Invalid descriptor {}", path.display()))
}

/// Normalize a sample payload to a JSON object string.
fn sample_json(field: &str, value: &Value) -> Result<String> {
    let sample = match value {
        Value::String(text) => serde_json::from_str(text)
            .wrap_err_with(|| format!("the {field} sample is not valid JSON"))?,
        other => other.clone(),
    };
    ensure!(sample.is_object(), "the {field} sample must be an object");
    Ok(sample.to_string())
}

fn class_suffix(category: InjectableCategory) -> &'static str {
    match category {
        InjectableCategory::Service => "Service",
        InjectableCategory::DomainStore | InjectableCategory::ScreenStore => "Store",
    }
}

fn registry_object(category: InjectableCategory) -> &'static str {
    match category {
        InjectableCategory::Service => "ServiceTypes",
        InjectableCategory::DomainStore => "DomainStoreTypes",
        InjectableCategory::ScreenStore => "ScreenStoreTypes",
    }
}

fn category_dir(category: InjectableCategory) -> &'static str {
    match category {
        InjectableCategory::Service => "services",
        InjectableCategory::DomainStore => "domains",
        InjectableCategory::ScreenStore => "screens",
    }
}
