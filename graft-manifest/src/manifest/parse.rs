//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use super::{Manifest, validate::ParseContext};
use crate::{Error, Result, error::SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "graft.toml")
    }
}

impl Manifest {
    /// Parse a graft.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a graft.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    let project = ctx.push("project");
    project.validate_relative_path("root", &manifest.project.root)?;
    project.validate_relative_path("staging_dir", &manifest.project.staging_dir)?;
    if let Some(dir) = &manifest.project.templates_dir {
        project.validate_relative_path("templates_dir", dir)?;
    }

    let registry = ctx.push("registry");
    registry.validate_name("call", &manifest.registry.call)?;
    for (key, path) in [
        ("types_file", &manifest.registry.types_file),
        ("service", &manifest.registry.service),
        ("domain_store", &manifest.registry.domain_store),
        ("screen_store", &manifest.registry.screen_store),
    ] {
        registry.validate_relative_path(key, path)?;
    }

    let feature = ctx.push("feature");
    let names = &manifest.feature;
    for (key, name) in [
        ("config_model_class", &names.config_model_class),
        ("config_defaults_object", &names.config_defaults_object),
        ("warm_launch_enum", &names.warm_launch_enum),
        ("cold_launch_enum", &names.cold_launch_enum),
    ] {
        feature.validate_name(key, name)?;
    }
    for decorator in &names.config_decorators {
        feature.validate_name("config_decorators", decorator)?;
    }
    for (key, path) in [
        ("config_model", &names.config_model),
        ("config_defaults", &names.config_defaults),
        ("optimizations", &names.optimizations),
        ("optimization_defaults", &names.optimization_defaults),
    ] {
        feature.validate_relative_path(key, path)?;
    }

    let tools = ctx.push("tools");
    tools.validate_argv("format", &manifest.tools.format)?;
    tools.validate_argv("lint_fix", &manifest.tools.lint_fix)?;

    let api = ctx.push("api");
    for (name, service) in &manifest.api.services {
        if service.expression.trim().is_empty() {
            return Err(api.source_context().validation_error(
                format!("api service '{}' has an empty expression", name),
                api.find_span(name),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use graft_core::InjectableCategory;

    use super::*;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest: Manifest = "".parse().unwrap();
        assert_eq!(manifest.project.root, "src");
        assert_eq!(manifest.project.staging_dir, ".graft/staging");
        assert_eq!(manifest.registry.call, "register");
        assert_eq!(
            manifest.registry.container(InjectableCategory::DomainStore),
            "app/DependencyContainer.DomainStores.ts"
        );
        assert_eq!(
            manifest.feature.config_decorators,
            vec!["serializable", "observable"]
        );
        assert!(manifest.tools.format.is_empty());
        assert!(manifest.api.services.is_empty());
    }

    #[test]
    fn test_full_manifest() {
        let src = r#"
[project]
root = "app"
templates_dir = "templates"

[registry]
call = "bind"
types_file = "core/Types.ts"

[feature]
warm_launch_enum = "Warm"
cold_launch_enum = "Cold"

[tools]
format = ["npx", "prettier", "--stdin-filepath", "{path}"]

[api]
imports = ["import { RetryPolicy } from 'services/networking/RetryPolicy';"]

[api.services.gwf]
expression = "AppInfoService.gwfServer()"
import = "import { AppInfoService } from 'services/appinfo/AppInfoService';"
"#;
        let manifest: Manifest = src.parse().unwrap();
        assert_eq!(manifest.project.root, "app");
        assert_eq!(manifest.registry.call, "bind");
        assert_eq!(manifest.registry.types_file, "core/Types.ts");
        assert_eq!(
            manifest.registry.container(InjectableCategory::Service),
            "app/DependencyContainer.Services.ts"
        );
        assert_eq!(manifest.feature.launch_enum(true), "Warm");
        assert_eq!(manifest.feature.launch_enum(false), "Cold");
        assert_eq!(manifest.tools.format.len(), 4);
        assert_eq!(
            manifest.api.service_expression("gwf"),
            "AppInfoService.gwfServer()"
        );
        assert_eq!(manifest.api.service_expression("other"), "'other'");
        assert_eq!(
            manifest.api.service_imports(["gwf", "other", "gwf"]),
            vec!["import { AppInfoService } from 'services/appinfo/AppInfoService';"]
        );
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = "[project\nroot = 1".parse::<Manifest>().unwrap_err();
        match *err {
            Error::Parse { span, .. } => assert!(span.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "[registry]\ncalls = \"register\"".parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_invalid_call_identifier() {
        let src = "[registry]\ncall = \"my-register\"\n";
        let err = src.parse::<Manifest>().unwrap_err();
        match *err {
            Error::InvalidIdentifier { name, span, .. } => {
                assert_eq!(name, "my-register");
                let span = span.unwrap();
                assert_eq!(&src[span.offset()..span.offset() + span.len()], "my-register");
            }
            other => panic!("expected invalid identifier, got {other:?}"),
        }
    }

    #[test]
    fn test_reserved_enum_name() {
        let src = "[feature]\nwarm_launch_enum = \"enum\"\n";
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::ReservedKeyword { .. }));
    }

    #[test]
    fn test_invalid_decorator() {
        let src = "[feature]\nconfig_decorators = [\"serializable\", \"@observable\"]\n";
        let err = src.parse::<Manifest>().unwrap_err();
        match *err {
            Error::InvalidIdentifier { name, span, .. } => {
                assert_eq!(name, "@observable");
                assert!(span.is_some());
            }
            other => panic!("expected invalid identifier, got {other:?}"),
        }
    }

    #[test]
    fn test_absolute_path_rejected() {
        let src = "[registry]\ntypes_file = \"/etc/Types.ts\"\n";
        let err = src.parse::<Manifest>().unwrap_err();
        match *err {
            Error::AbsolutePath { path, context, .. } => {
                assert_eq!(path, "/etc/Types.ts");
                assert_eq!(context, "types_file in 'registry'");
            }
            other => panic!("expected absolute path error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_tool_program_rejected() {
        let src = "[tools]\nlint_fix = [\"\", \"--fix\"]\n";
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_empty_service_expression_rejected() {
        let src = "[api.services.gwf]\nexpression = \"  \"\n";
        let err = src.parse::<Manifest>().unwrap_err();
        match *err {
            Error::Validation { message, span, .. } => {
                assert!(message.contains("gwf"));
                assert!(span.is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
