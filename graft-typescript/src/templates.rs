//! Built-in templates and project overrides.
//!
//! Every template has a relative name such as `file/Service.tpl`. A project
//! overrides one by placing a file with the same relative name under its
//! `project.templates_dir`.

use std::path::{Path, PathBuf};

use graft_core::InjectableCategory;
use tracing::debug;

use crate::error::{Error, Result};

pub const SERVICE_FILE: &str = "file/Service.tpl";
pub const DOMAIN_STORE_FILE: &str = "file/DomainStore.tpl";
pub const SCREEN_STORE_FILE: &str = "file/ScreenStore.tpl";
pub const SERVICE_API_FILE: &str = "file/ServiceApi.tpl";
pub const DEPENDENCY_MEMBER: &str = "snippets/DependencyMember.tpl";
pub const CONSTRUCTOR_INJECTION: &str = "snippets/ConstructorInjection.tpl";
pub const IMPORT_DEPENDENCY: &str = "snippets/ImportDependency.tpl";
pub const CONSTRUCTOR_MEMBER_ASSIGNMENT: &str = "snippets/ConstructorMemberAssignment.tpl";
pub const IMPORT_REQUEST_RESPONSE: &str = "snippets/ImportRequestResponseFromApi.tpl";
pub const GET_REQUEST: &str = "snippets/GetRequest.tpl";
pub const POST_REQUEST: &str = "snippets/PostRequest.tpl";
pub const PUT_REQUEST: &str = "snippets/PutRequest.tpl";
pub const DELETE_REQUEST: &str = "snippets/DeleteRequest.tpl";

const BUILTIN: &[(&str, &str)] = &[
    (SERVICE_FILE, include_str!("../templates/file/Service.tpl")),
    (DOMAIN_STORE_FILE, include_str!("../templates/file/DomainStore.tpl")),
    (SCREEN_STORE_FILE, include_str!("../templates/file/ScreenStore.tpl")),
    (SERVICE_API_FILE, include_str!("../templates/file/ServiceApi.tpl")),
    (DEPENDENCY_MEMBER, include_str!("../templates/snippets/DependencyMember.tpl")),
    (
        CONSTRUCTOR_INJECTION,
        include_str!("../templates/snippets/ConstructorInjection.tpl"),
    ),
    (IMPORT_DEPENDENCY, include_str!("../templates/snippets/ImportDependency.tpl")),
    (
        CONSTRUCTOR_MEMBER_ASSIGNMENT,
        include_str!("../templates/snippets/ConstructorMemberAssignment.tpl"),
    ),
    (
        IMPORT_REQUEST_RESPONSE,
        include_str!("../templates/snippets/ImportRequestResponseFromApi.tpl"),
    ),
    (GET_REQUEST, include_str!("../templates/snippets/GetRequest.tpl")),
    (POST_REQUEST, include_str!("../templates/snippets/PostRequest.tpl")),
    (PUT_REQUEST, include_str!("../templates/snippets/PutRequest.tpl")),
    (DELETE_REQUEST, include_str!("../templates/snippets/DeleteRequest.tpl")),
];

/// Class file template for a category.
pub fn class_file(category: InjectableCategory) -> &'static str {
    match category {
        InjectableCategory::Service => SERVICE_FILE,
        InjectableCategory::DomainStore => DOMAIN_STORE_FILE,
        InjectableCategory::ScreenStore => SCREEN_STORE_FILE,
    }
}

/// Template lookup with optional project overrides.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    overrides: Option<PathBuf>,
}

impl Templates {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn new(overrides: Option<PathBuf>) -> Self {
        Self { overrides }
    }

    pub fn overrides(&self) -> Option<&Path> {
        self.overrides.as_deref()
    }

    /// Names of every built-in template.
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }

    /// Full text of the template `name`.
    pub fn get(&self, name: &str) -> Result<String> {
        if let Some(dir) = &self.overrides {
            let path = dir.join(name);
            if path.is_file() {
                debug!(path = %path.display(), "using template override");
                return std::fs::read_to_string(&path)
                    .map_err(|source| Box::new(Error::Io { path, source }));
            }
        }
        BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| Box::new(Error::UnknownTemplate(name.to_string())))
    }

    /// Template text without its final line break, for joining.
    pub fn snippet(&self, name: &str) -> Result<String> {
        let mut text = self.get(name)?;
        while text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}
