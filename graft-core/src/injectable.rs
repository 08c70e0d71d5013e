use serde::{Deserialize, Serialize};

use crate::utils::lowercase_first_letter;

/// Module path recorded for a registration whose symbols were never imported.
pub const UNKNOWN_MODULE: &str = "UNKNOWN";

/// A named, dependency-resolvable unit (service or store).
///
/// ```
/// use graft_core::Injectable;
///
/// let game = Injectable::new("GameService", "IGameService", "ServiceTypes.Game", "services/game/GameService");
/// assert_eq!(game.camel_case_name(), "gameService");
/// assert_eq!(game.registry_parts(), Some(("ServiceTypes", "Game")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Injectable {
    /// Concrete class name, e.g. `GameService`
    pub name: String,
    /// Interface the unit is registered under, e.g. `IGameService`
    pub interface_name: String,
    /// Registration key, e.g. `ServiceTypes.Game`
    pub registration_key: String,
    /// Module specifier without extension, e.g. `services/game/GameService`
    pub module_path: String,
}

impl Injectable {
    pub fn new(
        name: impl Into<String>,
        interface_name: impl Into<String>,
        registration_key: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            interface_name: interface_name.into(),
            registration_key: registration_key.into(),
            module_path: module_path.into(),
        }
    }

    /// Name with a lowercase first letter, used for members and parameters.
    pub fn camel_case_name(&self) -> String {
        lowercase_first_letter(&self.name)
    }

    /// Split the registration key into the registry object and its member.
    ///
    /// Returns `None` when the key has no `.` separator.
    pub fn registry_parts(&self) -> Option<(&str, &str)> {
        self.registration_key
            .rsplit_once('.')
            .filter(|(object, member)| !object.is_empty() && !member.is_empty())
    }

    /// Directory part of the module path (empty for a top-level module).
    pub fn module_dir(&self) -> &str {
        self.module_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }

    /// Whether the module path could not be resolved from the imports.
    pub fn is_unresolved(&self) -> bool {
        self.module_path == UNKNOWN_MODULE
    }
}

/// A unit about to be generated, together with the units it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInjectable {
    #[serde(flatten)]
    pub injectable: Injectable,
    /// Units injected into the constructor, referenced by registration key
    #[serde(default)]
    pub dependencies: Vec<Injectable>,
}

impl NewInjectable {
    pub fn new(injectable: Injectable, dependencies: Vec<Injectable>) -> Self {
        Self {
            injectable,
            dependencies,
        }
    }
}
