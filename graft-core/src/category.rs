//! Registration categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The registry an injectable belongs to.
///
/// Each category has its own dependency container file, and registration
/// keys are unique within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectableCategory {
    Service,
    DomainStore,
    ScreenStore,
}

impl InjectableCategory {
    pub const ALL: [InjectableCategory; 3] = [
        InjectableCategory::Service,
        InjectableCategory::DomainStore,
        InjectableCategory::ScreenStore,
    ];

    /// Returns the category identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectableCategory::Service => "service",
            InjectableCategory::DomainStore => "domain-store",
            InjectableCategory::ScreenStore => "screen-store",
        }
    }

    /// Human readable label used in progress descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            InjectableCategory::Service => "Service",
            InjectableCategory::DomainStore => "Domain Store",
            InjectableCategory::ScreenStore => "Screen Store",
        }
    }
}

impl fmt::Display for InjectableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InjectableCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "service" | "services" => Ok(InjectableCategory::Service),
            "domain-store" | "domainstore" => Ok(InjectableCategory::DomainStore),
            "screen-store" | "screenstore" => Ok(InjectableCategory::ScreenStore),
            _ => Err(format!(
                "unknown category '{}', expected 'service', 'domain-store' or 'screen-store'",
                s
            )),
        }
    }
}
