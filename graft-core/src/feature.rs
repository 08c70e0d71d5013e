//! Simple elements added in a feature batch.

use serde::{Deserialize, Serialize};

/// A server-driven configuration value.
///
/// Becomes a decorated member of the config model class and an entry of the
/// config defaults object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub default_value: serde_json::Value,
}

/// A launch optimization experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    /// Enum member name
    pub key: String,
    /// Experiment name, also the enum member value
    pub name: String,
    /// Default experiment variables
    #[serde(default = "empty_object")]
    pub variables: serde_json::Value,
    /// Fetched on warm launch instead of cold launch
    #[serde(default)]
    pub fetch_on_warm_launch: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// A batch of configs and optimizations generated together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub configs: Vec<ServerConfig>,
    #[serde(default)]
    pub optimizations: Vec<Optimization>,
}

impl Feature {
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty() && self.optimizations.is_empty()
    }
}
