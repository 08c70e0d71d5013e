//! Project configuration for the graft scaffolding tool.
//!
//! A `graft.toml` file describes where the destination source tree lives,
//! which files hold the registries and dependency containers, which
//! declarations feature batches edit, and which external tools format and
//! lint the generated output.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    ApiConfig, ApiServiceConfig, FeatureConfig, GraftToml, Manifest, ParseContext,
    ProjectConfig, RegistryConfig, ToolsConfig,
};
