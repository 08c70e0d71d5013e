//! Language-agnostic generation pipeline for graft.
//!
//! The pieces here know nothing about TypeScript. A generator built on top
//! of them substitutes tokens into templates, repairs the blank lines a
//! structural re-print loses, stages every output file, and only commits
//! the staged files once every step of the run succeeded.
//!
//! # Module Organization
//!
//! - [`builder`] - Indented text building ([`CodeBuilder`], [`Indent`])
//! - [`template`] - Token substitution ([`substitute`], [`expand_each`])
//! - [`diff`] - Line diff, unified hunks and patch application
//! - [`whitespace`] - Blank-line restoration after re-printing
//! - [`tools`] - External formatter and linter ([`SourceTools`])
//! - [`staging`] - Two-phase writes ([`Stager`], [`FinalizeAction`], [`Session`])
//! - [`json`] - JSON defaults file updates
//! - [`progress`] - Step-by-step execution with progress reporting

pub mod builder;
pub mod diff;
mod error;
pub mod json;
pub mod progress;
pub mod staging;
pub mod template;
pub mod tools;
pub mod whitespace;

pub use builder::{CodeBuilder, Indent};
pub use error::{PartialCommit, PatchError, ToolError, TransitionError};
pub use json::update_json;
pub use progress::{ProgressStep, StepRunner, StepStatus};
pub use staging::{FinalizeAction, Session, Stager};
pub use template::{TokenMap, expand_each, substitute, token_map};
pub use tools::{CommandTools, NoopTools, SourceTools};
pub use whitespace::{LineEnding, restore_whitespace};
