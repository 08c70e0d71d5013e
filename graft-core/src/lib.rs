//! Core utilities and types for the graft scaffolding tool.
//!
//! This crate provides the data model shared by every other graft crate:
//! injectable units, their categories, API request descriptions, and the
//! simple elements of a feature batch.

mod category;
mod feature;
mod file;
mod injectable;
mod service;
mod utils;

pub use category::InjectableCategory;
pub use feature::{Feature, Optimization, ServerConfig};
// File operations
pub use file::{read_file, write_file};
pub use injectable::{Injectable, NewInjectable, UNKNOWN_MODULE};
pub use service::{ApiRequestSpec, HttpVerb, NewService, RetryPolicy};
// String utilities
pub use utils::{
    capitalized_camel_case, is_identifier, lowercase_first_letter,
    uppercase_first_letter,
};
