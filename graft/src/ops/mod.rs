//! Core operations.
//!
//! This module contains the business logic for graft commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod generate;
pub mod list;

pub use check::check;
pub use generate::open_project;
pub use list::list;
