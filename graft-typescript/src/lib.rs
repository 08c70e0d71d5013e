//! TypeScript source editing and scaffolding for graft.
//!
//! This crate reads and edits the files of an inversify-style TypeScript
//! project: dependency container registrations, the registry of injection
//! keys, enums of launch optimizations and the server config model. On top
//! of those edits it generates new services and stores from templates.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use graft_codegen::NoopTools;
//! use graft_core::{InjectableCategory, Injectable, NewInjectable};
//! use graft_manifest::GraftToml;
//! use graft_typescript::Project;
//!
//! let graft_toml = GraftToml::open("graft.toml")?;
//! let project = Project::from_toml(&graft_toml, Arc::new(NoopTools));
//!
//! let item = NewInjectable::new(
//!     Injectable::new("CartStore", "ICartStore", "DomainStoreTypes.Cart", "stores/CartStore"),
//!     project.resolve_dependencies(&["ServiceTypes.Auth".into()])?,
//! );
//! let generation = project.generate_injectable(InjectableCategory::DomainStore, &item, |_| {})?;
//! ```
//!
//! # Module Organization
//!
//! - [`scanner`] - Tokens and statement splitting
//! - [`registrations`] - Container registrations and imports
//! - [`tree`] - Declaration tree parsed from a source file
//! - [`editor`] - Member insertion into enums, objects and classes
//! - [`literal`] - JSON values as TypeScript literals and types
//! - [`interface`] - Interfaces derived from sample payloads
//! - [`templates`] - Built-in templates and project overrides
//! - [`generator`] - Generation runs ([`Project`])

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;

pub mod editor;
pub mod generator;
pub mod interface;
pub mod literal;
pub mod registrations;
pub mod scanner;
pub mod templates;
pub mod tree;

pub use editor::{
    InsertOptions, Locate, MemberValue, NewMember, Placement, insert_class_member,
    insert_enum_member, insert_member, insert_object_member,
};
pub use error::{DeclarationKind, Error, Result};
pub use generator::{Generation, Project};
pub use interface::{Interface, InterfaceField, interface_from_json, interface_from_json_str};
pub use literal::{TsType, render_literal};
pub use registrations::{
    ImportMap, extract_registrations, extract_registrations_from_file, insert_registration,
};
pub use templates::Templates;
pub use tree::SourceTree;
