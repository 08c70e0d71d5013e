use std::{fmt, path::PathBuf};

use graft_codegen::PatchError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for graft-typescript operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Kind of top-level declaration the structural editor can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Enum,
    Object,
    Class,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("'{key}' already exists in {declaration}")]
    #[diagnostic(
        code(graft::duplicate_key),
        help("pick another name or remove the existing member first")
    )]
    DuplicateKey { declaration: String, key: String },

    #[error("{message}")]
    #[diagnostic(code(graft::parse_shape))]
    ParseShape {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{kind} '{name}' not found")]
    #[diagnostic(
        code(graft::declaration_not_found),
        help("check the declaration names in graft.toml")
    )]
    DeclarationNotFound { kind: DeclarationKind, name: String },

    #[error("{kind} '{name}' is declared {count} times")]
    #[diagnostic(code(graft::ambiguous_declaration))]
    AmbiguousDeclaration {
        kind: DeclarationKind,
        name: String,
        count: usize,
    },

    #[error("cannot tell which of {count} functions should hold the first '{call}' registration")]
    #[diagnostic(
        code(graft::registration_target),
        help("name the registering function after the registration call")
    )]
    RegistrationTarget { call: String, count: usize },

    #[error("cannot derive an interface for '{name}': {reason}")]
    #[diagnostic(
        code(graft::interface_shape),
        help("payload samples must be JSON objects")
    )]
    InterfaceShape { name: String, reason: String },

    #[error("unknown template '{0}'")]
    #[diagnostic(code(graft::unknown_template))]
    UnknownTemplate(String),

    #[error("failed to restore blank lines")]
    Whitespace(#[source] PatchError),

    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a parse error pointing at `span` in `src`.
    pub fn parse_shape(
        message: impl Into<String>,
        src: &str,
        span: impl Into<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Self::ParseShape {
            message: message.into(),
            src: NamedSource::new("source", src.to_string()),
            span: span.into(),
        })
    }

    /// Attach a file name to the source of a parse error.
    pub fn with_source_name(self: Box<Self>, name: impl AsRef<str>) -> Box<Self> {
        match *self {
            Self::ParseShape { message, src, span } => Box::new(Self::ParseShape {
                message,
                src: NamedSource::new(name, src.inner().clone()),
                span,
            }),
            other => Box::new(other),
        }
    }
}
