//! Validation context and utilities for manifest parsing.

use std::{path::Path, sync::Arc};

use miette::SourceSpan;

use crate::{Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// Holds the source content, filename and the current table path, so nested
/// sections can report errors with a precise location.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "graft.toml");
/// let registry = ctx.push("registry");
/// registry.validate_name("call", "register")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Table path segments (e.g., ["api", "services"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a table segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages.
    ///
    /// For example: "call in 'registry'" or just "call" at the top level.
    pub fn context_for(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{} in '{}'", key, self.path_string())
        }
    }

    /// Find the span of a table name in the source.
    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_name_span(self.source.src(), name)
    }

    /// Find the span of a string value assigned to `key` in the current table.
    pub fn find_value_span(&self, key: &str, value: &str) -> Option<SourceSpan> {
        find_value_span(self.source.src(), &self.path_string(), key, value)
    }

    /// Validate that a name can be used as a TypeScript identifier.
    pub fn validate_name(&self, key: &str, name: &str) -> Result<()> {
        if is_reserved_word(name) {
            return Err(self.source.reserved_keyword_error(
                name,
                self.context_for(key),
                self.find_value_span(key, name),
            ));
        }

        if let Some(reason) = validate_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(key),
                reason,
                self.find_value_span(key, name),
            ));
        }

        Ok(())
    }

    /// Validate that a configured path is relative.
    pub fn validate_relative_path(&self, key: &str, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(self.source.validation_error(
                format!("{} cannot be empty", self.context_for(key)),
                self.find_value_span(key, path),
            ));
        }
        if Path::new(path).is_absolute() || path.starts_with('/') || path.starts_with('\\') {
            return Err(self.source.absolute_path_error(
                path,
                self.context_for(key),
                self.find_value_span(key, path),
            ));
        }
        Ok(())
    }

    /// Validate a tool command line. An empty argv is allowed and disables the tool.
    pub fn validate_argv(&self, key: &str, argv: &[String]) -> Result<()> {
        match argv.first() {
            Some(program) if program.trim().is_empty() => Err(self.source.validation_error(
                format!("{} has a blank program name", self.context_for(key)),
                find_key_span(self.source.src(), &self.path_string(), key),
            )),
            _ => Ok(()),
        }
    }
}

/// Reserved words of TypeScript that cannot name a declaration or call
pub(crate) const TS_RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
    // Strict mode
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
];

pub(crate) fn is_reserved_word(name: &str) -> bool {
    TS_RESERVED_WORDS.contains(&name)
}

/// Find the span of a table name in the TOML source, e.g. `gwf` in `[api.services.gwf]`
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let patterns = [format!(".{}]", name), format!(".{}.", name)];

    for pattern in &patterns {
        if let Some(pos) = src.find(pattern) {
            // +1 to skip the leading dot
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }

    let header = format!("[{}]", name);
    src.find(&header)
        .map(|pos| SourceSpan::from((pos + 1, name.len())))
}

/// Offset where the body of `[table]` starts, or 0 for the root table.
fn table_start(src: &str, table: &str) -> Option<usize> {
    if table.is_empty() {
        return Some(0);
    }
    let header = format!("[{}]", table);
    src.find(&header).map(|pos| pos + header.len())
}

/// Find the span of `key` at the start of a line inside `[table]`
pub(crate) fn find_key_span(src: &str, table: &str, key: &str) -> Option<SourceSpan> {
    let start = table_start(src, table)?;
    let mut offset = start;

    for line in src[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        // Stop at the next table header
        if trimmed.starts_with('[') {
            return None;
        }
        if let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            let key_start = offset + (line.len() - trimmed.len());
            return Some(SourceSpan::from((key_start, key.len())));
        }
        offset += line.len();
    }
    None
}

/// Find the span of a quoted `value` assigned to `key` inside `[table]`.
///
/// Arrays spanning several lines are searched up to the next table header.
pub(crate) fn find_value_span(
    src: &str,
    table: &str,
    key: &str,
    value: &str,
) -> Option<SourceSpan> {
    let key_span = find_key_span(src, table, key)?;
    let from = key_span.offset() + key_span.len();
    let rest = &src[from..];
    let end = rest.find("\n[").unwrap_or(rest.len());
    let rest = &rest[..end];

    for quote in ['"', '\''] {
        let pattern = format!("{quote}{value}{quote}");
        if let Some(pos) = rest.find(&pattern) {
            return Some(SourceSpan::from((from + pos + 1, value.len())));
        }
    }
    None
}

/// Validate that a name is a TypeScript identifier.
/// Returns None if valid, Some(reason) if invalid.
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let Some(first) = name.chars().next() else {
        return Some("name cannot be empty");
    };

    if first.is_ascii_digit() {
        return Some("name cannot start with a number");
    }

    if !graft_core::is_identifier(name) {
        return Some("name contains characters that are not allowed in identifiers");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("register").is_none());
        assert!(validate_identifier("ConfigModel").is_none());
        assert!(validate_identifier("_private").is_none());
        assert!(validate_identifier("$store").is_none());
        assert!(validate_identifier("value2").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("my-call").is_some());
        assert!(validate_identifier("a.b").is_some());
        assert!(validate_identifier("has space").is_some());
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("enum"));
        assert!(is_reserved_word("class"));
        assert!(is_reserved_word("interface"));
        assert!(!is_reserved_word("register"));
        assert!(!is_reserved_word("Enum"));
    }

    #[test]
    fn test_context_for() {
        let ctx = ParseContext::new("", "graft.toml");
        assert_eq!(ctx.context_for("call"), "call");
        let nested = ctx.push("api").push("services");
        assert_eq!(nested.context_for("expression"), "expression in 'api.services'");
    }

    #[test]
    fn test_find_name_span() {
        let src = "[api.services.gwf]\nexpression = \"x\"";
        let span = find_name_span(src, "gwf").unwrap();
        assert_eq!(span.offset(), 14);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_find_value_span_scoped_to_table() {
        let src = "[project]\nroot = \"src\"\n\n[registry]\nroot = \"src\"\ncall = \"bind\"\n";
        let span = find_value_span(src, "registry", "root", "src").unwrap();
        assert_eq!(span.offset(), src.rfind("src").unwrap());
        let span = find_value_span(src, "registry", "call", "bind").unwrap();
        assert_eq!(&src[span.offset()..span.offset() + span.len()], "bind");
    }

    #[test]
    fn test_find_value_span_multiline_array() {
        let src = "[feature]\nconfig_decorators = [\n  \"serializable\",\n  'observable',\n]\n";
        let span = find_value_span(src, "feature", "config_decorators", "observable").unwrap();
        assert_eq!(
            &src[span.offset()..span.offset() + span.len()],
            "observable"
        );
    }

    #[test]
    fn test_find_key_span_requires_assignment() {
        let src = "[registry]\nservices = \"a\"\nservice = \"b\"\n";
        let span = find_key_span(src, "registry", "service").unwrap();
        assert_eq!(span.offset(), src.find("service =").unwrap());
    }

    #[test]
    fn test_find_value_span_missing_table() {
        assert!(find_value_span("call = \"x\"", "registry", "call", "x").is_none());
    }
}
