//! Code builder utility for printing properly indented source.

use super::Indent;

/// Fluent API for building source text with proper indentation.
///
/// Supports both consuming methods (returning `Self`) for chaining and
/// mutable methods (returning `&mut Self`) for use inside loops.
///
/// # Example
///
/// ```
/// use graft_codegen::builder::CodeBuilder;
///
/// let code = CodeBuilder::typescript()
///     .line("export enum Color {")
///     .indent()
///     .line("Red = 'red',")
///     .dedent()
///     .line("}")
///     .build();
///
/// assert_eq!(code, "export enum Color {\n  Red = 'red',\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    /// Create a new CodeBuilder with the specified indentation.
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// Create a new CodeBuilder with 2-space indentation.
    pub fn typescript() -> Self {
        Self::new(Indent::TYPESCRIPT)
    }

    /// Add a line with current indentation (mutable).
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add every line of a multi-line block at the current indentation (mutable).
    ///
    /// Relative indentation inside the block is kept. Empty lines stay empty.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.push_blank();
            } else {
                self.push_line(line);
            }
        }
        self
    }

    /// Add a blank line (mutable).
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Add raw text without indentation or newline (mutable).
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    /// Increase indentation level (mutable).
    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    /// Decrease indentation level (mutable).
    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add a line with current indentation.
    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    /// Increase indentation level.
    pub fn indent(mut self) -> Self {
        self.push_indent();
        self
    }

    /// Decrease indentation level.
    pub fn dedent(mut self) -> Self {
        self.push_dedent();
        self
    }

    /// Consume the builder and return the printed text.
    pub fn build(self) -> String {
        self.buffer
    }

    /// Get a reference to the current buffer content.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent.as_str());
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::typescript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_line() {
        let code = CodeBuilder::typescript().line("const x = 1;").build();
        assert_eq!(code, "const x = 1;\n");
    }

    #[test]
    fn test_push_lines_keeps_relative_indent() {
        let mut builder = CodeBuilder::typescript();
        builder
            .push_indent()
            .push_lines("foo: {\n  bar: 1,\n\n},");
        assert_eq!(builder.build(), "  foo: {\n    bar: 1,\n\n  },\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let code = CodeBuilder::typescript().dedent().line("x;").build();
        assert_eq!(code, "x;\n");
    }
}
