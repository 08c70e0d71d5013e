//! Blank-line restoration.
//!
//! Re-printing a structurally edited file drops the blank lines between
//! statements. [`restore_whitespace`] diffs the original against the
//! re-printed text and turns every removed blank line back into context,
//! so the edit keeps the file's original spacing.
//!
//! Edits work on `\n` text. [`LineEnding`] records whether a file used
//! `\r\n` so the edited text can be written back the same way.

use std::borrow::Cow;

use tracing::debug;

use crate::{
    PatchError,
    diff::{self, HunkLine},
};

const CONTEXT_LINES: usize = 3;

/// Reinstate blank lines of `original` that are missing from `reprinted`.
///
/// If `reprinted` differs from `original` only by removed blank lines, the
/// result is `original` exactly.
pub fn restore_whitespace(original: &str, reprinted: &str) -> Result<String, PatchError> {
    let mut hunks = diff::hunks(original, reprinted, CONTEXT_LINES);
    let mut offset = 0;

    for hunk in &mut hunks {
        hunk.new_start += offset;

        let mut restored = 0;
        for line in &mut hunk.lines {
            if let HunkLine::Removed(text) = line
                && text.trim().is_empty()
            {
                let text = std::mem::take(text);
                *line = HunkLine::Context(text);
                restored += 1;
            }
        }

        hunk.new_lines += restored;
        offset += restored;
    }

    debug!(hunks = hunks.len(), restored = offset, "restoring blank lines");
    diff::apply(original, &hunks)
}

/// Line terminator used by a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The terminator of the first line of `text`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => Self::CrLf,
            _ => Self::Lf,
        }
    }

    /// `text` with every `\r\n` turned into `\n`.
    pub fn normalize(text: &str) -> Cow<'_, str> {
        if text.contains("\r\n") {
            Cow::Owned(text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Convert `\n`-terminated text back to this line ending.
    pub fn restore(self, text: String) -> String {
        match self {
            Self::Lf => text,
            Self::CrLf => text.replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_round_trip() {
        let text = "a\r\n\r\nb\r\n";
        let ending = LineEnding::detect(text);
        assert_eq!(ending, LineEnding::CrLf);
        let normalized = LineEnding::normalize(text);
        assert_eq!(normalized, "a\n\nb\n");
        assert_eq!(ending.restore(normalized.into_owned()), text);

        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("no newline"), LineEnding::Lf);
        assert!(matches!(LineEnding::normalize("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_only_blank_lines_lost() {
        let original = "import a from 'a';\n\nexport enum E {\n  A = 'A',\n\n  B = 'B',\n}\n";
        let reprinted = "import a from 'a';\nexport enum E {\n  A = 'A',\n  B = 'B',\n}\n";
        assert_eq!(restore_whitespace(original, reprinted).unwrap(), original);
    }

    #[test]
    fn test_identical_texts() {
        let text = "a\n\nb\n";
        assert_eq!(restore_whitespace(text, text).unwrap(), text);
    }

    #[test]
    fn test_insertion_keeps_surrounding_blank_lines() {
        let original = "enum E {\n  A = 'A',\n\n  C = 'C',\n}\n";
        let reprinted = "enum E {\n  A = 'A',\n  B = 'B',\n  C = 'C',\n}\n";
        assert_eq!(
            restore_whitespace(original, reprinted).unwrap(),
            "enum E {\n  A = 'A',\n\n  B = 'B',\n  C = 'C',\n}\n"
        );
    }

    #[test]
    fn test_blank_lines_in_separate_hunks() {
        let mut original = String::new();
        for i in 0..30 {
            original.push_str(&format!("line{};\n", i));
            if i % 10 == 0 {
                original.push('\n');
            }
        }
        let reprinted: String = original
            .split_inclusive('\n')
            .filter(|l| !l.trim().is_empty())
            .collect();
        assert_eq!(restore_whitespace(&original, &reprinted).unwrap(), original);
    }

    #[test]
    fn test_content_changes_are_kept() {
        let original = "a\n\nb\n";
        let reprinted = "a\nbb\n";
        assert_eq!(restore_whitespace(original, reprinted).unwrap(), "a\n\nbb\n");
    }
}
