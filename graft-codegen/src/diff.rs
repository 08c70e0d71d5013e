//! Line diff and unified hunks.
//!
//! Texts are split on `\n` only, so joining the lines back with `\n`
//! reproduces the input exactly, including a trailing newline (which shows
//! up as a final empty line).

use crate::PatchError;

/// A line-level edit produced by [`diff_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// A line inside a [`Hunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Removed(String),
    Added(String),
}

impl HunkLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Context(s) | Self::Removed(s) | Self::Added(s) => s,
        }
    }
}

/// A unified diff hunk. Line numbers are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub lines: Vec<HunkLine>,
}

/// Split text into lines the way every function in this module does.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Longest-common-subsequence diff of two line lists.
///
/// Common leading and trailing lines are trimmed first. The rest is aligned
/// with Hirschberg's algorithm, which needs memory linear in the input.
/// Deletions are emitted before insertions within a change.
pub fn diff_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<LineOp<'a>> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut ops: Vec<LineOp<'a>> = old[..prefix].iter().map(|l| LineOp::Equal(l)).collect();
    let mut changes = Vec::with_capacity(old_mid.len() + new_mid.len());
    lcs_ops(old_mid, new_mid, &mut changes);
    for run in changes.split_mut(|op| matches!(op, LineOp::Equal(_))) {
        run.sort_by_key(|op| matches!(op, LineOp::Insert(_)));
    }
    ops.extend(changes);
    ops.extend(old[old.len() - suffix..].iter().map(|l| LineOp::Equal(l)));
    ops
}

fn lcs_ops<'a>(old: &[&'a str], new: &[&'a str], ops: &mut Vec<LineOp<'a>>) {
    if old.is_empty() {
        ops.extend(new.iter().map(|l| LineOp::Insert(l)));
        return;
    }
    if new.is_empty() {
        ops.extend(old.iter().map(|l| LineOp::Delete(l)));
        return;
    }
    if let [line] = old {
        match new.iter().position(|l| l == line) {
            Some(j) => {
                ops.extend(new[..j].iter().map(|l| LineOp::Insert(l)));
                ops.push(LineOp::Equal(line));
                ops.extend(new[j + 1..].iter().map(|l| LineOp::Insert(l)));
            }
            None => {
                ops.push(LineOp::Delete(line));
                ops.extend(new.iter().map(|l| LineOp::Insert(l)));
            }
        }
        return;
    }

    // Split `old` in half and find the column where the best alignment of
    // the top half meets the best alignment of the bottom half.
    let mid = old.len() / 2;
    let forward = lcs_row(&old[..mid], new);
    let old_rev: Vec<&str> = old[mid..].iter().rev().copied().collect();
    let new_rev: Vec<&str> = new.iter().rev().copied().collect();
    let backward = lcs_row(&old_rev, &new_rev);

    let mut split = 0;
    let mut best = 0;
    for j in 0..=new.len() {
        let score = forward[j] + backward[new.len() - j];
        if score > best {
            best = score;
            split = j;
        }
    }

    lcs_ops(&old[..mid], &new[..split], ops);
    lcs_ops(&old[mid..], &new[split..], ops);
}

/// `row[j]` is the LCS length of `old` and `new[..j]`.
fn lcs_row(old: &[&str], new: &[&str]) -> Vec<usize> {
    let mut row = vec![0; new.len() + 1];
    for a in old {
        // LCS of the previous row at `j`, before it is overwritten
        let mut diag = 0;
        for (j, b) in new.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if a == b { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row
}

/// Group the differences between two texts into hunks with `context` lines
/// of surrounding context. Changes closer than `2 * context` lines share a hunk.
pub fn hunks(old: &str, new: &str, context: usize) -> Vec<Hunk> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let ops = diff_lines(&old_lines, &new_lines);

    // Position in old and new before each op
    let mut positions = Vec::with_capacity(ops.len());
    let (mut o, mut n) = (0, 0);
    for op in &ops {
        positions.push((o, n));
        match op {
            LineOp::Equal(_) => {
                o += 1;
                n += 1;
            }
            LineOp::Delete(_) => o += 1,
            LineOp::Insert(_) => n += 1,
        }
    }

    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| !matches!(op, LineOp::Equal(_)))
        .map(|(i, _)| i)
        .collect();

    let mut result = Vec::new();
    let mut idx = 0;
    while idx < changes.len() {
        let first = changes[idx];
        let mut last = first;
        idx += 1;
        while idx < changes.len() && changes[idx] - last <= 2 * context + 1 {
            last = changes[idx];
            idx += 1;
        }

        let begin = first.saturating_sub(context);
        let end = (last + context + 1).min(ops.len());
        let (old_start, new_start) = positions[begin];

        let mut hunk = Hunk {
            old_start,
            old_lines: 0,
            new_start,
            new_lines: 0,
            lines: Vec::with_capacity(end - begin),
        };
        for op in &ops[begin..end] {
            match op {
                LineOp::Equal(l) => {
                    hunk.old_lines += 1;
                    hunk.new_lines += 1;
                    hunk.lines.push(HunkLine::Context(l.to_string()));
                }
                LineOp::Delete(l) => {
                    hunk.old_lines += 1;
                    hunk.lines.push(HunkLine::Removed(l.to_string()));
                }
                LineOp::Insert(l) => {
                    hunk.new_lines += 1;
                    hunk.lines.push(HunkLine::Added(l.to_string()));
                }
            }
        }
        result.push(hunk);
    }
    result
}

/// Apply hunks, in order, to the text they were computed against.
///
/// Every context and removed line must match the original, and each hunk
/// must start at its recorded `new_start` in the output.
pub fn apply(original: &str, hunks: &[Hunk]) -> Result<String, PatchError> {
    let lines = split_lines(original);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    for hunk in hunks {
        if hunk.old_start < cursor || hunk.old_start > lines.len() {
            return Err(PatchError::OutOfRange);
        }
        out.extend_from_slice(&lines[cursor..hunk.old_start]);
        cursor = hunk.old_start;

        if out.len() != hunk.new_start {
            return Err(PatchError::Misaligned {
                expected: hunk.new_start,
                actual: out.len(),
            });
        }

        for line in &hunk.lines {
            match line {
                HunkLine::Context(text) | HunkLine::Removed(text) => {
                    let Some(current) = lines.get(cursor) else {
                        return Err(PatchError::OutOfRange);
                    };
                    if current != text {
                        return Err(PatchError::Mismatch { line: cursor });
                    }
                    if matches!(line, HunkLine::Context(_)) {
                        out.push(current);
                    }
                    cursor += 1;
                }
                HunkLine::Added(text) => out.push(text),
            }
        }

        if out.len() != hunk.new_start + hunk.new_lines {
            return Err(PatchError::Misaligned {
                expected: hunk.new_start + hunk.new_lines,
                actual: out.len(),
            });
        }
    }

    out.extend_from_slice(&lines[cursor..]);
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_identical() {
        let lines = ["a", "b"];
        let ops = diff_lines(&lines, &lines);
        assert!(ops.iter().all(|op| matches!(op, LineOp::Equal(_))));
        assert!(hunks("a\nb", "a\nb", 3).is_empty());
    }

    #[test]
    fn test_diff_replace() {
        let ops = diff_lines(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            ops,
            vec![
                LineOp::Equal("a"),
                LineOp::Delete("b"),
                LineOp::Insert("x"),
                LineOp::Equal("c"),
            ]
        );
    }

    #[test]
    fn test_single_hunk_with_context() {
        let old = "1\n2\n3\n4\n5\n6\n7\n8\n9";
        let new = "1\n2\n3\n4\nfive\n6\n7\n8\n9";
        let hunks = hunks(old, new, 3);
        assert_eq!(hunks.len(), 1);
        let hunk = &hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.old_lines, 7);
        assert_eq!(hunk.new_lines, 7);
        assert_eq!(hunk.lines[3], HunkLine::Removed("5".to_string()));
        assert_eq!(hunk.lines[4], HunkLine::Added("five".to_string()));
    }

    #[test]
    fn test_distant_changes_split_hunks() {
        let old: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut new = old.clone();
        new[2] = "two".to_string();
        new[17] = "seventeen".to_string();
        let hunks = hunks(&old.join("\n"), &new.join("\n"), 3);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[1].old_start, 14);
    }

    #[test]
    fn test_apply_reproduces_new_text() {
        let old = "a\nb\nc\nd\n";
        let new = "a\nc\nd\ne\n";
        let patched = apply(old, &hunks(old, new, 3)).unwrap();
        assert_eq!(patched, new);
    }

    #[test]
    fn test_large_diff_stays_minimal() {
        let old: Vec<String> = (0..2000)
            .map(|i| if i % 7 == 0 { String::new() } else { format!("line {i}") })
            .collect();
        let new: Vec<String> = old
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 7 != 0)
            .map(|(_, l)| l.clone())
            .collect();
        let old_refs: Vec<&str> = old.iter().map(String::as_str).collect();
        let new_refs: Vec<&str> = new.iter().map(String::as_str).collect();

        let ops = diff_lines(&old_refs, &new_refs);
        let equal = ops.iter().filter(|op| matches!(op, LineOp::Equal(_))).count();
        assert_eq!(equal, new.len());
        assert!(ops.iter().all(|op| !matches!(op, LineOp::Insert(_))));

        let (old, new) = (old.join("\n"), new.join("\n"));
        assert_eq!(apply(&old, &hunks(&old, &new, 3)).unwrap(), new);
    }

    #[test]
    fn test_deletes_come_before_inserts() {
        let ops = diff_lines(&["a", "b", "c", "z"], &["a", "x", "y", "z"]);
        assert_eq!(
            ops,
            vec![
                LineOp::Equal("a"),
                LineOp::Delete("b"),
                LineOp::Delete("c"),
                LineOp::Insert("x"),
                LineOp::Insert("y"),
                LineOp::Equal("z"),
            ]
        );
    }

    #[test]
    fn test_apply_rejects_mismatch() {
        let hunks = hunks("a\nb", "a\nc", 3);
        assert_eq!(
            apply("a\nz", &hunks),
            Err(PatchError::Mismatch { line: 1 })
        );
    }
}
