//! Generation report data structures.

use std::path::{Path, PathBuf};

use graft_typescript::Generation;

use super::output::{Output, Report};

/// Files touched by a generation run.
#[derive(Debug)]
pub struct GenerateReport {
    /// What was generated, e.g. "domain store ProfileStore".
    pub element: String,
    /// Destinations written.
    pub committed: Vec<PathBuf>,
    /// `(destination, staged file)` pairs of a dry run.
    pub staged: Vec<(PathBuf, PathBuf)>,
    pub dry_run: bool,
}

impl GenerateReport {
    /// Paths are shown relative to `base_dir` where possible.
    pub fn new(element: String, generation: Generation, base_dir: &Path, dry_run: bool) -> Self {
        let relative = |path: PathBuf| match path.strip_prefix(base_dir) {
            Ok(stripped) => stripped.to_path_buf(),
            Err(_) => path,
        };
        Self {
            element,
            committed: generation.committed.into_iter().map(relative).collect(),
            staged: generation
                .staged
                .into_iter()
                .map(|(destination, staged)| (relative(destination), relative(staged)))
                .collect(),
            dry_run,
        }
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        out.newline();
        if self.dry_run {
            out.preformatted(&format!("Dry run for {}, nothing was written", self.element));
            out.section("Staged");
            for (destination, staged) in &self.staged {
                out.list_item(&format!("{} <- {}", destination.display(), staged.display()));
            }
            return;
        }

        out.preformatted(&format!("Generated {}", self.element));
        for path in &self.committed {
            out.added_item(&path.display().to_string());
        }
    }
}
