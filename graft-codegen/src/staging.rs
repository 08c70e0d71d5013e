//! Two-phase output: stage now, commit later.
//!
//! Generated content is formatted and written under a staging root that
//! mirrors the project layout. Each staged file yields a [`FinalizeAction`]
//! that moves it into the destination tree. A [`Session`] collects the
//! actions of one generation run and commits them together.

use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use eyre::{Result, WrapErr};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::{NoopTools, PartialCommit, SourceTools};

/// Writes formatted content under the staging root.
#[derive(Clone)]
pub struct Stager {
    project_root: PathBuf,
    staging_root: PathBuf,
    tools: Arc<dyn SourceTools>,
}

impl std::fmt::Debug for Stager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stager")
            .field("project_root", &self.project_root)
            .field("staging_root", &self.staging_root)
            .finish_non_exhaustive()
    }
}

impl Stager {
    pub fn new(
        project_root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
        tools: Arc<dyn SourceTools>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            staging_root: staging_root.into(),
            tools,
        }
    }

    /// A stager that neither formats nor lints.
    pub fn without_tools(
        project_root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
    ) -> Self {
        Self::new(project_root, staging_root, Arc::new(NoopTools))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Where `destination` is staged.
    ///
    /// The path relative to the project root is mirrored under the staging
    /// root; parent and root components are dropped.
    pub fn staged_path(&self, destination: &Path) -> PathBuf {
        let relative = destination
            .strip_prefix(&self.project_root)
            .unwrap_or(destination);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .fold(self.staging_root.clone(), |path, part| path.join(part))
    }

    /// Format `content` and write it to the staging area.
    ///
    /// The destination tree is not touched.
    pub fn stage(&self, content: &str, destination: &Path) -> Result<FinalizeAction> {
        let formatted = self
            .tools
            .format(content, destination)
            .wrap_err_with(|| format!("failed to format {}", destination.display()))?;

        let staged = self.staged_path(destination);
        graft_core::write_file(&staged, &formatted)?;
        debug!(staged = %staged.display(), destination = %destination.display(), "staged");

        Ok(FinalizeAction {
            staged,
            destination: destination.to_path_buf(),
            tools: Arc::clone(&self.tools),
        })
    }
}

/// Deferred commit of one staged file.
///
/// [`commit`](FinalizeAction::commit) consumes the action, so a staged file
/// is committed at most once.
pub struct FinalizeAction {
    staged: PathBuf,
    destination: PathBuf,
    tools: Arc<dyn SourceTools>,
}

impl std::fmt::Debug for FinalizeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinalizeAction")
            .field("staged", &self.staged)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

impl FinalizeAction {
    pub fn staged(&self) -> &Path {
        &self.staged
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Move the staged file into place and lint-fix it.
    pub fn commit(self) -> Result<PathBuf> {
        if let Some(parent) = self.destination.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }

        if let Err(err) = fs::rename(&self.staged, &self.destination) {
            warn!(error = %err, staged = %self.staged.display(), "rename failed, copying instead");
            fs::copy(&self.staged, &self.destination).wrap_err_with(|| {
                format!(
                    "failed to copy {} to {}",
                    self.staged.display(),
                    self.destination.display()
                )
            })?;
            fs::remove_file(&self.staged)
                .wrap_err_with(|| format!("failed to remove {}", self.staged.display()))?;
        }

        self.tools
            .lint_fix(&self.destination)
            .wrap_err_with(|| format!("failed to lint {}", self.destination.display()))?;

        info!(path = %self.destination.display(), "committed");
        Ok(self.destination)
    }
}

/// Staged state of one generation run.
///
/// Reads go through the session, so a file staged earlier in the run is seen
/// with its pending content. Staging the same destination again replaces the
/// pending action in place.
#[derive(Debug)]
pub struct Session {
    stager: Stager,
    pending: IndexMap<PathBuf, FinalizeAction>,
}

impl Session {
    pub fn new(stager: Stager) -> Self {
        Self {
            stager,
            pending: IndexMap::new(),
        }
    }

    pub fn stager(&self) -> &Stager {
        &self.stager
    }

    /// Resolve a path relative to the project root.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.stager.project_root().join(relative)
    }

    /// Current content of `destination`, including pending changes.
    pub fn read(&self, destination: &Path) -> Result<String> {
        match self.pending.get(destination) {
            Some(action) => graft_core::read_file(action.staged()),
            None => graft_core::read_file(destination),
        }
    }

    /// Stage new content for `destination`.
    pub fn stage(&mut self, destination: &Path, content: &str) -> Result<()> {
        let action = self.stager.stage(content, destination)?;
        self.pending.insert(destination.to_path_buf(), action);
        Ok(())
    }

    /// Destinations with pending content, in first-staged order.
    pub fn pending(&self) -> impl Iterator<Item = &FinalizeAction> {
        self.pending.values()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Commit every pending action in order.
    ///
    /// Stops at the first failure; files committed before it stay in place.
    pub fn finalize(&mut self) -> std::result::Result<Vec<PathBuf>, PartialCommit> {
        let pending = std::mem::take(&mut self.pending);
        let mut committed = Vec::with_capacity(pending.len());

        for (destination, action) in pending {
            match action.commit() {
                Ok(path) => committed.push(path),
                Err(err) => {
                    return Err(PartialCommit {
                        committed,
                        failed: destination,
                        source: err.into(),
                    });
                }
            }
        }
        Ok(committed)
    }
}
