use std::path::PathBuf;

use thiserror::Error;

use crate::progress::StepStatus;

/// Failure of an external formatter or linter.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to run {tool} `{program}`")]
    Spawn {
        tool: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status} for '{path}': {stderr}")]
    Failed {
        tool: &'static str,
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// A hunk could not be applied to the text it was computed against.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("hunk line {line} does not match the original text")]
    Mismatch { line: usize },

    #[error("hunk expected to start at output line {expected}, found {actual}")]
    Misaligned { expected: usize, actual: usize },

    #[error("hunk covers lines past the end of the original text")]
    OutOfRange,
}

/// A progress step was asked to move backwards or skip a state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("step '{step}' cannot move from {from} to {to}")]
pub struct TransitionError {
    pub step: String,
    pub from: StepStatus,
    pub to: StepStatus,
}

/// Finalizing stopped part way through.
///
/// Files in `committed` are already in place; nothing is rolled back.
#[derive(Debug, Error)]
#[error(
    "failed to finalize '{}' after committing {} file(s)",
    failed.display(),
    committed.len()
)]
pub struct PartialCommit {
    pub committed: Vec<PathBuf>,
    pub failed: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}
