//! Step-by-step execution with progress reporting.
//!
//! A [`StepRunner`] owns an ordered list of described actions. Running it
//! reports every status transition to an observer and stops at the first
//! failing step.

use std::fmt;

use eyre::Result;
use tracing::{error, info};

use crate::TransitionError;

/// Status of a progress step. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    Incomplete,
    InProgress,
    Complete,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Whether a step in this status may move to `next`.
    pub fn can_advance_to(self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (Self::Incomplete, Self::InProgress)
                | (Self::InProgress, Self::Complete)
                | (Self::InProgress, Self::Error)
        )
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A described step and its current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    description: String,
    status: StepStatus,
}

impl ProgressStep {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: StepStatus::Incomplete,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Move to `next`, rejecting backward or skipping transitions.
    pub fn set_status(&mut self, next: StepStatus) -> std::result::Result<(), TransitionError> {
        if !self.status.can_advance_to(next) {
            return Err(TransitionError {
                step: self.description.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

type StepAction<'a, C> = Box<dyn FnOnce(&mut C) -> Result<()> + 'a>;

/// Sequential executor of described steps over a shared context.
///
/// # Example
///
/// ```
/// use graft_codegen::progress::StepRunner;
///
/// let mut log = Vec::new();
/// let steps = StepRunner::new()
///     .step("first", |log: &mut Vec<u32>| {
///         log.push(1);
///         Ok(())
///     })
///     .step("second", |log: &mut Vec<u32>| {
///         log.push(2);
///         Ok(())
///     });
///
/// let finished = steps.run(&mut log, |_| {}).unwrap();
/// assert_eq!(log, [1, 2]);
/// assert_eq!(finished.len(), 2);
/// ```
pub struct StepRunner<'a, C> {
    steps: Vec<(String, StepAction<'a, C>)>,
}

impl<'a, C> StepRunner<'a, C> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    pub fn step(
        mut self,
        description: impl Into<String>,
        action: impl FnOnce(&mut C) -> Result<()> + 'a,
    ) -> Self {
        self.steps.push((description.into(), Box::new(action)));
        self
    }

    /// Append a step only when `condition` holds.
    pub fn step_if(
        self,
        condition: bool,
        description: impl Into<String>,
        action: impl FnOnce(&mut C) -> Result<()> + 'a,
    ) -> Self {
        if condition {
            self.step(description, action)
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(d, _)| d.as_str())
    }

    /// Run every step in order.
    ///
    /// The observer sees the full list once before any step runs and again
    /// after every status change. On failure the step is marked
    /// [`StepStatus::Error`], no later step runs, and the error is returned
    /// wrapped with the step description.
    pub fn run(
        self,
        ctx: &mut C,
        mut observer: impl FnMut(&[ProgressStep]),
    ) -> Result<Vec<ProgressStep>> {
        let (descriptions, actions): (Vec<_>, Vec<_>) = self.steps.into_iter().unzip();
        let mut progress: Vec<ProgressStep> =
            descriptions.into_iter().map(ProgressStep::new).collect();
        observer(&progress);

        for (index, action) in actions.into_iter().enumerate() {
            progress[index].set_status(StepStatus::InProgress)?;
            info!(step = progress[index].description(), "starting");
            observer(&progress);

            match action(ctx) {
                Ok(()) => {
                    progress[index].set_status(StepStatus::Complete)?;
                    observer(&progress);
                }
                Err(err) => {
                    progress[index].set_status(StepStatus::Error)?;
                    error!(step = progress[index].description(), error = %err, "step failed");
                    observer(&progress);
                    let description = progress[index].description().to_string();
                    return Err(err.wrap_err(description));
                }
            }
        }

        Ok(progress)
    }
}

impl<C> Default for StepRunner<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}
