//! Live rendering of generation steps.

use graft_codegen::{ProgressStep, StepStatus};

use super::output::Output;

/// Renders each step once per status change.
///
/// The observer of a generation run receives the whole step list on every
/// update; only the steps whose status moved since the previous update are
/// printed.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    seen: Vec<StepStatus>,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, steps: &[ProgressStep], out: &mut dyn Output) {
        self.seen.resize(steps.len(), StepStatus::Incomplete);
        for (seen, step) in self.seen.iter_mut().zip(steps) {
            if *seen != step.status() {
                *seen = step.status();
                out.step(step.status(), step.description());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    fn steps(statuses: &[StepStatus]) -> Vec<ProgressStep> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut step = ProgressStep::new(format!("step {i}"));
                if *status != StepStatus::Incomplete {
                    step.set_status(StepStatus::InProgress).unwrap();
                }
                if status.is_finished() {
                    step.set_status(*status).unwrap();
                }
                step
            })
            .collect()
    }

    #[test]
    fn test_prints_transitions_only() {
        use StepStatus::*;

        let mut printer = ProgressPrinter::new();
        let mut out = RecordedOutput::default();
        for update in [
            [Incomplete, Incomplete],
            [InProgress, Incomplete],
            [Complete, Incomplete],
            [Complete, InProgress],
            [Complete, Error],
        ] {
            printer.observe(&steps(&update), &mut out);
        }

        assert_eq!(
            out.lines,
            [
                "in progress: step 0",
                "complete: step 0",
                "in progress: step 1",
                "error: step 1",
            ]
        );
    }
}
