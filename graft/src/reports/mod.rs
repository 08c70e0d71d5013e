//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod generate;
mod list;
mod output;
mod progress;

pub use check::{CheckReport, ProjectFile};
pub use generate::GenerateReport;
pub use list::ListReport;
pub use output::{Output, Report, TerminalOutput};
pub use progress::ProgressPrinter;
