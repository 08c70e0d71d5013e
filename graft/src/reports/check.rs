//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// A file graft.toml points at.
#[derive(Debug)]
pub struct ProjectFile {
    /// Manifest key naming the file.
    pub key: &'static str,
    pub path: PathBuf,
    pub exists: bool,
}

/// Report data from manifest validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// Destination source root.
    pub project_root: PathBuf,
    pub files: Vec<ProjectFile>,
    /// Registration count per category label.
    pub registrations: Vec<(&'static str, usize)>,
    /// Containers that could not be read.
    pub errors: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }
        for file in self.files.iter().filter(|f| !f.exists) {
            out.warning(&format!("{} not found: {}", file.key, file.path.display()));
        }
        if !self.is_valid() {
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();
        out.key_value("Project root", &self.project_root.display().to_string());
        out.newline();

        out.section("Registrations");
        for (label, count) in &self.registrations {
            out.list_item(&format!("{label}: {count}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    #[test]
    fn test_render_valid() {
        let report = CheckReport {
            config_path: "graft.toml".into(),
            project_root: "src".into(),
            files: vec![ProjectFile {
                key: "feature.config_model",
                path: "src/config/ConfigModel.ts".into(),
                exists: false,
            }],
            registrations: vec![("Service", 2), ("Domain Store", 0)],
            errors: Vec::new(),
        };
        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            [
                "warning: feature.config_model not found: src/config/ConfigModel.ts",
                "✓ graft.toml is valid",
                "",
                "Project root: src",
                "",
                "Registrations:",
                "- Service: 2",
                "- Domain Store: 0",
            ]
        );
    }
}
