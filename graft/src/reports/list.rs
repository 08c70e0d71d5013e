//! List command report data structures.

use graft_core::{Injectable, InjectableCategory};

use super::output::{Output, Report};

/// Registrations of one category.
#[derive(Debug)]
pub struct ListReport {
    pub category: InjectableCategory,
    pub injectables: Vec<Injectable>,
}

impl Report for ListReport {
    fn render(&self, out: &mut dyn Output) {
        if self.injectables.is_empty() {
            out.preformatted(&format!(
                "No {} registrations",
                self.category.label().to_lowercase()
            ));
            return;
        }

        out.section(&format!("{} ({})", self.category.label(), self.injectables.len()));
        for injectable in &self.injectables {
            out.list_item(&format!(
                "{} -> {} ({})",
                injectable.registration_key, injectable.name, injectable.module_path
            ));
        }

        let unresolved: Vec<_> = self
            .injectables
            .iter()
            .filter(|i| i.is_unresolved())
            .collect();
        if !unresolved.is_empty() {
            out.newline();
            for injectable in unresolved {
                out.warning(&format!(
                    "no import found for {} or {}",
                    injectable.name, injectable.interface_name
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use graft_core::UNKNOWN_MODULE;

    use super::*;
    use crate::reports::output::RecordedOutput;

    #[test]
    fn test_render_with_unresolved() {
        let report = ListReport {
            category: InjectableCategory::Service,
            injectables: vec![
                Injectable::new(
                    "AuthService",
                    "IAuthService",
                    "ServiceTypes.Auth",
                    "services/auth/AuthService",
                ),
                Injectable::new("Legacy", "ILegacy", "ServiceTypes.Legacy", UNKNOWN_MODULE),
            ],
        };
        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            [
                "Service (2):",
                "- ServiceTypes.Auth -> AuthService (services/auth/AuthService)",
                "- ServiceTypes.Legacy -> Legacy (UNKNOWN)",
                "",
                "warning: no import found for Legacy or ILegacy",
            ]
        );
    }

    #[test]
    fn test_render_empty() {
        let report = ListReport {
            category: InjectableCategory::ScreenStore,
            injectables: Vec::new(),
        };
        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(out.lines, ["No screen store registrations"]);
    }
}
