//! List operation - registrations of one category.

use eyre::Result;
use graft_core::InjectableCategory;
use graft_typescript::Project;

use crate::reports::ListReport;

pub fn list(project: &Project, category: InjectableCategory) -> Result<ListReport> {
    let injectables = project.available_injectables(category)?;
    Ok(ListReport {
        category,
        injectables,
    })
}
