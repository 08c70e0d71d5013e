//! A staged run commits nothing until its finalize step runs.

use std::{fs, path::Path};

use graft_codegen::{ProgressStep, Session, Stager, StepRunner, StepStatus};

fn setup(dir: &Path) -> Session {
    let root = dir.join("src");
    graft_core::write_file(&root.join("a.ts"), "a original\n").unwrap();
    graft_core::write_file(&root.join("b.ts"), "b original\n").unwrap();
    Session::new(Stager::without_tools(root, dir.join("staging")))
}

#[test]
fn test_failing_step_leaves_destinations_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = setup(dir.path());
    let a = session.resolve("a.ts");
    let b = session.resolve("b.ts");

    let mut history: Vec<Vec<ProgressStep>> = Vec::new();
    let runner = StepRunner::new()
        .step("Updating a", |s: &mut Session| {
            let path = s.resolve("a.ts");
            s.stage(&path, "a updated\n")
        })
        .step("Updating b", |s: &mut Session| {
            let path = s.resolve("b.ts");
            s.stage(&path, "b updated\n")
        })
        .step("Updating c", |_: &mut Session| Err(eyre::eyre!("c is malformed")))
        .step("Copying and finalizing output", |s: &mut Session| {
            s.finalize()?;
            Ok(())
        });

    let err = runner
        .run(&mut session, |steps| history.push(steps.to_vec()))
        .unwrap_err();

    assert_eq!(err.to_string(), "Updating c");
    assert_eq!(fs::read_to_string(&a).unwrap(), "a original\n");
    assert_eq!(fs::read_to_string(&b).unwrap(), "b original\n");

    let last = history.last().unwrap();
    assert_eq!(last[2].status(), StepStatus::Error);
    assert!(
        history
            .iter()
            .all(|steps| steps[3].status() == StepStatus::Incomplete)
    );
    // The first report lists every step before anything runs
    assert!(
        history[0]
            .iter()
            .all(|s| s.status() == StepStatus::Incomplete)
    );
}

#[test]
fn test_successful_run_commits_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = setup(dir.path());
    let a = session.resolve("a.ts");

    let runner = StepRunner::new()
        .step("Editing a", |s: &mut Session| {
            let path = s.resolve("a.ts");
            let current = s.read(&path)?;
            s.stage(&path, &format!("{current}// first\n"))
        })
        .step("Editing a again", |s: &mut Session| {
            let path = s.resolve("a.ts");
            let current = s.read(&path)?;
            s.stage(&path, &format!("{current}// second\n"))
        })
        .step("Copying and finalizing output", |s: &mut Session| {
            s.finalize()?;
            Ok(())
        });

    let steps = runner.run(&mut session, |_| {}).unwrap();
    assert!(steps.iter().all(|s| s.status() == StepStatus::Complete));
    assert_eq!(
        fs::read_to_string(&a).unwrap(),
        "a original\n// first\n// second\n"
    );
}
