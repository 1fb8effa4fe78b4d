//! Test: Failure Handling - aborting and keep-going runs

use crate::helpers::*;
use pipeline_shell::core::{ArgsStep, ExecStep, Pipeline, RunStatus, StepErrorKind, StoreStep};
use pipeline_shell::execution::ExecutionEvent;

/// Without keep-going the first failure stops the run
#[tokio::test]
async fn test_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("never.txt");

    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "fine"]).unwrap());
    pipeline.append(ExecStep::new(["fail"]).unwrap());
    pipeline.append(StoreStep::new(&target));

    let (result, events) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_aborted_at(&result, 1);
    assert_eq!(result.steps_run, 2);
    assert_eq!(started_steps(&events), vec![0, 1]);
    assert!(!target.exists());

    match &result.error.as_ref().unwrap().kind {
        StepErrorKind::NonZeroExit { status, stderr } => {
            assert_eq!(*status, Some(1));
            assert_eq!(stderr, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// With keep-going the failure is recorded and the next step gets empty data
#[tokio::test]
async fn test_keep_going_continues_with_empty_data() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("after.txt");

    let mut pipeline = Pipeline::new();
    pipeline.set_keep_going(true);
    pipeline.append(ExecStep::new(["echo", "lost"]).unwrap());
    pipeline.append(ExecStep::new(["fail"]).unwrap());
    pipeline.append(StoreStep::new(&target));

    let (result, events) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.has_failures());
    assert_eq!(result.steps_run, 3);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].index, 1);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "");

    assert!(events.iter().any(|event| matches!(
        event,
        ExecutionEvent::StepFailed {
            index: 1,
            continuing: true,
            ..
        }
    )));
}

/// Arguments gathered before a failure survive it
#[tokio::test]
async fn test_keep_going_keeps_args() {
    let mut pipeline = Pipeline::new();
    pipeline.set_keep_going(true);
    pipeline.append(ExecStep::new(["echo", "one two"]).unwrap());
    pipeline.append(ArgsStep::whitespace());
    pipeline.append(ExecStep::new(["missing"]).unwrap());
    pipeline.append(ExecStep::new(["echo"]).unwrap());

    let runner = ScriptedRunner::new();
    let (result, _) = run_pipeline_with_script(&pipeline, runner.clone()).await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].message.contains("failed to launch 'missing'"));

    let calls = runner.calls();
    assert_eq!(calls[1].argv, strings(&["missing", "one", "two"]));
    assert_eq!(calls[2].argv, strings(&["echo", "one", "two"]));
    assert_eq!(result.final_data, "one two\n");
}

/// A bad split pattern is a step failure like any other
#[tokio::test]
async fn test_invalid_pattern_fails_step() {
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "a"]).unwrap());
    pipeline.append(ArgsStep::pattern("(unclosed"));

    let (result, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_aborted_at(&result, 1);
    assert!(matches!(
        result.error.unwrap().kind,
        StepErrorKind::PatternError { .. }
    ));
}

/// An unwritable store target aborts the run
#[tokio::test]
async fn test_store_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a file
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "x"]).unwrap());
    pipeline.append(StoreStep::new(dir.path()));

    let (result, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_aborted_at(&result, 1);
    assert!(matches!(
        result.error.unwrap().kind,
        StepErrorKind::Io { .. }
    ));
    // Data produced before the failure is still reported
    assert_eq!(result.final_data, "x\n");
}
