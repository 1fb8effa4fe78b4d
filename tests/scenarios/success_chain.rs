//! Test: data and arguments flowing from step to step

use crate::helpers::*;
use pipeline_shell::core::{ArgsStep, ExecStep, Pipeline, StoreStep};
use pipeline_shell::execution::ExecutionEvent;

/// Each exec step sees the previous step's output on stdin
#[tokio::test]
async fn test_output_feeds_next_input() {
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "quiet", "words"]).unwrap());
    pipeline.append(ExecStep::new(["upper"]).unwrap());
    pipeline.append(ExecStep::new(["cat"]).unwrap());

    let runner = ScriptedRunner::new();
    let (result, events) = run_pipeline_with_script(&pipeline, runner.clone()).await;

    assert_clean_completion(&result);
    assert_eq!(result.final_data, "QUIET WORDS\n");
    assert!(result.final_args.is_empty());
    assert_eq!(result.steps_run, 3);
    assert_eq!(started_steps(&events), vec![0, 1, 2]);

    let inputs: Vec<String> = runner.calls().into_iter().map(|c| c.input).collect();
    assert_eq!(inputs, strings(&["", "quiet words\n", "QUIET WORDS\n"]));
}

/// An args step turns output into arguments for the next program
#[tokio::test]
async fn test_args_become_command_line() {
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "a.txt b.txt"]).unwrap());
    pipeline.append(ArgsStep::whitespace());
    pipeline.append(ExecStep::new(["echo", "-n"]).unwrap());

    let runner = ScriptedRunner::new();
    let (result, _) = run_pipeline_with_script(&pipeline, runner.clone()).await;

    assert_clean_completion(&result);
    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].argv, strings(&["echo", "-n", "a.txt", "b.txt"]));
    // Args consumed the data, so the program gets empty input
    assert_eq!(calls[1].input, "");
    assert_eq!(result.final_data, "-n a.txt b.txt\n");
}

/// Consecutive args steps accumulate
#[tokio::test]
async fn test_args_steps_accumulate() {
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "x,y"]).unwrap());
    pipeline.append(ArgsStep::literal(","));

    let (result, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_clean_completion(&result);
    assert_eq!(result.final_data, "");
    assert_eq!(result.final_args, strings(&["x", "y\n"]));
}

/// A regex split drops the separators
#[tokio::test]
async fn test_regex_args() {
    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "1;2,,3"]).unwrap());
    pipeline.append(ArgsStep::pattern(r"[;,\n]+"));

    let (result, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_clean_completion(&result);
    assert_eq!(result.final_args, strings(&["1", "2", "3", ""]));
}

/// A store step writes the data and leaves it in place for the next step
#[tokio::test]
async fn test_store_passes_data_through() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("out.txt");

    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "kept"]).unwrap());
    pipeline.append(StoreStep::new(&target));
    pipeline.append(ExecStep::new(["upper"]).unwrap());

    let (result, events) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_clean_completion(&result);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "kept\n");
    assert_eq!(result.final_data, "KEPT\n");
    assert!(matches!(
        events.last(),
        Some(ExecutionEvent::PipelineCompleted { .. })
    ));
}
