//! Test utility functions for pipeline scenarios

use async_trait::async_trait;
use pipeline_shell::core::{Pipeline, PipelineResult, RunStatus, StepErrorKind};
use pipeline_shell::execution::{CommandOutput, CommandRunner, ExecutionEngine, ExecutionEvent};
use std::sync::{Arc, Mutex};

/// One recorded program invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub input: String,
}

/// Runner that fakes a handful of programs by name
///
/// - `echo ARGS...` prints its arguments joined by spaces
/// - `cat` prints its input
/// - `upper` prints its input in upper case
/// - `fail` exits with code 1 and writes "boom" to stderr
/// - `missing` cannot be launched
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, argv: &[String], input: &str) -> Result<CommandOutput, StepErrorKind> {
        self.calls.lock().unwrap().push(Invocation {
            argv: argv.to_vec(),
            input: input.to_string(),
        });

        match argv[0].as_str() {
            "echo" => Ok(CommandOutput::success(format!("{}\n", argv[1..].join(" ")))),
            "cat" => Ok(CommandOutput::success(input)),
            "upper" => Ok(CommandOutput::success(input.to_uppercase())),
            "fail" => Ok(CommandOutput::failure(1, "boom\n")),
            program => Err(StepErrorKind::Launch {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

/// Run a pipeline with the scripted runner, collecting every event
pub async fn run_pipeline_with_script(
    pipeline: &Pipeline,
    runner: ScriptedRunner,
) -> (PipelineResult, Vec<ExecutionEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut engine = ExecutionEngine::new(runner);
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

    let result = engine.execute(pipeline).await;
    let events = events.lock().unwrap().clone();
    (result, events)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Assert that the run completed without any recorded failure
pub fn assert_clean_completion(result: &PipelineResult) {
    assert_eq!(
        result.status,
        RunStatus::Completed,
        "expected completion, got {:?}",
        result.error
    );
    assert!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
}

/// Assert that the run aborted at `index`
pub fn assert_aborted_at(result: &PipelineResult, index: usize) {
    assert_eq!(result.status, RunStatus::Aborted);
    assert_eq!(result.failed_at, Some(index));
    let error = result.error.as_ref().expect("aborted run should carry its error");
    assert_eq!(error.index, index);
}

/// Indices of the steps that were started, in order
pub fn started_steps(events: &[ExecutionEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            ExecutionEvent::StepStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}
