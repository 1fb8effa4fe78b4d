//! Main execution engine - drives a pipeline run from start to finish

use crate::{
    core::{Diagnostic, ExecutionState, Pipeline, PipelineResult, RunStatus, Step},
    execution::{process::CommandRunner, StepExecutor},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        total_steps: usize,
    },
    StepStarted {
        index: usize,
        step: Step,
    },
    StepCompleted {
        index: usize,
    },
    StepFailed {
        index: usize,
        error: String,
        /// Whether the run continues past this failure
        continuing: bool,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Runs pipelines one step at a time
pub struct ExecutionEngine<R> {
    executor: StepExecutor<R>,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            executor: StepExecutor::new(runner),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute the entire pipeline
    ///
    /// Steps run strictly in order, each one receiving the state produced
    /// by the one before it. A failing step either aborts the run or, with
    /// keep-going set, is recorded as a diagnostic and the run continues
    /// with empty data and the arguments it had before the failure.
    pub async fn execute(&self, pipeline: &Pipeline) -> PipelineResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total_steps = pipeline.len();

        info!(
            "Starting pipeline run {} ({} steps, keep_going={})",
            run_id,
            total_steps,
            pipeline.keep_going()
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            total_steps,
        });

        let mut state = ExecutionState::new();
        let mut diagnostics = Vec::new();
        let mut steps_run = 0;

        for (index, step) in pipeline.steps().iter().enumerate() {
            self.emit_event(ExecutionEvent::StepStarted {
                index,
                step: step.clone(),
            });
            steps_run += 1;

            match self.executor.execute(index, step, &state).await {
                Ok(next) => {
                    state = next;
                    self.emit_event(ExecutionEvent::StepCompleted { index });
                }
                Err(error) if pipeline.keep_going() => {
                    warn!("Step {} failed, continuing: {}", index, error.kind);
                    self.emit_event(ExecutionEvent::StepFailed {
                        index,
                        error: error.kind.to_string(),
                        continuing: true,
                    });
                    diagnostics.push(Diagnostic::from(&error));
                    // Partial output of the failed step is not passed on
                    state.data.clear();
                }
                Err(error) => {
                    warn!("Step {} failed, aborting run {}: {}", index, run_id, error.kind);
                    self.emit_event(ExecutionEvent::StepFailed {
                        index,
                        error: error.kind.to_string(),
                        continuing: false,
                    });
                    self.emit_event(ExecutionEvent::PipelineCompleted {
                        run_id,
                        status: RunStatus::Aborted,
                    });

                    return PipelineResult {
                        run_id,
                        status: RunStatus::Aborted,
                        failed_at: Some(index),
                        error: Some(error),
                        final_data: state.data,
                        final_args: state.args,
                        diagnostics,
                        steps_run,
                        started_at,
                        finished_at: Utc::now(),
                    };
                }
            }
        }

        info!(
            "Pipeline run {} completed with {} recorded failures",
            run_id,
            diagnostics.len()
        );
        self.emit_event(ExecutionEvent::PipelineCompleted {
            run_id,
            status: RunStatus::Completed,
        });

        PipelineResult {
            run_id,
            status: RunStatus::Completed,
            failed_at: None,
            error: None,
            final_data: state.data,
            final_args: state.args,
            diagnostics,
            steps_run,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
