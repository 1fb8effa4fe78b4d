//! Pipeline domain model

use crate::core::{error::PipelineError, state::PipelineResult, step::Step};
use crate::execution::{ExecutionEngine, ProcessRunner};

/// An ordered list of steps plus the keep-going policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Steps in execution order
    steps: Vec<Step>,

    /// Record step failures and continue instead of aborting
    keep_going: bool,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from an existing step list (e.g. a loaded file)
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps,
            keep_going: false,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    pub fn set_keep_going(&mut self, keep_going: bool) {
        self.keep_going = keep_going;
    }

    /// Add a step at the end
    pub fn append(&mut self, step: impl Into<Step>) {
        self.steps.push(step.into());
    }

    /// Remove and return the last step
    pub fn remove_last(&mut self) -> Result<Step, PipelineError> {
        self.steps
            .pop()
            .ok_or(PipelineError::IndexOutOfRange { index: 0, len: 0 })
    }

    /// Remove and return the step at `index`
    pub fn remove(&mut self, index: usize) -> Result<Step, PipelineError> {
        if index >= self.steps.len() {
            return Err(PipelineError::IndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        Ok(self.steps.remove(index))
    }

    /// Run every step in order, spawning real processes for exec steps
    ///
    /// Each call is an independent run starting from empty data and no
    /// arguments.
    pub async fn run(&self) -> PipelineResult {
        ExecutionEngine::new(ProcessRunner::new()).execute(self).await
    }
}
