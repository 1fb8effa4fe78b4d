//! Execution state models

use crate::core::error::StepExecutionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `(data, args)` pair handed from one step to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionState {
    /// Text payload, fed to the next program's stdin
    pub data: String,

    /// Extra arguments for the next exec step
    pub args: Vec<String>,
}

impl ExecutionState {
    /// State before the first step: no data, no arguments
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(data: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            data: data.into(),
            args,
        }
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every step ran (failures may have been recorded with keep-going)
    Completed,
    /// A step failed and the run stopped there
    Aborted,
}

/// A step failure that a keep-going run continued past
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Index of the failed step
    pub index: usize,

    /// Rendered cause
    pub message: String,
}

impl From<&StepExecutionError> for Diagnostic {
    fn from(error: &StepExecutionError) -> Self {
        Self {
            index: error.index,
            message: error.kind.to_string(),
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Unique run ID
    pub run_id: Uuid,

    pub status: RunStatus,

    /// Index of the step that aborted the run
    pub failed_at: Option<usize>,

    /// The error that aborted the run
    pub error: Option<StepExecutionError>,

    /// Data left after the last step that ran
    pub final_data: String,

    /// Arguments left after the last step that ran
    pub final_args: Vec<String>,

    /// Failures recorded while keep-going was on
    pub diagnostics: Vec<Diagnostic>,

    /// Number of steps that were started
    pub steps_run: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Whether any step failed, aborting or not
    pub fn has_failures(&self) -> bool {
        self.error.is_some() || !self.diagnostics.is_empty()
    }
}
