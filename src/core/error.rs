//! Error types for steps, pipelines and pipeline files

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A step failed while running
#[derive(Debug, Error)]
#[error("step {index} failed: {kind}")]
pub struct StepExecutionError {
    /// Position of the failing step in the pipeline
    pub index: usize,

    /// What went wrong
    pub kind: StepErrorKind,
}

impl StepExecutionError {
    pub fn new(index: usize, kind: StepErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Underlying cause of a step failure
#[derive(Debug, Error)]
pub enum StepErrorKind {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{}", describe_exit(.status, .stderr))]
    NonZeroExit {
        /// Exit code, `None` when the process was killed by a signal
        status: Option<i32>,
        stderr: String,
    },

    #[error("I/O error{}: {source}", describe_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("invalid split pattern '{pattern}': {source}")]
    PatternError {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn describe_exit(status: &Option<i32>, stderr: &str) -> String {
    let head = match status {
        Some(code) => format!("exited with code {}", code),
        None => "terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        head
    } else {
        format!("{}: {}", head, stderr)
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" on {}", p.display()))
        .unwrap_or_default()
}

/// Error editing a pipeline's step list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("step index {index} out of range (pipeline has {len} steps)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A step was constructed with invalid configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepConfigError {
    #[error("exec step needs a program to run")]
    EmptyProgram,
}

/// Error saving or loading a pipeline file
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access pipeline file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pipeline file {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },
}
