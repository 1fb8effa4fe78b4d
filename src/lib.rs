//! pipeline-shell - Build and run pipelines of programs from an interactive shell

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use core::{ArgsStep, ExecStep, ExecutionState, Pipeline, PipelineResult, RunStatus, Step, StoreStep};
pub use core::{PersistenceError, PipelineError, StepConfigError, StepErrorKind, StepExecutionError};
pub use execution::{CommandRunner, ExecutionEngine, ExecutionEvent, ProcessRunner};
pub use persistence::{HistoryBackend, InMemoryHistory, PipelineStore, RunSummary};
