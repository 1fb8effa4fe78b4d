//! Pipeline execution engine

pub mod engine;
pub mod executor;
pub mod process;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::StepExecutor;
pub use process::{CommandOutput, CommandRunner, ProcessRunner};
