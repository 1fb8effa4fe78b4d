//! Step executor - runs individual steps

use crate::{
    core::{ArgsStep, ExecStep, ExecutionState, Step, StepErrorKind, StepExecutionError, StoreStep},
    execution::process::CommandRunner,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Executes a single step of any kind
pub struct StepExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> StepExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run `step` (at position `index`) on the incoming state
    ///
    /// The input state is never modified; the returned state is what the
    /// next step receives.
    pub async fn execute(
        &self,
        index: usize,
        step: &Step,
        state: &ExecutionState,
    ) -> Result<ExecutionState, StepExecutionError> {
        info!("Executing step {}: {}", index, step);

        let result = match step {
            Step::Exec(exec) => self.run_exec(exec, state).await,
            Step::Args(args) => run_args(args, state),
            Step::Store(store) => run_store(store, state).await,
        };

        result.map_err(|kind| StepExecutionError::new(index, kind))
    }

    /// Stdout becomes the data; the argument list is consumed
    async fn run_exec(
        &self,
        step: &ExecStep,
        state: &ExecutionState,
    ) -> Result<ExecutionState, StepErrorKind> {
        let argv = step.command_line(&state.args);
        let output = self.runner.run(&argv, &state.data).await?;

        if !output.success {
            return Err(StepErrorKind::NonZeroExit {
                status: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(ExecutionState::with(output.stdout, Vec::new()))
    }
}

/// The data is consumed into extra arguments
fn run_args(step: &ArgsStep, state: &ExecutionState) -> Result<ExecutionState, StepErrorKind> {
    let tokens = step.tokenize(&state.data)?;
    debug!("Split data into {} arguments", tokens.len());

    let mut args = state.args.clone();
    args.extend(tokens);
    Ok(ExecutionState::with(String::new(), args))
}

/// Write the data out, then pass the state through untouched
async fn run_store(step: &StoreStep, state: &ExecutionState) -> Result<ExecutionState, StepErrorKind> {
    let path = step.target_path();
    let io_error = |source| StepErrorKind::Io {
        path: Some(path.to_path_buf()),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let mut file = tokio::fs::File::create(path).await.map_err(io_error)?;
    file.write_all(state.data.as_bytes()).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;
    file.sync_all().await.map_err(io_error)?;

    debug!("Stored {} bytes to {}", state.data.len(), path.display());
    Ok(state.clone())
}
