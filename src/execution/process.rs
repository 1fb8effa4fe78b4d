//! Program invocation for exec steps
//!
//! The child's stdin is written while its stdout and stderr are drained,
//! so programs that produce output before consuming all of their input
//! cannot block on a full pipe.

use crate::core::StepErrorKind;
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,

    /// Whether the program exited with status zero
    pub success: bool,

    /// Exit code, `None` when the program was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// A zero exit with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// A non-zero exit with the given stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            code: Some(code),
        }
    }
}

/// Trait for running programs - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` with `input` on stdin and capture its output
    async fn run(&self, argv: &[String], input: &str) -> Result<CommandOutput, StepErrorKind>;
}

/// Runs programs as child processes of this one
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String], input: &str) -> Result<CommandOutput, StepErrorKind> {
        let (program, rest) = argv.split_first().ok_or_else(|| StepErrorKind::Launch {
            program: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command line"),
        })?;

        debug!(
            "Spawning {:?} with {} bytes of input",
            argv,
            input.len()
        );

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| StepErrorKind::Launch {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            match stdin {
                Some(mut stdin) => {
                    let written = stdin.write_all(input.as_bytes()).await;
                    // Dropping the handle closes the pipe and signals EOF
                    drop(stdin);
                    written
                }
                None => Ok(()),
            }
        };

        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|source| StepErrorKind::Io { path: None, source })?;

        if let Err(e) = written {
            // The program may legitimately exit without reading all input
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(StepErrorKind::Io {
                    path: None,
                    source: e,
                });
            }
            debug!("{} closed stdin before reading all input", program);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!(
                "{} exited with status {}: {}",
                program,
                output.status,
                stderr.trim()
            );
        } else if !stderr.is_empty() {
            debug!("{} wrote to stderr: {}", program, stderr.trim());
        }

        debug!("{} returned {} bytes of output", program, stdout.len());

        Ok(CommandOutput {
            stdout,
            stderr,
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}
