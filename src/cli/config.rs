//! Shell configuration

use crate::cli::Cli;
use std::path::PathBuf;

/// Default REPL prompt
pub const DEFAULT_PROMPT: &str = "Pipeline> ";

/// Configuration for the interactive shell
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Where the pipeline is loaded from and saved to
    pub pipeline_path: PathBuf,

    /// Initial keep-going flag for the pipeline
    pub keep_going: bool,

    /// Record each run in the history backend
    pub record_history: bool,

    /// Show a spinner while a run is in progress
    pub show_progress: bool,

    pub prompt: String,
}

impl ShellConfig {
    pub fn new(pipeline_path: impl Into<PathBuf>) -> Self {
        Self {
            pipeline_path: pipeline_path.into(),
            keep_going: false,
            record_history: true,
            show_progress: true,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn with_history(mut self, record_history: bool) -> Self {
        self.record_history = record_history;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

impl From<&Cli> for ShellConfig {
    fn from(cli: &Cli) -> Self {
        Self::new(cli.filename.clone())
            .with_keep_going(cli.keep_going)
            .with_history(!cli.no_history)
    }
}
