//! Interactive shell for building and running pipelines
//!
//! The shell owns the pipeline, the store it is saved to and the run
//! history; each input line is parsed into a [`ShellCommand`] and
//! translated into calls on those objects.

use crate::{
    cli::{
        commands::{ShellCommand, HELP},
        config::ShellConfig,
        output::*,
    },
    core::{ArgsStep, ExecStep, Pipeline, PipelineResult, Step, StoreStep},
    execution::{ExecutionEngine, ProcessRunner},
    persistence::{create_summary, HistoryBackend, PipelineStore},
};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Lines of final data shown after a run before truncating
const MAX_OUTPUT_LINES: usize = 40;

/// Whether the read loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The pipeline REPL
pub struct Shell<W> {
    config: ShellConfig,
    pipeline: Pipeline,
    store: PipelineStore,
    history: Arc<dyn HistoryBackend>,
    /// Steps changed since the last load or save
    dirty: bool,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Create a shell, loading any pipeline saved at the configured path
    pub fn new(config: ShellConfig, history: Arc<dyn HistoryBackend>, out: W) -> Result<Self> {
        let store = PipelineStore::new(&config.pipeline_path);
        let mut pipeline = store
            .load_pipeline()
            .with_context(|| format!("Failed to load pipeline from {}", store.path().display()))?;
        pipeline.set_keep_going(config.keep_going);

        debug!("Shell started with {} steps", pipeline.len());

        Ok(Self {
            config,
            pipeline,
            store,
            history,
            dirty: false,
            out,
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The writer the shell prints to
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read commands until `quit` or end of input
    pub async fn run_loop<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            write!(self.out, "{}", self.config.prompt)?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read command")? else {
                writeln!(self.out)?;
                self.warn_if_unsaved()?;
                break;
            };

            if self.execute_line(&line).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Parse and run one line of input
    ///
    /// Usage errors and failed commands are reported to the user; only a
    /// failure to write output is returned as an error.
    pub async fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let command = match ShellCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{}{}", CROSS, e)?;
                return Ok(Flow::Continue);
            }
        };

        match self.dispatch(command).await {
            Ok(flow) => Ok(flow),
            Err(e) => {
                writeln!(self.out, "{}{:#}", CROSS, e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Carry out a parsed command
    pub async fn dispatch(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Exec(program_args) => {
                let step = ExecStep::new(program_args)?;
                self.append(step)?;
            }
            ShellCommand::Args { separator, regex } => {
                let step = match separator {
                    Some(pattern) if regex => ArgsStep::pattern(pattern),
                    separator => ArgsStep::new(separator),
                };
                self.append(step)?;
            }
            ShellCommand::Store(path) => self.append(StoreStep::new(path))?,
            ShellCommand::List { json } => self.list(json)?,
            ShellCommand::Remove(index) => {
                let removed = match index {
                    Some(index) => self.pipeline.remove(index)?,
                    None => self.pipeline.remove_last()?,
                };
                self.dirty = true;
                writeln!(self.out, "{}Removed: {}", INFO, removed)?;
            }
            ShellCommand::KeepGoing(value) => {
                if let Some(value) = value {
                    self.pipeline.set_keep_going(value);
                }
                let state = if self.pipeline.keep_going() { "on" } else { "off" };
                writeln!(self.out, "{}keep-going is {}", INFO, style(state).bold())?;
            }
            ShellCommand::Run => self.run().await?,
            ShellCommand::Save => {
                self.store.save(&self.pipeline)?;
                self.dirty = false;
                writeln!(
                    self.out,
                    "{}Saved {} steps to {}",
                    CHECK,
                    self.pipeline.len(),
                    style(self.store.path().display()).bold()
                )?;
            }
            ShellCommand::History(limit) => self.show_history(limit).await?,
            ShellCommand::Help => {
                for (usage, description) in HELP {
                    writeln!(self.out, "  {:<24} {}", style(usage).cyan(), description)?;
                }
            }
            ShellCommand::Quit => {
                self.warn_if_unsaved()?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn append(&mut self, step: impl Into<Step>) -> Result<()> {
        let step = step.into();
        writeln!(
            self.out,
            "{}Added step {}: {}",
            CHECK,
            self.pipeline.len(),
            step
        )?;
        self.pipeline.append(step);
        self.dirty = true;
        Ok(())
    }

    fn list(&mut self, json: bool) -> Result<()> {
        if json {
            let data = serde_json::json!({
                "keep_going": self.pipeline.keep_going(),
                "steps": self.pipeline.steps(),
            });
            writeln!(self.out, "{}", serde_json::to_string_pretty(&data)?)?;
            return Ok(());
        }

        if self.pipeline.is_empty() {
            writeln!(self.out, "{}The pipeline is empty", INFO)?;
        }
        for (index, step) in self.pipeline.steps().iter().enumerate() {
            writeln!(self.out, "{}", format_step_line(index, step))?;
        }
        writeln!(
            self.out,
            "{}keep-going is {}",
            INFO,
            if self.pipeline.keep_going() { "on" } else { "off" }
        )?;
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        let spinner = create_spinner(self.config.show_progress);
        let mut engine = ExecutionEngine::new(ProcessRunner::new());
        let progress = spinner.clone();
        engine.add_event_handler(move |event| {
            progress.set_message(console::strip_ansi_codes(&format_execution_event(event)).to_string());
        });

        let result = engine.execute(&self.pipeline).await;
        spinner.finish_and_clear();

        self.report(&result)?;

        if self.config.record_history {
            let path = self.store.path().display().to_string();
            let summary = create_summary(&result, &path, self.pipeline.len());
            if let Err(e) = self.history.record(&summary).await {
                warn!("Failed to record run in history: {:#}", e);
            }
        }
        Ok(())
    }

    fn report(&mut self, result: &PipelineResult) -> Result<()> {
        writeln!(self.out, "{}", rule())?;
        if !result.final_data.is_empty() {
            write!(self.out, "{}", format_output(&result.final_data, MAX_OUTPUT_LINES))?;
            if !result.final_data.ends_with('\n') {
                writeln!(self.out)?;
            }
        }
        if !result.final_args.is_empty() {
            writeln!(self.out, "{}args: {}", INFO, format_args(&result.final_args))?;
        }
        for diagnostic in &result.diagnostics {
            writeln!(self.out, "{}", format_diagnostic(diagnostic))?;
        }

        match (&result.error, result.failed_at) {
            (Some(error), Some(index)) => writeln!(
                self.out,
                "{}{} at step {} ({}): {}",
                CROSS,
                format_status(result.status),
                index,
                self.pipeline.steps()[index],
                style(&error.kind).red()
            )?,
            _ => writeln!(
                self.out,
                "{}{} ({} steps)",
                CHECK,
                format_status(result.status),
                result.steps_run
            )?,
        }
        Ok(())
    }

    async fn show_history(&mut self, limit: usize) -> Result<()> {
        let runs = self.history.recent(limit).await?;
        if runs.is_empty() {
            writeln!(self.out, "{}No runs recorded", INFO)?;
            return Ok(());
        }
        for run in &runs {
            writeln!(self.out, "  {}", format_run_summary(run))?;
        }
        Ok(())
    }

    fn warn_if_unsaved(&mut self) -> Result<()> {
        if self.dirty {
            writeln!(
                self.out,
                "{}Unsaved changes to {} were discarded",
                WARN,
                self.store.path().display()
            )?;
        }
        Ok(())
    }
}
