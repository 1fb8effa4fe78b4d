//! CLI output formatting

use crate::{
    core::{Diagnostic, RunStatus, Step},
    execution::ExecutionEvent,
    persistence::RunSummary,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Widest rule drawn, even on very wide terminals
const MAX_RULE_WIDTH: usize = 80;

/// Create a spinner shown while a pipeline runs
pub fn create_spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// A horizontal rule sized to the terminal
pub fn rule() -> String {
    let width = term_size::dimensions_stdout()
        .map(|(w, _)| w)
        .unwrap_or(MAX_RULE_WIDTH)
        .min(MAX_RULE_WIDTH);
    style("─".repeat(width)).dim().to_string()
}

/// Format one numbered step for `list`
pub fn format_step_line(index: usize, step: &Step) -> String {
    format!("  {} {}", style(format!("[{}]", index)).dim(), step)
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Aborted => style("ABORTED").red().to_string(),
    }
}

/// Format a diagnostic recorded by a keep-going run
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "{}step {}: {}",
        WARN,
        style(diagnostic.index).yellow(),
        style(&diagnostic.message).dim()
    )
}

/// Format an argument list, quoting arguments that contain whitespace
pub fn format_args(args: &[String]) -> String {
    let quoted: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("{:?}", arg)
            } else {
                arg.clone()
            }
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Format a run history entry for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed if summary.diagnostics.is_empty() => CHECK,
        RunStatus::Completed => WARN,
        RunStatus::Aborted => CROSS,
    };

    let mut line = format!(
        "{}{} - {} - {} - {} ({}/{} steps)",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(summary.started_at.format("%Y-%m-%d %H:%M:%S")).dim(),
        style(&summary.pipeline_path).bold(),
        format_status(summary.status),
        summary.steps_run,
        summary.total_steps,
    );
    if let Some(index) = summary.failed_at {
        line.push_str(&format!(" - failed at step {}", index));
    }
    if !summary.diagnostics.is_empty() {
        line.push_str(&format!(" - {} recorded failures", summary.diagnostics.len()));
    }
    line
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            total_steps,
        } => format!(
            "{}Running {} steps ({})",
            ROCKET,
            style(total_steps).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted { index, step } => {
            format!("{}[{}] {}", SPINNER, index, style(step).cyan())
        }
        ExecutionEvent::StepCompleted { index } => {
            format!("{}[{}]", CHECK, style(index).green())
        }
        ExecutionEvent::StepFailed {
            index,
            error,
            continuing,
        } => {
            let suffix = if *continuing { " (continuing)" } else { "" };
            format!(
                "{}[{}] {}{}",
                CROSS,
                style(index).red(),
                style(error).dim(),
                suffix
            )
        }
        ExecutionEvent::PipelineCompleted { run_id, status } => format!(
            "{}Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
