//! Persistence: saved pipeline files and the history of runs

pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteHistory;
pub use store::PipelineStore;

use crate::core::{Diagnostic, PipelineResult, RunStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// File the pipeline is saved to
    pub pipeline_path: String,

    pub status: RunStatus,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of steps in the pipeline
    pub total_steps: usize,

    /// Number of steps that were started
    pub steps_run: usize,

    /// Step that aborted the run, if any
    pub failed_at: Option<usize>,

    /// Failures recorded while keep-going was on
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for run history backends
#[async_trait::async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Record a finished run
    async fn record(&self, run: &RunSummary) -> Result<()>;

    /// Most recent runs first, at most `limit`
    async fn recent(&self, limit: usize) -> Result<Vec<RunSummary>>;
}

/// In-memory history (for testing or when history is turned off)
pub struct InMemoryHistory {
    runs: tokio::sync::RwLock<Vec<RunSummary>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryBackend for InMemoryHistory {
    async fn record(&self, run: &RunSummary) -> Result<()> {
        self.runs.write().await.push(run.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let mut recent: Vec<RunSummary> = runs.iter().cloned().collect();
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

/// Create a summary from a finished run
pub fn create_summary(result: &PipelineResult, pipeline_path: &str, total_steps: usize) -> RunSummary {
    RunSummary {
        run_id: result.run_id,
        pipeline_path: pipeline_path.to_string(),
        status: result.status,
        started_at: result.started_at,
        finished_at: result.finished_at,
        total_steps,
        steps_run: result.steps_run,
        failed_at: result.failed_at,
        diagnostics: result.diagnostics.clone(),
    }
}
