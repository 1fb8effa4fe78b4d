//! SQLite-based run history

use crate::core::RunStatus;
use crate::persistence::{HistoryBackend, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// SQLite run history
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Open (or create) the history database at `db_path`
    pub async fn new(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open history database {}", db_path.display()))?;

        let history = Self { pool };
        history.init().await?;

        Ok(history)
    }

    /// Open the history database at the default location
    pub async fn with_default_path() -> Result<Self> {
        let db_path = Self::default_path();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Self::new(&db_path).await
    }

    /// `<local data dir>/pipeline-shell/history.db`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pipeline-shell")
            .join("history.db")
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                pipeline_path TEXT NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                total_steps INTEGER NOT NULL DEFAULT 0,
                steps_run INTEGER NOT NULL DEFAULT 0,
                failed_at INTEGER,
                diagnostics TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_runs_started_at ON runs(started_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to initialize history schema")?;

        Ok(())
    }

    fn status_to_str(status: RunStatus) -> &'static str {
        match status {
            RunStatus::Completed => "Completed",
            RunStatus::Aborted => "Aborted",
        }
    }

    fn status_from_str(value: &str) -> Result<RunStatus> {
        match value {
            "Completed" => Ok(RunStatus::Completed),
            "Aborted" => Ok(RunStatus::Aborted),
            other => anyhow::bail!("Unknown run status in history: {}", other),
        }
    }

    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn summary_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<RunSummary> {
        let diagnostics: String = row.get("diagnostics");
        Ok(RunSummary {
            run_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            pipeline_path: row.get("pipeline_path"),
            status: Self::status_from_str(&row.get::<String, _>("status"))?,
            started_at: Self::from_naive(row.get("started_at")),
            finished_at: Self::from_naive(row.get("finished_at")),
            total_steps: row.get::<i64, _>("total_steps") as usize,
            steps_run: row.get::<i64, _>("steps_run") as usize,
            failed_at: row.get::<Option<i64>, _>("failed_at").map(|i| i as usize),
            diagnostics: serde_json::from_str(&diagnostics)
                .context("Corrupt diagnostics in history")?,
        })
    }
}

#[async_trait::async_trait]
impl HistoryBackend for SqliteHistory {
    async fn record(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO runs
            (id, pipeline_path, status, started_at, finished_at, total_steps, steps_run, failed_at, diagnostics)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(&run.pipeline_path)
        .bind(Self::status_to_str(run.status))
        .bind(run.started_at.naive_utc())
        .bind(run.finished_at.naive_utc())
        .bind(run.total_steps as i64)
        .bind(run.steps_run as i64)
        .bind(run.failed_at.map(|i| i as i64))
        .bind(serde_json::to_string(&run.diagnostics)?)
        .execute(&self.pool)
        .await
        .context("Failed to record run")?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, pipeline_path, status, started_at, finished_at, total_steps, steps_run, failed_at, diagnostics
            FROM runs
            ORDER BY started_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list runs")?;

        rows.iter().map(Self::summary_from_row).collect()
    }
}
