use anyhow::{Context, Result};
use pipeline_shell::cli::output::{style, INFO};
use pipeline_shell::cli::{config::ShellConfig, shell::Shell, Cli};
use pipeline_shell::persistence::{HistoryBackend, InMemoryHistory};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = ShellConfig::from(&cli);
    let history = open_history(&config).await;

    println!(
        "{}Pipeline {} (type 'help' for commands)",
        INFO,
        style(config.pipeline_path.display()).bold()
    );

    let mut shell = Shell::new(config, history, std::io::stdout())?;
    shell.run_loop(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}

/// Open the run history, falling back to memory when it is off or unavailable
async fn open_history(config: &ShellConfig) -> Arc<dyn HistoryBackend> {
    if !config.record_history {
        return Arc::new(InMemoryHistory::new());
    }

    #[cfg(feature = "sqlite")]
    match pipeline_shell::persistence::SqliteHistory::with_default_path().await {
        Ok(history) => return Arc::new(history),
        Err(e) => println!(
            "{}Run history unavailable: {:#}",
            pipeline_shell::cli::output::WARN,
            e
        ),
    }

    Arc::new(InMemoryHistory::new())
}
