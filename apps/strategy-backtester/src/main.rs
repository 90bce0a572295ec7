//! Strategy Backtester Binary
//!
//! Runs every candle file in the data directory as one strategy and prints a
//! Markdown summary to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin strategy-backtester
//! ```
//!
//! # Environment Variables
//!
//! - `BACKTEST_CONFIG`: Config file path (default: backtest.yaml, if present)
//! - `BACKTEST_DATA_DIR`: Candle directory, overrides `data.directory`
//! - `RUST_LOG`: Log filter (default: strategy_backtester=info)

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use strategy_backtester::backtest::parallel::run_batch;
use strategy_backtester::backtest::{discover_csv_strategies, format_batch_summary};
use strategy_backtester::config::{
    AppConfig, DEFAULT_CONFIG_PATH, init_tracing, load_config,
};

fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = resolve_config()?;
    init_tracing(&config.logging);

    let data_dir = std::env::var("BACKTEST_DATA_DIR")
        .map_or_else(|_| config.data.directory.clone(), PathBuf::from);

    tracing::info!(data_dir = %data_dir.display(), "Strategy backtester starting");

    let strategies = discover_csv_strategies(&data_dir)
        .with_context(|| format!("failed to scan {}", data_dir.display()))?;
    if strategies.is_empty() {
        tracing::warn!(data_dir = %data_dir.display(), "No candle files found");
    }

    let batch = run_batch(&strategies, &config.backtest, &config.batch);

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", format_batch_summary(&batch)).context("failed to write summary")?;
    stdout.flush().context("failed to flush stdout")?;

    tracing::info!(
        succeeded = batch.results.len(),
        excluded = batch.excluded_count(),
        "Strategy backtester finished"
    );
    Ok(())
}

/// `BACKTEST_CONFIG` when set, otherwise `backtest.yaml` when it exists,
/// otherwise defaults.
fn resolve_config() -> anyhow::Result<AppConfig> {
    if let Ok(path) = std::env::var("BACKTEST_CONFIG") {
        return load_config(Some(&path)).with_context(|| format!("failed to load {path}"));
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(None).context("failed to load backtest.yaml");
    }
    Ok(AppConfig::default())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
