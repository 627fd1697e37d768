use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "tempcheck=info,tempcheck_core=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_file_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
    Ok(data_dir.join("tempcheck").join("tempcheck.log"))
}

/// Interactive mode: logs go to a file so they never corrupt the TUI.
pub fn init_file_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    Ok(path)
}

/// One-shot commands log to stderr, leaving stdout for results.
pub fn init_stderr_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
