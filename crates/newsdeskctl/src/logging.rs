//! Logging setup for newsdeskctl
//!
//! One-shot commands log to stderr. The full-screen dashboard owns the
//! terminal, so it logs to a file found through a fallback chain.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE_ENV: &str = "NEWSDESK_LOG_FILE";

/// Discover log file path with fallback chain
///
/// Priority:
/// 1. $NEWSDESK_LOG_FILE environment variable (explicit override)
/// 2. $XDG_STATE_HOME/newsdesk/newsdeskctl.log
/// 3. ~/.local/state/newsdesk/newsdeskctl.log
pub fn discover_log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("newsdesk/newsdeskctl.log"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".local/state/newsdesk/newsdeskctl.log"));
    }

    None
}

/// RUST_LOG wins over the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Log to stderr
pub fn init_stderr(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to the discovered file; without a usable path, logging stays off
pub fn init_file(level: &str) -> Result<Option<PathBuf>> {
    let Some(path) = discover_log_path() else {
        return Ok(None);
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(Some(path))
}
