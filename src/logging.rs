use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_LEVEL_ENV: &str = "PREP_BOARD_LOG_LEVEL";
const LOG_FILE_PREFIX: &str = "prep-board-";
const DEFAULT_LEVEL: &str = "warn";

/// Installs the global subscriber writing to a fresh file under the local data
/// directory. Stdout stays untouched since the terminal belongs to the board.
pub fn init_logging() -> Result<PathBuf> {
    let log_dir = log_directory()?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory '{}'", log_dir.display()))?;

    let log_file_path = log_file_path(&log_dir);
    let file = fs::File::create(&log_file_path)
        .with_context(|| format!("failed to create log file '{}'", log_file_path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // Flushed on process exit; the board has no orderly place to hold it.
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(build_log_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(path = %log_file_path.display(), "logging initialized");

    Ok(log_file_path)
}

fn build_log_filter(raw_level: Option<&str>) -> EnvFilter {
    let level = raw_level
        .and_then(normalize_log_level)
        .unwrap_or(DEFAULT_LEVEL);
    EnvFilter::new(format!("{level},prep_board={level}"))
}

fn normalize_log_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

pub fn log_directory() -> Result<PathBuf> {
    let data_dir =
        dirs::data_local_dir().context("failed to determine local data directory")?;
    Ok(data_dir.join("prep-board").join("logs"))
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    log_dir.join(format!("{LOG_FILE_PREFIX}{timestamp}.log"))
}

pub fn print_log_location(log_path: &Path) {
    eprintln!();
    eprintln!("  Log file: {}", log_path.display());
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_uses_prefix() {
        let path = log_file_path(Path::new("/tmp/prep-board-logs"));
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name");
        assert!(name.starts_with(LOG_FILE_PREFIX));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_normalize_log_level() {
        assert_eq!(normalize_log_level("TRACE"), Some("trace"));
        assert_eq!(normalize_log_level(" warning "), Some("warn"));
        assert_eq!(normalize_log_level("verbose"), None);
    }

    #[test]
    fn test_build_log_filter_defaults_to_warn() {
        assert_eq!(
            build_log_filter(Some("loud")).to_string(),
            build_log_filter(None).to_string()
        );
        assert!(build_log_filter(Some("debug")).to_string().contains("prep_board=debug"));
    }
}
