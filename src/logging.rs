//! Tracing setup. Logs go to a file so stdout stays clean for command output.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogConfig};

/// Environment variable holding a filter directive, e.g. `specs_browser=debug`
pub const LOG_ENV: &str = "SPECS_LOG";

const DEFAULT_DIRECTIVE: &str = "specs_browser=info";

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let path = match &config.file {
    Some(p) => p.clone(),
    None => Config::default_log_path()?,
  };
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .map(|p| p.to_path_buf())
    .unwrap_or_else(|| std::path::PathBuf::from("."));
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(env_filter(config.level.as_deref()))
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

/// SPECS_LOG wins over the configured level, which wins over the default.
fn env_filter(configured: Option<&str>) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_DIRECTIVE)))
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
