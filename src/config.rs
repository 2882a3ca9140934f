use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::view_state::DEFAULT_LIMIT;

const APP_DIR: &str = "specs-browser";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Browser-facing address of the catalog page, used for shareable links
  #[serde(default)]
  pub web_url: Option<String>,
  /// Number of specs per page, fixed for a session
  #[serde(default = "default_page_size")]
  pub page_size: usize,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the specs service
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Filter directive used when SPECS_LOG is not set (e.g. "info", "specs_browser=debug")
  pub level: Option<String>,
  /// Log file path (defaults to the data directory)
  pub file: Option<PathBuf>,
}

fn default_page_size() -> usize {
  DEFAULT_LIMIT
}

fn default_timeout_secs() -> u64 {
  30
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig {
        url: String::new(),
        timeout_secs: default_timeout_secs(),
      },
      web_url: None,
      page_size: default_page_size(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./specs.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/specs-browser/config.yaml
  ///
  /// With no file found, SPECS_API_URL alone is enough to run.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config.with_env_overrides().validated()
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("specs.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join(APP_DIR).join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  fn with_env_overrides(mut self) -> Self {
    if let Ok(url) = std::env::var("SPECS_API_URL") {
      self.api.url = url;
    }
    self
  }

  /// Override the API URL (command line takes precedence over everything).
  pub fn with_api_url(mut self, url: Option<String>) -> Result<Self> {
    if let Some(url) = url {
      self.api.url = url;
    }
    self.validated()
  }

  fn validated(mut self) -> Result<Self> {
    if self.api.url.trim().is_empty() {
      return Err(eyre!(
        "No API url configured. Set api.url in ~/.config/{}/config.yaml or SPECS_API_URL.",
        APP_DIR
      ));
    }
    if self.page_size == 0 {
      return Err(eyre!("page_size must be greater than 0"));
    }
    if !self.api.url.ends_with('/') {
      self.api.url.push('/');
    }
    Ok(self)
  }

  /// Default log file location.
  pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join(APP_DIR).join("specs.log"))
  }
}
