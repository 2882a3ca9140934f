//! Typed errors surfaced by the remote catalog client.

use thiserror::Error;

/// A failed request against the specs service.
///
/// Stored on cache entries and lookup queries, so it is `Clone` and carries
/// only owned strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// The service answered with a non-success status
  #[error("{message} (HTTP {status})")]
  Status { status: u16, message: String },

  /// The request never produced a response (DNS, TLS, timeout, ...)
  #[error("request failed: {0}")]
  Transport(String),

  /// The response body could not be parsed
  #[error("unexpected response: {0}")]
  Decode(String),
}

impl FetchError {
  /// Human-readable message suitable for an inline notice.
  pub fn message(&self) -> String {
    self.to_string()
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    match e.status() {
      Some(status) => FetchError::Status {
        status: status.as_u16(),
        message: status
          .canonical_reason()
          .unwrap_or("request failed")
          .to_string(),
      },
      None => FetchError::Transport(e.to_string()),
    }
  }
}

impl From<serde_json::Error> for FetchError {
  fn from(e: serde_json::Error) -> Self {
    FetchError::Decode(e.to_string())
  }
}
