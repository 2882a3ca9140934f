use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::url_codec::{filter_pairs, KEY_LIMIT, KEY_OFFSET, KEY_SEARCH};

use super::api_types::{ApiErrorBody, ApiListSpecsResponse, ApiLookupResponse};
use super::types::{ListSpecsQuery, LookupKind, Page};

/// The remote catalog, as seen by the pagination engine and lookup loader.
///
/// Futures are `'static` so they can be spawned onto the runtime.
pub trait SpecsApi: Send + Sync + 'static {
  fn list_specs(&self, query: ListSpecsQuery) -> BoxFuture<'static, Result<Page, FetchError>>;

  fn lookup(&self, kind: LookupKind) -> BoxFuture<'static, Result<Vec<String>, FetchError>>;
}

/// HTTP client for the specs service
#[derive(Clone)]
pub struct SpecsClient {
  http: reqwest::Client,
  base_url: Url,
}

impl SpecsClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url '{}': {}", config.api.url, e))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// `GET /api/specs?...` URL for `query`.
  pub fn list_url(&self, query: &ListSpecsQuery) -> Result<Url, FetchError> {
    let mut url = self.endpoint("api/specs")?;
    {
      let mut pairs = url.query_pairs_mut();
      // orderBy is always sent; the service defaults to created_at
      for (key, value) in filter_pairs(&query.filter, true) {
        pairs.append_pair(key, &value);
      }
      if let Some(q) = &query.search_query {
        pairs.append_pair(KEY_SEARCH, q);
      }
      pairs.append_pair(KEY_OFFSET, &query.offset.to_string());
      pairs.append_pair(KEY_LIMIT, &query.limit.to_string());
    }
    Ok(url)
  }

  pub fn lookup_url(&self, kind: LookupKind) -> Result<Url, FetchError> {
    self.endpoint(&format!("api/specs/{}", kind.path()))
  }

  fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
    self
      .base_url
      .join(path)
      .map_err(|e| FetchError::Transport(format!("invalid endpoint '{}': {}", path, e)))
  }

  async fn get_bytes(http: reqwest::Client, url: Url) -> Result<Vec<u8>, FetchError> {
    debug!(%url, "GET");
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
      let message = serde_json::from_slice::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
          status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
        });
      return Err(FetchError::Status {
        status: status.as_u16(),
        message,
      });
    }

    Ok(body.to_vec())
  }
}

impl SpecsApi for SpecsClient {
  fn list_specs(&self, query: ListSpecsQuery) -> BoxFuture<'static, Result<Page, FetchError>> {
    let http = self.http.clone();
    let url = self.list_url(&query);
    async move {
      let body = Self::get_bytes(http, url?).await?;
      let response: ApiListSpecsResponse = serde_json::from_slice(&body)?;
      Ok(response.into())
    }
    .boxed()
  }

  fn lookup(&self, kind: LookupKind) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
    let http = self.http.clone();
    let url = self.lookup_url(kind);
    async move {
      let body = Self::get_bytes(http, url?).await?;
      let response: ApiLookupResponse = serde_json::from_slice(&body)?;
      Ok(response.into())
    }
    .boxed()
  }
}
