//! Scripted in-memory [`SpecsApi`] for tests.
//!
//! Two modes: with a catalog, requests are answered as soon as they are
//! polled; without one, requests are held until the test resolves them in
//! arrival order.

use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::error::FetchError;

use super::client::SpecsApi;
use super::types::{ListSpecsQuery, LookupKind, Page, Spec};

type Reply = oneshot::Sender<Result<Page, FetchError>>;

#[derive(Default)]
struct Inner {
  catalog: Option<Vec<Spec>>,
  failures: VecDeque<FetchError>,
  requests: Vec<ListSpecsQuery>,
  held: VecDeque<(ListSpecsQuery, Reply)>,
  lookups: HashMap<LookupKind, Result<Vec<String>, FetchError>>,
}

#[derive(Clone, Default)]
pub struct FakeSpecsApi {
  inner: Arc<Mutex<Inner>>,
}

pub fn make_spec(id: &str, team: &str) -> Spec {
  Spec {
    id: id.to_string(),
    title: format!("Spec {}", id),
    authors: vec!["Ana".to_string()],
    team: team.to_string(),
    spec_type: "Standard".to_string(),
    status: "Active".to_string(),
    google_doc_url: format!("https://docs.example.com/{}", id),
    google_doc_updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    google_doc_id: None,
    google_doc_name: None,
    google_doc_created_at: None,
  }
}

/// A page of `count` specs whose ids start with `prefix`.
pub fn make_page(prefix: &str, count: usize, total: u64) -> Page {
  Page {
    specs: (0..count)
      .map(|i| make_spec(&format!("{}{}", prefix, i), prefix))
      .collect(),
    total,
  }
}

impl FakeSpecsApi {
  /// Requests are held until resolved.
  pub fn held() -> Self {
    Self::default()
  }

  /// Requests are answered from `specs`, filtered by team and title search.
  pub fn with_catalog(specs: Vec<Spec>) -> Self {
    let api = Self::default();
    api.lock().catalog = Some(specs);
    api
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap()
  }

  /// The next list request (in either mode) fails with `err`.
  pub fn fail_next(&self, err: FetchError) {
    self.lock().failures.push_back(err);
  }

  pub fn set_lookup(&self, kind: LookupKind, result: Result<Vec<String>, FetchError>) {
    self.lock().lookups.insert(kind, result);
  }

  /// Every list request seen so far, in order.
  pub fn requests(&self) -> Vec<ListSpecsQuery> {
    self.lock().requests.clone()
  }

  pub fn pending(&self) -> usize {
    self.lock().held.len()
  }

  /// Answer the oldest held request. Returns the query it answered.
  pub fn resolve_next(&self, result: Result<Page, FetchError>) -> Option<ListSpecsQuery> {
    let (query, reply) = self.lock().held.pop_front()?;
    let _ = reply.send(result);
    Some(query)
  }

  fn answer_from_catalog(catalog: &[Spec], query: &ListSpecsQuery) -> Page {
    let matching: Vec<&Spec> = catalog
      .iter()
      .filter(|s| query.filter.team.as_ref().map_or(true, |t| &s.team == t))
      .filter(|s| {
        query
          .search_query
          .as_ref()
          .map_or(true, |q| s.title.contains(q.as_str()))
      })
      .collect();
    Page {
      specs: matching
        .iter()
        .skip(query.offset)
        .take(query.limit)
        .map(|s| (*s).clone())
        .collect(),
      total: matching.len() as u64,
    }
  }
}

impl SpecsApi for FakeSpecsApi {
  fn list_specs(&self, query: ListSpecsQuery) -> BoxFuture<'static, Result<Page, FetchError>> {
    let mut inner = self.lock();
    inner.requests.push(query.clone());

    if let Some(err) = inner.failures.pop_front() {
      return futures::future::ready(Err(err)).boxed();
    }
    if let Some(catalog) = &inner.catalog {
      let page = Self::answer_from_catalog(catalog, &query);
      return futures::future::ready(Ok(page)).boxed();
    }

    let (tx, rx) = oneshot::channel();
    inner.held.push_back((query, tx));
    async move {
      rx.await
        .unwrap_or_else(|_| Err(FetchError::Transport("request dropped".to_string())))
    }
    .boxed()
  }

  fn lookup(&self, kind: LookupKind) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
    let result = self
      .lock()
      .lookups
      .get(&kind)
      .cloned()
      .unwrap_or_else(|| Ok(Vec::new()));
    futures::future::ready(result).boxed()
  }
}
