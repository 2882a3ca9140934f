//! Reference lists (authors, teams, reviewers) for filter choices.
//!
//! Loaded once per session and never invalidated by filter changes. A failed
//! load degrades to an empty list.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::query::{Query, QueryState};
use crate::specs::{LookupKind, SpecsApi};

/// Deduplicate, sort lexicographically and drop blank entries.
pub fn normalize_lookup<I, S>(raw: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  raw
    .into_iter()
    .map(Into::into)
    .filter(|s| !s.trim().is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

pub struct LookupLists {
  authors: Query<Vec<String>>,
  teams: Query<Vec<String>>,
  reviewers: Query<Vec<String>>,
}

impl LookupLists {
  pub fn new(api: Arc<dyn SpecsApi>) -> Self {
    Self {
      authors: lookup_query(api.clone(), LookupKind::Authors),
      teams: lookup_query(api.clone(), LookupKind::Teams),
      reviewers: lookup_query(api, LookupKind::Reviewers),
    }
  }

  /// Start loading every list not yet loaded.
  pub fn load(&mut self) {
    for kind in LookupKind::all_variants() {
      self.query_mut(*kind).fetch();
    }
  }

  /// Apply any finished loads. Returns true if anything changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    for kind in LookupKind::all_variants() {
      if self.query_mut(*kind).poll() {
        self.log_outcome(*kind);
        changed = true;
      }
    }
    changed
  }

  /// Wait until every in-flight load has finished.
  pub async fn settle(&mut self) {
    for kind in LookupKind::all_variants() {
      if self.query_mut(*kind).settle().await {
        self.log_outcome(*kind);
      }
    }
  }

  /// Normalised list for `kind`; empty while loading or after a failure.
  pub fn get(&self, kind: LookupKind) -> &[String] {
    self.query(kind).data().map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn authors(&self) -> &[String] {
    self.get(LookupKind::Authors)
  }

  pub fn teams(&self) -> &[String] {
    self.get(LookupKind::Teams)
  }

  pub fn reviewers(&self) -> &[String] {
    self.get(LookupKind::Reviewers)
  }

  pub fn is_loading(&self) -> bool {
    LookupKind::all_variants()
      .iter()
      .any(|k| self.query(*k).is_loading())
  }

  fn query(&self, kind: LookupKind) -> &Query<Vec<String>> {
    match kind {
      LookupKind::Authors => &self.authors,
      LookupKind::Teams => &self.teams,
      LookupKind::Reviewers => &self.reviewers,
    }
  }

  fn query_mut(&mut self, kind: LookupKind) -> &mut Query<Vec<String>> {
    match kind {
      LookupKind::Authors => &mut self.authors,
      LookupKind::Teams => &mut self.teams,
      LookupKind::Reviewers => &mut self.reviewers,
    }
  }

  fn log_outcome(&self, kind: LookupKind) {
    match self.query(kind).state() {
      QueryState::Success(list) => info!(list = kind.path(), count = list.len(), "lookup list loaded"),
      QueryState::Error(e) => warn!(list = kind.path(), error = %e, "lookup list unavailable"),
      _ => {}
    }
  }
}

fn lookup_query(api: Arc<dyn SpecsApi>, kind: LookupKind) -> Query<Vec<String>> {
  Query::new(move || {
    let fetch = api.lookup(kind);
    async move { fetch.await.map(normalize_lookup) }
  })
}
