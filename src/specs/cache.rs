//! Cache key for paginated spec listings.

use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::filter::FilterCriteria;
use crate::view_state::ViewState;

/// Content identity of `(filter, search)`.
///
/// Two keys are equal exactly when their canonical forms are equal, so set
/// members in a different order, or an empty string versus an absent value,
/// produce the same key.
#[derive(Clone)]
pub struct CacheKey {
  filter: FilterCriteria,
  search_query: Option<String>,
  hash: String,
}

impl CacheKey {
  pub fn new(filter: &FilterCriteria, search_query: Option<&str>) -> Self {
    let filter = filter.normalized();
    let search_query = search_query.filter(|s| !s.is_empty()).map(String::from);
    let hash = digest(&canonical_form(&filter, search_query.as_deref()));
    Self {
      filter,
      search_query,
      hash,
    }
  }

  pub fn from_state(state: &ViewState) -> Self {
    Self::new(&state.filter, state.search_query.as_deref())
  }

  pub fn filter(&self) -> &FilterCriteria {
    &self.filter
  }

  pub fn search_query(&self) -> Option<&str> {
    self.search_query.as_deref()
  }

  /// SHA256 hex digest of the canonical form.
  pub fn hash(&self) -> &str {
    &self.hash
  }

  /// Short prefix of the digest, for logs.
  pub fn short(&self) -> &str {
    &self.hash[..12]
  }
}

impl PartialEq for CacheKey {
  fn eq(&self, other: &Self) -> bool {
    self.hash == other.hash
  }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.hash.hash(state);
  }
}

impl fmt::Debug for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheKey")
      .field("hash", &self.short())
      .field("filter", &self.filter)
      .field("search_query", &self.search_query)
      .finish()
  }
}

/// Order-independent, unambiguous rendering of the key's content. Each
/// field is length-prefixed so values containing separators cannot collide.
fn canonical_form(filter: &FilterCriteria, search_query: Option<&str>) -> String {
  let mut out = String::new();
  push_field(&mut out, "team", filter.team.as_deref().into_iter());
  push_field(&mut out, "status", filter.statuses.sorted().into_iter());
  push_field(&mut out, "type", filter.types.sorted().into_iter());
  push_field(&mut out, "author", filter.author.as_deref().into_iter());
  push_field(&mut out, "reviewer", filter.reviewer.as_deref().into_iter());
  push_field(&mut out, "order", std::iter::once(filter.order_by.as_str()));
  push_field(&mut out, "search", search_query.into_iter());
  out
}

fn push_field<'a>(out: &mut String, name: &str, values: impl Iterator<Item = &'a str>) {
  out.push_str(name);
  for value in values {
    out.push_str(&format!(":{}:{}", value.len(), value));
  }
  out.push(';');
}

fn digest(input: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}
