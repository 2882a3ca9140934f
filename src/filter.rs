//! Filter selections and their normalisation from loosely-typed input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status values the catalog is known to use. Advisory only: values outside
/// this list are still passed to the service untouched.
pub const KNOWN_STATUSES: &[&str] = &[
  "Active",
  "Approved",
  "Braindump",
  "Completed",
  "Drafting",
  "Obsolete",
  "Pending review",
  "Rejected",
];

/// Spec types the catalog is known to use.
pub const KNOWN_TYPES: &[&str] = &[
  "Implementation",
  "Product Requirement",
  "Standard",
  "Informational",
  "Process",
];

/// Sort order requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
  #[default]
  UpdatedAt,
  CreatedAt,
  Title,
  Id,
}

impl OrderBy {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderBy::UpdatedAt => "updated_at",
      OrderBy::CreatedAt => "created_at",
      OrderBy::Title => "title",
      OrderBy::Id => "id",
    }
  }

  pub fn all_variants() -> &'static [Self] {
    &[
      OrderBy::UpdatedAt,
      OrderBy::CreatedAt,
      OrderBy::Title,
      OrderBy::Id,
    ]
  }

  /// Lenient parse: anything unrecognised falls back to the default.
  pub fn parse_or_default(raw: Option<&str>) -> Self {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
  }
}

impl fmt::Display for OrderBy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderBy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::all_variants()
      .iter()
      .copied()
      .find(|o| o.as_str() == s)
      .ok_or_else(|| format!("unknown sort order '{}'", s))
  }
}

/// Insertion-ordered collection of unique strings.
///
/// Iteration follows insertion order so serialisation is stable, while
/// equality ignores order: `{A, B} == {B, A}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedSet(Vec<String>);

impl OrderedSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a value, ignoring duplicates and empty strings.
  /// Returns true if the set grew.
  pub fn insert(&mut self, value: impl Into<String>) -> bool {
    let value = value.into();
    if value.is_empty() || self.contains(&value) {
      return false;
    }
    self.0.push(value);
    true
  }

  pub fn remove(&mut self, value: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|v| v != value);
    self.0.len() != before
  }

  pub fn contains(&self, value: &str) -> bool {
    self.0.iter().any(|v| v == value)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Members in lexicographic order, independent of insertion order.
  pub fn sorted(&self) -> Vec<&str> {
    let mut members: Vec<&str> = self.iter().collect();
    members.sort_unstable();
    members
  }
}

impl PartialEq for OrderedSet {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.iter().all(|v| other.contains(v))
  }
}

impl Eq for OrderedSet {}

impl<S: Into<String>> FromIterator<S> for OrderedSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut set = OrderedSet::new();
    for value in iter {
      set.insert(value);
    }
    set
  }
}

/// Raw key/value pairs as they come out of a query string, with repeated
/// keys kept in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
  pairs: Vec<(String, String)>,
}

impl RawParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.pairs.push((key.into(), value.into()));
  }

  /// All values for `key`, in arrival order.
  pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .pairs
      .iter()
      .filter(move |(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn first(&self, key: &str) -> Option<&str> {
    self
      .pairs
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut params = RawParams::new();
    for (k, v) in iter {
      params.push(k, v);
    }
    params
  }
}

/// Normalise a scalar filter value: blank means "unfiltered".
pub fn normalize_scalar(raw: Option<&str>) -> Option<String> {
  raw
    .filter(|s| !s.trim().is_empty())
    .map(ToString::to_string)
}

/// The user's filter selections. Absent or empty values mean "unfiltered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
  pub team: Option<String>,
  pub statuses: OrderedSet,
  pub types: OrderedSet,
  pub author: Option<String>,
  pub reviewer: Option<String>,
  pub order_by: OrderBy,
}

impl FilterCriteria {
  /// Build canonical criteria from raw query-string values. Never fails:
  /// malformed input is treated as absent.
  pub fn from_raw(raw: &RawParams) -> Self {
    Self {
      team: normalize_scalar(raw.first("team")),
      statuses: raw.all("status").collect(),
      types: raw.all("type").collect(),
      author: normalize_scalar(raw.first("author")),
      reviewer: normalize_scalar(raw.first("reviewer")),
      order_by: OrderBy::parse_or_default(raw.first("orderBy")),
    }
  }

  /// Re-apply normalisation to values that may have been set directly.
  pub fn normalized(&self) -> Self {
    Self {
      team: normalize_scalar(self.team.as_deref()),
      statuses: self.statuses.iter().collect(),
      types: self.types.iter().collect(),
      author: normalize_scalar(self.author.as_deref()),
      reviewer: normalize_scalar(self.reviewer.as_deref()),
      order_by: self.order_by,
    }
  }

  /// True when no field narrows the result set (ordering aside).
  pub fn is_unfiltered(&self) -> bool {
    self.team.is_none()
      && self.statuses.is_empty()
      && self.types.is_empty()
      && self.author.is_none()
      && self.reviewer.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(pairs: &[(&str, &str)]) -> RawParams {
    pairs.iter().copied().collect()
  }

  #[test]
  fn test_first_value_outlives_lookup_key() {
    let params = raw(&[("team", "Server"), ("team", "Desktop")]);
    let team = {
      let key = String::from("team");
      params.first(&key)
    };
    assert_eq!(team, Some("Server"));
    assert_eq!(params.first("author"), None);
  }

  #[test]
  fn test_single_value_becomes_one_element_set() {
    let f = FilterCriteria::from_raw(&raw(&[("status", "Active")]));
    assert_eq!(f.statuses.len(), 1);
    assert!(f.statuses.contains("Active"));
  }

  #[test]
  fn test_repeated_values_are_deduplicated_in_order() {
    let f = FilterCriteria::from_raw(&raw(&[
      ("type", "Standard"),
      ("type", "Process"),
      ("type", "Standard"),
    ]));
    assert_eq!(f.types.iter().collect::<Vec<_>>(), vec!["Standard", "Process"]);
  }

  #[test]
  fn test_empty_scalars_are_absent() {
    let f = FilterCriteria::from_raw(&raw(&[("team", ""), ("author", "   "), ("status", "")]));
    assert_eq!(f.team, None);
    assert_eq!(f.author, None);
    assert!(f.statuses.is_empty());
    assert!(f.is_unfiltered());
  }

  #[test]
  fn test_scalar_keeps_first_value() {
    let f = FilterCriteria::from_raw(&raw(&[("team", "Server"), ("team", "Desktop")]));
    assert_eq!(f.team.as_deref(), Some("Server"));
  }

  #[test]
  fn test_order_by_defaults_when_unrecognised() {
    assert_eq!(
      FilterCriteria::from_raw(&raw(&[("orderBy", "popularity")])).order_by,
      OrderBy::UpdatedAt
    );
    assert_eq!(FilterCriteria::from_raw(&raw(&[])).order_by, OrderBy::UpdatedAt);
    assert_eq!(
      FilterCriteria::from_raw(&raw(&[("orderBy", "title")])).order_by,
      OrderBy::Title
    );
  }

  #[test]
  fn test_set_equality_ignores_order() {
    let a: OrderedSet = ["Active", "Approved"].into_iter().collect();
    let b: OrderedSet = ["Approved", "Active"].into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(a.sorted(), vec!["Active", "Approved"]);

    let c: OrderedSet = ["Active"].into_iter().collect();
    assert_ne!(a, c);
  }

  #[test]
  fn test_normalized_cleans_direct_assignments() {
    let f = FilterCriteria {
      team: Some(String::new()),
      reviewer: Some("Ana".to_string()),
      ..Default::default()
    };
    let n = f.normalized();
    assert_eq!(n.team, None);
    assert_eq!(n.reviewer.as_deref(), Some("Ana"));
  }
}
