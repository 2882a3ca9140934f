use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterCriteria;

/// A catalog document as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub authors: Vec<String>,
  #[serde(default)]
  pub team: String,
  #[serde(default)]
  pub spec_type: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub google_doc_url: String,
  pub google_doc_updated_at: DateTime<Utc>,
  #[serde(default)]
  pub google_doc_id: Option<String>,
  #[serde(default)]
  pub google_doc_name: Option<String>,
  #[serde(default)]
  pub google_doc_created_at: Option<DateTime<Utc>>,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
  pub specs: Vec<Spec>,
  pub total: u64,
}

/// Parameters of a single `GET /api/specs` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpecsQuery {
  pub filter: FilterCriteria,
  pub search_query: Option<String>,
  pub offset: usize,
  pub limit: usize,
}

/// Flat reference lists served by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
  Authors,
  Teams,
  Reviewers,
}

impl LookupKind {
  /// Path segment under `/api/specs/`
  pub fn path(&self) -> &'static str {
    match self {
      LookupKind::Authors => "authors",
      LookupKind::Teams => "teams",
      LookupKind::Reviewers => "reviewers",
    }
  }

  pub fn all_variants() -> &'static [Self] {
    &[LookupKind::Authors, LookupKind::Teams, LookupKind::Reviewers]
  }
}
