//! Serde types matching the specs service's JSON responses.
//!
//! Kept apart from the domain types so quirks of the wire format (nullable
//! arrays, echo fields) stay out of the rest of the crate.

use serde::Deserialize;

use super::types::{Page, Spec};

#[derive(Debug, Deserialize)]
pub struct ApiListSpecsResponse {
  #[serde(default)]
  pub total: u64,
  /// The service sends `null` for an empty result set
  #[serde(default)]
  pub specs: Option<Vec<Spec>>,
  #[serde(default)]
  pub limit: Option<u64>,
  #[serde(default)]
  pub offset: Option<u64>,
}

impl From<ApiListSpecsResponse> for Page {
  fn from(resp: ApiListSpecsResponse) -> Self {
    Page {
      specs: resp.specs.unwrap_or_default(),
      total: resp.total,
    }
  }
}

/// Body of a non-success response
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub message: String,
}

/// Lookup endpoints return a JSON array that may contain nulls, or be null
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ApiLookupResponse(pub Option<Vec<Option<String>>>);

impl From<ApiLookupResponse> for Vec<String> {
  fn from(resp: ApiLookupResponse) -> Self {
    resp.0.unwrap_or_default().into_iter().flatten().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_null_specs_is_empty_page() {
    let resp: ApiListSpecsResponse =
      serde_json::from_str(r#"{"total": 0, "specs": null, "limit": 50, "offset": 0}"#).unwrap();
    let page: Page = resp.into();
    assert!(page.specs.is_empty());
    assert_eq!(page.total, 0);
  }

  #[test]
  fn test_spec_record_parses_with_missing_optionals() {
    let body = r#"{
      "total": 1,
      "specs": [{
        "id": "SP001",
        "title": "Spec index",
        "authors": ["Ana", "Ben"],
        "team": "Server",
        "spec_type": "Standard",
        "status": "Active",
        "google_doc_url": "https://docs.google.com/document/d/x",
        "google_doc_updated_at": "2024-05-01T10:00:00Z"
      }]
    }"#;
    let page: Page = serde_json::from_str::<ApiListSpecsResponse>(body)
      .unwrap()
      .into();
    assert_eq!(page.total, 1);
    assert_eq!(page.specs[0].authors, vec!["Ana", "Ben"]);
    assert_eq!(page.specs[0].google_doc_name, None);
  }

  #[test]
  fn test_lookup_drops_nulls() {
    let resp: ApiLookupResponse = serde_json::from_str(r#"["b", null, "a"]"#).unwrap();
    let list: Vec<String> = resp.into();
    assert_eq!(list, vec!["b", "a"]);

    let resp: ApiLookupResponse = serde_json::from_str("null").unwrap();
    assert!(Vec::<String>::from(resp).is_empty());
  }
}
