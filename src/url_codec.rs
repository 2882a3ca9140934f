//! Bidirectional mapping between [`ViewState`] and a query string.
//!
//! Grammar (flat, `application/x-www-form-urlencoded`):
//!
//! ```text
//! team=T & status=S* & type=Y* & author=A & reviewer=R
//!   & orderBy=O & searchQuery=Q & offset=N
//! ```
//!
//! Absent and default values are omitted, set members are repeated keys.
//! Decoding also accepts the older nested form (`filter[status]=S`). A
//! `limit` in the address bar is ignored: the page size belongs to the
//! session, not the view.

use url::form_urlencoded;

use crate::filter::{FilterCriteria, OrderBy, RawParams};
use crate::view_state::{snap_offset, ViewState};

pub const KEY_TEAM: &str = "team";
pub const KEY_STATUS: &str = "status";
pub const KEY_TYPE: &str = "type";
pub const KEY_AUTHOR: &str = "author";
pub const KEY_REVIEWER: &str = "reviewer";
pub const KEY_ORDER_BY: &str = "orderBy";
pub const KEY_SEARCH: &str = "searchQuery";
pub const KEY_OFFSET: &str = "offset";
pub const KEY_LIMIT: &str = "limit";

/// Query-string codec for one session. Every decoded state carries the
/// session's page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlCodec {
  page_size: usize,
}

impl UrlCodec {
  pub fn new(page_size: usize) -> Self {
    Self {
      page_size: page_size.max(1),
    }
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  /// Parse a raw query string (with or without the leading `?`). Never
  /// fails; anything unparseable decodes to its default.
  pub fn decode(&self, raw_query: &str) -> ViewState {
    let params = parse_params(raw_query);

    let limit = self.page_size;
    let offset = params
      .first(KEY_OFFSET)
      .and_then(|s| s.trim().parse::<usize>().ok())
      .unwrap_or(0);

    ViewState {
      filter: FilterCriteria::from_raw(&params),
      search_query: params
        .first(KEY_SEARCH)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string),
      offset: snap_offset(offset, limit),
      limit,
    }
  }

  /// Serialise `state`, omitting absent and default fields.
  pub fn encode(&self, state: &ViewState) -> String {
    let state = state.normalized();
    let mut pairs = filter_pairs(&state.filter, false);

    if let Some(q) = &state.search_query {
      pairs.push((KEY_SEARCH, q.clone()));
    }
    if state.offset > 0 {
      pairs.push((KEY_OFFSET, state.offset.to_string()));
    }

    serialize_pairs(&pairs)
  }
}

/// Key/value pairs for the non-default fields of `filter`, in a fixed key
/// order. `orderBy` is included only if non-default, unless
/// `always_order_by` is set.
pub fn filter_pairs(filter: &FilterCriteria, always_order_by: bool) -> Vec<(&'static str, String)> {
  let mut pairs = Vec::new();

  if let Some(team) = &filter.team {
    pairs.push((KEY_TEAM, team.clone()));
  }
  for status in filter.statuses.iter() {
    pairs.push((KEY_STATUS, status.to_string()));
  }
  for spec_type in filter.types.iter() {
    pairs.push((KEY_TYPE, spec_type.to_string()));
  }
  if let Some(author) = &filter.author {
    pairs.push((KEY_AUTHOR, author.clone()));
  }
  if let Some(reviewer) = &filter.reviewer {
    pairs.push((KEY_REVIEWER, reviewer.clone()));
  }
  if always_order_by || filter.order_by != OrderBy::default() {
    pairs.push((KEY_ORDER_BY, filter.order_by.as_str().to_string()));
  }

  pairs
}

pub fn serialize_pairs(pairs: &[(&str, String)]) -> String {
  let mut serializer = form_urlencoded::Serializer::new(String::new());
  for (key, value) in pairs {
    serializer.append_pair(key, value);
  }
  serializer.finish()
}

/// Split a query string into raw pairs, unwrapping legacy `filter[key]` names.
pub fn parse_params(raw_query: &str) -> RawParams {
  let query = raw_query.strip_prefix('?').unwrap_or(raw_query);
  form_urlencoded::parse(query.as_bytes())
    .map(|(k, v)| (unwrap_legacy_key(&k).to_string(), v.into_owned()))
    .collect()
}

fn unwrap_legacy_key(key: &str) -> &str {
  key
    .strip_prefix("filter[")
    .and_then(|rest| rest.split(']').next())
    .unwrap_or(key)
}
