//! What the user is currently looking at, and partial updates to it.

use crate::filter::{normalize_scalar, FilterCriteria, OrderBy, OrderedSet};

/// Page size used when nothing else is configured.
pub const DEFAULT_LIMIT: usize = 50;

/// Filters + free-text search + pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
  pub filter: FilterCriteria,
  pub search_query: Option<String>,
  /// Offset of the deepest page loaded; always a multiple of `limit`
  pub offset: usize,
  /// The session's page size; never taken from the address bar
  pub limit: usize,
}

impl ViewState {
  pub fn new(limit: usize) -> Self {
    Self {
      filter: FilterCriteria::default(),
      search_query: None,
      offset: 0,
      limit: limit.max(1),
    }
  }

  /// Canonical form: normalised filter, empty search dropped, offset
  /// snapped down to a page boundary.
  pub fn normalized(&self) -> Self {
    let limit = self.limit.max(1);
    Self {
      filter: self.filter.normalized(),
      search_query: self.search_query.clone().filter(|s| !s.is_empty()),
      offset: snap_offset(self.offset, limit),
      limit,
    }
  }

  /// Shallow merge of `patch` into this state.
  ///
  /// Filter fields the patch does not mention are preserved. A change to the
  /// filter or the search resets the offset to zero unless the patch sets an
  /// offset itself.
  pub fn apply(&self, patch: &ViewStatePatch) -> Self {
    let mut next = self.clone();
    patch.filter.apply_to(&mut next.filter);
    if let Some(search) = &patch.search_query {
      next.search_query = search.clone().filter(|s| !s.is_empty());
    }

    let query_changed =
      next.filter != self.filter || next.search_query != self.search_query;
    next.offset = match patch.offset {
      Some(offset) => snap_offset(offset, next.limit),
      None if query_changed => 0,
      None => self.offset,
    };
    next
  }
}

impl Default for ViewState {
  fn default() -> Self {
    Self::new(DEFAULT_LIMIT)
  }
}

/// Round `offset` down to a multiple of `limit`.
pub fn snap_offset(offset: usize, limit: usize) -> usize {
  let limit = limit.max(1);
  offset - offset % limit
}

/// Per-field update of [`FilterCriteria`]. `None` leaves a field untouched;
/// `Some(None)` clears a scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
  pub team: Option<Option<String>>,
  pub statuses: Option<OrderedSet>,
  pub types: Option<OrderedSet>,
  pub author: Option<Option<String>>,
  pub reviewer: Option<Option<String>>,
  pub order_by: Option<OrderBy>,
}

impl FilterPatch {
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  fn apply_to(&self, filter: &mut FilterCriteria) {
    if let Some(team) = &self.team {
      filter.team = normalize_scalar(team.as_deref());
    }
    if let Some(statuses) = &self.statuses {
      filter.statuses = statuses.iter().collect();
    }
    if let Some(types) = &self.types {
      filter.types = types.iter().collect();
    }
    if let Some(author) = &self.author {
      filter.author = normalize_scalar(author.as_deref());
    }
    if let Some(reviewer) = &self.reviewer {
      filter.reviewer = normalize_scalar(reviewer.as_deref());
    }
    if let Some(order_by) = self.order_by {
      filter.order_by = order_by;
    }
  }
}

/// Partial [`ViewState`] passed to the store's single mutation entry point.
/// `limit` is deliberately absent: it is fixed per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStatePatch {
  pub filter: FilterPatch,
  pub search_query: Option<Option<String>>,
  pub offset: Option<usize>,
}

impl ViewStatePatch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  /// Replace the whole filter with `filter`.
  pub fn filter(mut self, filter: FilterCriteria) -> Self {
    self.filter = FilterPatch {
      team: Some(filter.team),
      statuses: Some(filter.statuses),
      types: Some(filter.types),
      author: Some(filter.author),
      reviewer: Some(filter.reviewer),
      order_by: Some(filter.order_by),
    };
    self
  }

  pub fn team(mut self, team: Option<impl Into<String>>) -> Self {
    self.filter.team = Some(team.map(Into::into));
    self
  }

  pub fn statuses<I, S>(mut self, statuses: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.filter.statuses = Some(statuses.into_iter().collect());
    self
  }

  pub fn types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.filter.types = Some(types.into_iter().collect());
    self
  }

  pub fn author(mut self, author: Option<impl Into<String>>) -> Self {
    self.filter.author = Some(author.map(Into::into));
    self
  }

  pub fn reviewer(mut self, reviewer: Option<impl Into<String>>) -> Self {
    self.filter.reviewer = Some(reviewer.map(Into::into));
    self
  }

  pub fn order_by(mut self, order_by: OrderBy) -> Self {
    self.filter.order_by = Some(order_by);
    self
  }

  pub fn search(mut self, query: Option<impl Into<String>>) -> Self {
    self.search_query = Some(query.map(Into::into));
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }
}
