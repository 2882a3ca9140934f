//! The single source of truth for [`ViewState`], kept in sync with the
//! address bar.

use tracing::debug;

use crate::observe::{SubscriptionId, Subscribers};
use crate::url_codec::UrlCodec;
use crate::view_state::{ViewState, ViewStatePatch};

/// Access to the address bar's query portion.
///
/// `read` returns the current query string (a leading `?` is tolerated);
/// `write` replaces it without reloading. An empty string clears the query.
pub trait NavigationPort {
  fn read(&self) -> String;
  fn write(&mut self, query: &str);
}

/// In-process address bar. Every write is appended to `history`.
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigation {
  current: String,
  history: Vec<String>,
}

impl MemoryNavigation {
  pub fn new(initial_query: impl Into<String>) -> Self {
    Self {
      current: initial_query.into(),
      history: Vec::new(),
    }
  }

  pub fn current(&self) -> &str {
    &self.current
  }

  /// Every query written so far, oldest first.
  pub fn history(&self) -> &[String] {
    &self.history
  }
}

impl NavigationPort for MemoryNavigation {
  fn read(&self) -> String {
    self.current.clone()
  }

  fn write(&mut self, query: &str) {
    self.current = query.to_string();
    self.history.push(query.to_string());
  }
}

/// Owns the current [`ViewState`] and mirrors it into a [`NavigationPort`].
pub struct UrlStateStore<N: NavigationPort> {
  nav: N,
  codec: UrlCodec,
  state: ViewState,
  last_written: String,
  subscribers: Subscribers<ViewState>,
}

impl<N: NavigationPort> UrlStateStore<N> {
  /// Decode the address bar once and take the result as the initial state.
  /// Nothing is written back until the first `update`.
  pub fn initialize(nav: N, codec: UrlCodec) -> Self {
    let raw = nav.read();
    let state = codec.decode(&raw);
    let last_written = raw.strip_prefix('?').unwrap_or(&raw).to_string();
    debug!(query = %last_written, "initialised view state from address bar");

    Self {
      nav,
      codec,
      state,
      last_written,
      subscribers: Subscribers::default(),
    }
  }

  pub fn current(&self) -> &ViewState {
    &self.state
  }

  pub fn codec(&self) -> &UrlCodec {
    &self.codec
  }

  pub fn navigation(&self) -> &N {
    &self.nav
  }

  /// The query string that currently represents the state.
  pub fn query_string(&self) -> String {
    self.codec.encode(&self.state)
  }

  /// Merge `patch` into the current state and sync the address bar.
  ///
  /// The address bar is written only when the encoded query differs from
  /// the last one written. Subscribers are notified only when the state
  /// itself changed. Returns whether the state changed.
  pub fn update(&mut self, patch: &ViewStatePatch) -> bool {
    let next = self.state.apply(patch).normalized();
    let changed = next != self.state;
    self.state = next;

    let encoded = self.codec.encode(&self.state);
    if encoded == self.last_written {
      debug!(query = %encoded, "address bar already up to date");
    } else {
      debug!(query = %encoded, "writing address bar");
      self.nav.write(&encoded);
      self.last_written = encoded;
    }

    if changed {
      self.subscribers.notify(&self.state);
    }
    changed
  }

  pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
  where
    F: FnMut(&ViewState) + 'static,
  {
    self.subscribers.subscribe(callback)
  }

  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    self.subscribers.unsubscribe(id)
  }
}
