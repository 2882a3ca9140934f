//! Ties the state store, pagination engine and lookup lists together.
//!
//! Every mutation goes through [`SpecsSession::update`]: the state is
//! merged and mirrored to the address bar first, then the engine is pointed
//! at the key derived from the new state.

use std::sync::Arc;

use crate::lookups::LookupLists;
use crate::observe::SubscriptionId;
use crate::pagination::{CacheEntry, PaginationEngine};
use crate::specs::{CacheKey, SpecsApi};
use crate::url_codec::UrlCodec;
use crate::url_state::{NavigationPort, UrlStateStore};
use crate::view_state::{ViewState, ViewStatePatch};

pub struct SpecsSession<N: NavigationPort> {
  store: UrlStateStore<N>,
  engine: PaginationEngine,
  lookups: LookupLists,
}

impl<N: NavigationPort> SpecsSession<N> {
  /// Decode the address bar and start the first listing fetch. Must be
  /// called inside a tokio runtime.
  pub fn start(api: Arc<dyn SpecsApi>, nav: N, page_size: usize) -> Self {
    let store = UrlStateStore::initialize(nav, UrlCodec::new(page_size));
    let mut engine = PaginationEngine::new(api.clone(), page_size);
    engine.activate(CacheKey::from_state(store.current()), store.current().offset);

    Self {
      store,
      engine,
      lookups: LookupLists::new(api),
    }
  }

  /// Start loading the lookup lists. Lists already loaded are kept.
  pub fn load_lookups(&mut self) {
    self.lookups.load();
  }

  pub fn state(&self) -> &ViewState {
    self.store.current()
  }

  pub fn store(&self) -> &UrlStateStore<N> {
    &self.store
  }

  pub fn engine(&self) -> &PaginationEngine {
    &self.engine
  }

  pub fn lookups(&self) -> &LookupLists {
    &self.lookups
  }

  /// The single mutation entry point. Returns whether the view state changed.
  pub fn update(&mut self, patch: &ViewStatePatch) -> bool {
    let changed = self.store.update(patch);
    let state = self.store.current();
    self.engine.activate(CacheKey::from_state(state), state.offset);
    changed
  }

  /// Request the next page. The view state's offset moves once the page
  /// has arrived, in [`SpecsSession::poll`] or [`SpecsSession::settle`].
  pub fn fetch_next_page(&mut self) -> bool {
    self.engine.fetch_next_page()
  }

  /// Reload the active listing from its first page.
  pub fn refetch(&mut self) -> bool {
    let refetched = self.engine.refetch();
    if refetched && self.store.current().offset > 0 {
      self.store.update(&ViewStatePatch::new().offset(0));
    }
    refetched
  }

  pub fn subscribe_state<F>(&mut self, callback: F) -> SubscriptionId
  where
    F: FnMut(&ViewState) + 'static,
  {
    self.store.subscribe(callback)
  }

  pub fn subscribe_listing<F>(&mut self, callback: F) -> SubscriptionId
  where
    F: FnMut(&CacheEntry) + 'static,
  {
    self.engine.subscribe(callback)
  }

  /// Apply everything that has arrived. Returns true if anything changed.
  pub fn poll(&mut self) -> bool {
    let listing = self.engine.poll();
    if listing {
      self.record_loaded_offset();
    }
    let lookups = self.lookups.poll();
    listing || lookups
  }

  /// Wait until the active listing and lookup lists have nothing pending.
  pub async fn settle(&mut self) {
    self.engine.settle_all().await;
    self.record_loaded_offset();
    self.lookups.settle().await;
  }

  /// Advance the view state's offset to the deepest page actually loaded.
  /// Never moves it backwards, so a restore in progress keeps its target.
  fn record_loaded_offset(&mut self) {
    let loaded = match self.engine.entry() {
      Some(entry) if !entry.pages().is_empty() => (entry.pages().len() - 1) * self.engine.limit(),
      _ => return,
    };
    if loaded > self.store.current().offset {
      self.store.update(&ViewStatePatch::new().offset(loaded));
    }
  }
}
