//! Offset-paginated, incrementally loaded spec listings.
//!
//! The engine keeps exactly one [`CacheEntry`], for the active
//! `(filter, search)` key. Pages are fetched on the tokio runtime and come
//! back over a channel tagged with the key and activation generation they
//! were issued for; anything that no longer matches the active entry when it
//! is applied is dropped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::observe::{SubscriptionId, Subscribers};
use crate::specs::{CacheKey, ListSpecsQuery, Page, Spec, SpecsApi};

/// Accumulated pages for one cache key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  key: CacheKey,
  generation: u64,
  limit: usize,
  pages: Vec<Page>,
  total: Option<u64>,
  pending_offset: Option<usize>,
  error: Option<FetchError>,
  /// Pages to load without being asked, to restore a cursor
  restore_pages: usize,
}

impl CacheEntry {
  fn new(key: CacheKey, generation: u64, limit: usize, restore_pages: usize) -> Self {
    Self {
      key,
      generation,
      limit,
      pages: Vec::new(),
      total: None,
      pending_offset: None,
      error: None,
      restore_pages,
    }
  }

  pub fn key(&self) -> &CacheKey {
    &self.key
  }

  pub fn pages(&self) -> &[Page] {
    &self.pages
  }

  /// All fetched specs, in server order.
  pub fn specs(&self) -> impl Iterator<Item = &Spec> {
    self.pages.iter().flat_map(|p| p.specs.iter())
  }

  pub fn spec_count(&self) -> usize {
    self.pages.iter().map(|p| p.specs.len()).sum()
  }

  /// Total reported by the first page; 0 until it arrives.
  pub fn total(&self) -> u64 {
    self.total.unwrap_or(0)
  }

  pub fn is_loading(&self) -> bool {
    self.pending_offset.is_some()
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.error.as_ref()
  }

  /// True until a page shorter than the page size arrives.
  pub fn has_more(&self) -> bool {
    self
      .pages
      .last()
      .map_or(true, |page| page.specs.len() == self.limit)
  }

  fn next_offset(&self) -> usize {
    self.pages.len() * self.limit
  }
}

/// Upper bound on pages loaded automatically to restore an offset.
pub const MAX_RESTORE_PAGES: usize = 20;

fn restore_page_count(offset: usize, limit: usize) -> usize {
  (offset / limit.max(1)).min(MAX_RESTORE_PAGES - 1) + 1
}

#[derive(Debug)]
struct PageResponse {
  key: CacheKey,
  generation: u64,
  offset: usize,
  result: Result<Page, FetchError>,
}

pub struct PaginationEngine {
  api: Arc<dyn SpecsApi>,
  limit: usize,
  entry: Option<CacheEntry>,
  generation: u64,
  in_flight: usize,
  tx: mpsc::UnboundedSender<PageResponse>,
  rx: mpsc::UnboundedReceiver<PageResponse>,
  subscribers: Subscribers<CacheEntry>,
}

impl PaginationEngine {
  pub fn new(api: Arc<dyn SpecsApi>, limit: usize) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      limit: limit.max(1),
      entry: None,
      generation: 0,
      in_flight: 0,
      tx,
      rx,
      subscribers: Subscribers::default(),
    }
  }

  pub fn limit(&self) -> usize {
    self.limit
  }

  pub fn entry(&self) -> Option<&CacheEntry> {
    self.entry.as_ref()
  }

  pub fn specs(&self) -> Vec<&Spec> {
    self
      .entry
      .as_ref()
      .map(|e| e.specs().collect())
      .unwrap_or_default()
  }

  pub fn total(&self) -> u64 {
    self.entry.as_ref().map_or(0, CacheEntry::total)
  }

  pub fn has_more(&self) -> bool {
    self.entry.as_ref().map_or(false, CacheEntry::has_more)
  }

  pub fn is_loading(&self) -> bool {
    self.entry.as_ref().map_or(false, CacheEntry::is_loading)
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.entry.as_ref().and_then(CacheEntry::error)
  }

  /// Make `key` the active listing and fetch its first page.
  ///
  /// A no-op if `key` is already active. Otherwise the previous entry is
  /// discarded. With `restore_offset > 0`, pages are loaded one after another
  /// until the page at that offset is in, up to [`MAX_RESTORE_PAGES`].
  /// Returns whether the key changed.
  pub fn activate(&mut self, key: CacheKey, restore_offset: usize) -> bool {
    if self.entry.as_ref().is_some_and(|e| e.key == key) {
      return false;
    }

    self.generation += 1;
    info!(key = key.short(), generation = self.generation, "activating listing");
    self.entry = Some(CacheEntry::new(
      key,
      self.generation,
      self.limit,
      restore_page_count(restore_offset, self.limit),
    ));
    self.issue_next();
    self.publish();
    true
  }

  /// Throw away the active entry's pages and start again from offset 0.
  pub fn refetch(&mut self) -> bool {
    match self.entry.take() {
      Some(entry) => self.activate(entry.key, 0),
      None => false,
    }
  }

  /// Request the next page for the active key.
  ///
  /// A no-op while a request is pending or once the listing is exhausted.
  /// After a failure this retries the page that failed. Returns whether a
  /// request was issued.
  pub fn fetch_next_page(&mut self) -> bool {
    let issued = self.issue_next();
    if issued {
      self.publish();
    }
    issued
  }

  /// Offset of the request currently in flight for the active key.
  pub fn pending_offset(&self) -> Option<usize> {
    self.entry.as_ref().and_then(|e| e.pending_offset)
  }

  /// Apply every response that has already arrived, without waiting.
  /// Returns true if the active entry changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(response) = self.rx.try_recv() {
      changed |= self.apply(response);
    }
    changed
  }

  /// Wait for the next response and apply it. Returns false immediately if
  /// nothing is in flight; otherwise whether the response was kept.
  pub async fn settle(&mut self) -> bool {
    if self.in_flight == 0 {
      return false;
    }
    match self.rx.recv().await {
      Some(response) => self.apply(response),
      None => false,
    }
  }

  /// Settle until the active entry has nothing pending.
  pub async fn settle_all(&mut self) {
    while self.is_loading() {
      if self.in_flight == 0 {
        break;
      }
      self.settle().await;
    }
  }

  pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
  where
    F: FnMut(&CacheEntry) + 'static,
  {
    self.subscribers.subscribe(callback)
  }

  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    self.subscribers.unsubscribe(id)
  }

  fn issue_next(&mut self) -> bool {
    let entry = match self.entry.as_mut() {
      Some(entry) => entry,
      None => return false,
    };
    if entry.is_loading() || !entry.has_more() {
      return false;
    }

    let offset = entry.next_offset();
    entry.pending_offset = Some(offset);
    entry.error = None;

    let query = ListSpecsQuery {
      filter: entry.key.filter().clone(),
      search_query: entry.key.search_query().map(String::from),
      offset,
      limit: self.limit,
    };
    debug!(key = entry.key.short(), offset, limit = self.limit, "requesting page");

    let request = self.api.list_specs(query);
    let tx = self.tx.clone();
    let key = entry.key.clone();
    let generation = entry.generation;
    self.in_flight += 1;

    tokio::spawn(async move {
      let result = request.await;
      // The engine owns the receiver, so this only fails on shutdown
      let _ = tx.send(PageResponse {
        key,
        generation,
        offset,
        result,
      });
    });
    true
  }

  fn apply(&mut self, response: PageResponse) -> bool {
    self.in_flight = self.in_flight.saturating_sub(1);

    let entry = match self.entry.as_mut() {
      Some(entry) if entry.key == response.key && entry.generation == response.generation => entry,
      _ => {
        debug!(
          key = response.key.short(),
          generation = response.generation,
          offset = response.offset,
          "discarding stale page"
        );
        return false;
      }
    };
    if entry.pending_offset != Some(response.offset) {
      debug!(offset = response.offset, "discarding unexpected page");
      return false;
    }
    entry.pending_offset = None;

    let mut continue_restore = false;
    match response.result {
      Ok(page) => {
        if entry.total.is_none() {
          entry.total = Some(page.total);
        }
        info!(
          key = entry.key.short(),
          offset = response.offset,
          count = page.specs.len(),
          total = entry.total(),
          "page loaded"
        );
        entry.pages.push(page);
        continue_restore = entry.pages.len() < entry.restore_pages;
      }
      Err(e) => {
        warn!(key = entry.key.short(), offset = response.offset, error = %e, "page fetch failed");
        entry.error = Some(e);
      }
    }

    if continue_restore {
      self.issue_next();
    }
    self.publish();
    true
  }

  fn publish(&mut self) {
    if let Some(entry) = &self.entry {
      self.subscribers.notify(entry);
    }
  }
}
