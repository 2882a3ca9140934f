//! Single-shot async query with session-long caching.
//!
//! A `Query<T>` owns a fetcher closure, runs it on the tokio runtime and
//! hands the result back through a channel, so state only changes when the
//! owner calls [`Query::poll`] or awaits [`Query::settle`].
//!
//! ```ignore
//! let api = api.clone();
//! let mut teams = Query::new(move || api.lookup(LookupKind::Teams));
//! teams.fetch();
//!
//! // In the event loop
//! if teams.poll() {
//!     // state changed
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

use crate::error::FetchError;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
  /// Not started
  Idle,
  /// Fetch in flight
  Loading,
  Success(T),
  Error(FetchError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&FetchError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, FetchError>>>,
}

impl<T: Send + 'static> Query<T> {
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.state.error()
  }

  /// Start fetching unless a fetch is in flight or data is already cached.
  pub fn fetch(&mut self) {
    if self.state.is_loading() || self.state.is_success() {
      return;
    }
    self.start_fetch();
  }

  /// Fetch again regardless of state. A pending result is dropped.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Apply a finished fetch without blocking. Returns true if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(result) => {
        self.apply(result);
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.apply(Err(FetchError::Transport("query was cancelled".to_string())));
        true
      }
    }
  }

  /// Wait for the in-flight fetch, if any, and apply it.
  pub async fn settle(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    let result = receiver
      .recv()
      .await
      .unwrap_or_else(|| Err(FetchError::Transport("query was cancelled".to_string())));
    self.apply(result);
    true
  }

  fn apply(&mut self, result: Result<T, FetchError>) {
    self.receiver = None;
    self.state = match result {
      Ok(data) => QueryState::Success(data),
      Err(e) => QueryState::Error(e),
    };
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // The receiver may be gone after a refetch
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
