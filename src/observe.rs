//! Minimal observer list used by the state store and the pagination engine.
//!
//! Consumers register a callback and receive a reference to the new value
//! every time the owner publishes. Callbacks run synchronously on the
//! owner's thread, in registration order.

/// Handle returned by [`Subscribers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

pub struct Subscribers<T> {
  next_id: u64,
  callbacks: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for Subscribers<T> {
  fn default() -> Self {
    Self {
      next_id: 0,
      callbacks: Vec::new(),
    }
  }
}

impl<T> Subscribers<T> {
  pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
  where
    F: FnMut(&T) + 'static,
  {
    let id = SubscriptionId(self.next_id);
    self.next_id += 1;
    self.callbacks.push((id, Box::new(callback)));
    id
  }

  /// Returns false if the id was not registered.
  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    let before = self.callbacks.len();
    self.callbacks.retain(|(sid, _)| *sid != id);
    self.callbacks.len() != before
  }

  pub fn notify(&mut self, value: &T) {
    for (_, callback) in self.callbacks.iter_mut() {
      callback(value);
    }
  }

  pub fn len(&self) -> usize {
    self.callbacks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.callbacks.is_empty()
  }
}

impl<T> std::fmt::Debug for Subscribers<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscribers")
      .field("count", &self.callbacks.len())
      .finish()
  }
}
