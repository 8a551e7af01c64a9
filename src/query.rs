//! Hook-style query handles over a [`ResourceCache`].
//!
//! A `Query<T>` is what a screen holds: a subscription to one cache key plus
//! the action that refreshes it. It mirrors how a UI hook drives the store:
//! fetch on mount when enabled, read the entry reactively, refetch on demand.
//!
//! # Example
//!
//! ```ignore
//! let mut deals = stores.deals.list_query(Some("agent-7"), true);
//!
//! // In render
//! let entry = deals.state();
//! match deals.status() {
//!     EntryStatus::Loading => render_spinner(),
//!     EntryStatus::Ready => render_rows(&entry.data),
//!     EntryStatus::Failed => render_error(entry.error.as_deref()),
//!     EntryStatus::Idle => {}
//! }
//!
//! // After the user hits retry
//! deals.refetch();
//! ```

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::ResourceService;
use crate::cache::{CacheEntry, EntryStatus, ResourceCache, Slot};

/// Action that starts a fetch for the query's key
type TriggerFn = Box<dyn Fn() + Send + Sync>;

/// Reactive view of one cache key.
///
/// Query<T> encapsulates:
/// - The subscription to the key's entry
/// - The `enabled` gate deciding whether it may fetch at all
/// - The default shown before the first write
pub struct Query<T> {
  receiver: watch::Receiver<Slot<T>>,
  trigger: TriggerFn,
  placeholder: T,
  enabled: bool,
}

impl<T: Clone> Query<T> {
  /// Mount a query: subscribe, and fetch right away if enabled and the key
  /// has no entry yet.
  fn mount<F>(receiver: watch::Receiver<Slot<T>>, placeholder: T, enabled: bool, trigger: F) -> Self
  where
    F: Fn() + Send + Sync + 'static,
  {
    let query = Self {
      receiver,
      trigger: Box::new(trigger),
      placeholder,
      enabled,
    };

    if query.enabled && query.receiver.borrow().is_none() {
      (query.trigger)();
    }

    query
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Current entry, or the default for a key with nothing written yet.
  ///
  /// The default is "loading" for an enabled query (a fetch is due) and
  /// "off" for a disabled one.
  pub fn state(&self) -> CacheEntry<T> {
    match self.receiver.borrow().as_ref() {
      Some(entry) => entry.clone(),
      None => self.default_entry(),
    }
  }

  /// Like [`CacheEntry::status`], but `Idle` for a disabled query whose key
  /// has nothing written.
  pub fn status(&self) -> EntryStatus {
    if !self.enabled && self.receiver.borrow().is_none() {
      return EntryStatus::Idle;
    }
    self.state().status()
  }

  pub fn data(&self) -> T {
    self.state().data
  }

  pub fn is_loading(&self) -> bool {
    self.state().is_loading
  }

  pub fn error(&self) -> Option<String> {
    self.state().error
  }

  /// Start a fetch unless disabled or one is already in flight.
  pub fn fetch(&self) {
    if !self.enabled {
      return;
    }
    let in_flight = self
      .receiver
      .borrow()
      .as_ref()
      .is_some_and(|entry| entry.is_loading);
    if !in_flight {
      (self.trigger)();
    }
  }

  /// Force a fetch even if one is in flight. The later resolution wins.
  pub fn refetch(&self) {
    if self.enabled {
      (self.trigger)();
    }
  }

  /// Wait for the next write to this key.
  ///
  /// Returns `false` if the cache behind the query is gone.
  pub async fn changed(&mut self) -> bool {
    self.receiver.changed().await.is_ok()
  }

  /// Wait until the entry is terminal and return it.
  ///
  /// If the entry was purged (a mutation invalidated it) and the query is
  /// enabled, a new fetch is started first.
  pub async fn settled(&mut self) -> CacheEntry<T> {
    loop {
      let current = self.receiver.borrow_and_update().clone();
      match current {
        Some(entry) if entry.is_settled() => return entry,
        Some(_) => {}
        None if !self.enabled => return self.default_entry(),
        None => (self.trigger)(),
      }

      if self.receiver.changed().await.is_err() {
        return self.state();
      }
    }
  }

  fn default_entry(&self) -> CacheEntry<T> {
    if self.enabled {
      CacheEntry::pending(self.placeholder.clone())
    } else {
      CacheEntry::off(self.placeholder.clone())
    }
  }
}

impl<S: ResourceService> ResourceCache<S> {
  /// Query the list for a filter.
  pub fn list_query(self: &Arc<Self>, filter: Option<&str>, enabled: bool) -> Query<Vec<S::Item>> {
    let cache = Arc::clone(self);
    let filter = filter.map(String::from);
    let receiver = self.subscribe_list(filter.as_deref());

    Query::mount(receiver, Vec::new(), enabled, move || {
      let _ = cache.fetch_list(filter.as_deref());
    })
  }

  /// Query one record. An empty id never fetches.
  pub fn detail_query(self: &Arc<Self>, id: &str, enabled: bool) -> Query<Option<S::Item>> {
    let cache = Arc::clone(self);
    let key = id.to_string();
    let receiver = self.subscribe_detail(id);

    Query::mount(receiver, None, enabled && !id.is_empty(), move || {
      let _ = cache.fetch_detail(&key);
    })
  }
}

// Query is not Clone because the trigger is boxed and the receiver tracks
// what this holder has already seen. Mount another query for a second view.

impl<T: std::fmt::Debug + Clone> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state())
      .field("enabled", &self.enabled)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Failure;
  use crate::cache::layer::tests::{item, Reply, ScriptedService};
  use std::collections::HashMap;
  use tokio::sync::oneshot;

  #[tokio::test]
  async fn test_mount_fetches_missing_entry() {
    let cache = Arc::new(ResourceCache::new(
      ScriptedService::default().list_reply(Reply::Now(Ok(vec![item("1", "A")]))),
    ));

    let mut query = cache.list_query(None, true);
    assert!(query.is_loading());
    assert_eq!(query.status(), EntryStatus::Loading);

    let entry = query.settled().await;
    assert_eq!(entry, CacheEntry::ready(vec![item("1", "A")]));
    assert_eq!(cache.service().calls(), vec!["find_all:-"]);
  }

  #[tokio::test]
  async fn test_mount_reads_through_existing_entry() {
    let cache = Arc::new(ResourceCache::new(
      ScriptedService::default().list_reply(Reply::Now(Ok(vec![item("1", "A")]))),
    ));
    cache.load_list(Some("agent-1")).await;

    let query = cache.list_query(Some("agent-1"), true);

    assert_eq!(query.data(), vec![item("1", "A")]);
    assert_eq!(cache.service().calls(), vec!["find_all:agent-1"]);
  }

  #[tokio::test]
  async fn test_disabled_query_never_fetches() {
    let cache = Arc::new(ResourceCache::new(ScriptedService::default()));

    let mut query = cache.list_query(None, false);
    query.fetch();
    query.refetch();

    assert_eq!(query.state(), CacheEntry::off(Vec::new()));
    assert_eq!(query.status(), EntryStatus::Idle);
    assert_eq!(query.settled().await, CacheEntry::off(Vec::new()));
    assert!(cache.service().calls().is_empty());
  }

  #[tokio::test]
  async fn test_empty_id_is_gated() {
    let cache = Arc::new(ResourceCache::new(ScriptedService::default()));

    let query = cache.detail_query("", true);

    assert!(!query.is_enabled());
    assert_eq!(query.state(), CacheEntry::off(None));
    assert!(cache.service().calls().is_empty());
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let (tx, rx) = oneshot::channel();
    let cache = Arc::new(ResourceCache::new(
      ScriptedService::default().detail_reply(Reply::Later(rx)),
    ));

    let mut query = cache.detail_query("deal-42", true);
    assert!(query.is_loading());

    // Second fetch should be no-op
    query.fetch();
    tokio::task::yield_now().await;

    tx.send(Ok(item("deal-42", "Corner plot"))).unwrap();
    let entry = query.settled().await;

    assert_eq!(entry.data, Some(item("deal-42", "Corner plot")));
    assert_eq!(cache.service().calls(), vec!["find_one:deal-42"]);
  }

  #[tokio::test]
  async fn test_refetch_after_failure() {
    let cache = Arc::new(ResourceCache::new(
      ScriptedService::default()
        .list_reply(Reply::Now(Err(Failure::transport("Network Error"))))
        .list_reply(Reply::Now(Ok(vec![item("1", "A")]))),
    ));

    let mut query = cache.list_query(None, true);
    let failed = query.settled().await;
    assert_eq!(failed, CacheEntry::failed(Vec::new(), "Network Error"));

    query.refetch();
    let recovered = query.settled().await;
    assert_eq!(recovered, CacheEntry::ready(vec![item("1", "A")]));
  }

  #[tokio::test]
  async fn test_purged_detail_is_fetched_again() {
    let cache = Arc::new(ResourceCache::new(
      ScriptedService::default()
        .detail_reply(Reply::Now(Ok(item("deal-42", "Before"))))
        .mutation_reply(Reply::Now(Ok(item("deal-42", "After"))))
        .list_reply(Reply::Now(Ok(Vec::new())))
        .detail_reply(Reply::Now(Ok(item("deal-42", "After")))),
    ));

    let mut query = cache.detail_query("deal-42", true);
    assert_eq!(query.settled().await.data, Some(item("deal-42", "Before")));

    cache.update("deal-42", &HashMap::new()).await.unwrap();
    assert!(query.changed().await);

    let entry = query.settled().await;
    assert_eq!(entry.data, Some(item("deal-42", "After")));
    assert_eq!(
      cache.service().calls(),
      vec!["find_one:deal-42", "update:deal-42", "find_all:-", "find_one:deal-42"]
    );
  }
}
