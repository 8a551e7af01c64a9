//! Keyed resource cache that orchestrates fetches against a resource service.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{CreateService, Failure, ResourceService, UpdateService};

use super::entry::CacheEntry;
use super::key::ListKey;
use super::storage::{EntryMap, Slot};

/// Read-through cache for one resource.
///
/// Holds two entry maps: lists keyed by [`ListKey`] and details keyed by
/// record id. Each fetch writes a loading entry before calling the service
/// and exactly one terminal entry after it resolves. Nothing is retried,
/// coalesced or cancelled; when two fetches for one key overlap, whichever
/// resolves last wins.
pub struct ResourceCache<S: ResourceService> {
  service: Arc<S>,
  lists: EntryMap<Vec<S::Item>>,
  details: EntryMap<Option<S::Item>>,
  create_loading: watch::Sender<bool>,
  mutate_loading: watch::Sender<bool>,
}

/// Clears a loading flag when dropped, whatever way the mutation ends.
struct FlagGuard<'a>(&'a watch::Sender<bool>);

impl<'a> FlagGuard<'a> {
  fn raise(flag: &'a watch::Sender<bool>) -> Self {
    flag.send_replace(true);
    Self(flag)
  }
}

impl Drop for FlagGuard<'_> {
  fn drop(&mut self) {
    self.0.send_replace(false);
  }
}

fn reason(failure: &Failure, fallback: &str) -> String {
  failure.message().unwrap_or(fallback).to_string()
}

impl<S: ResourceService> ResourceCache<S> {
  /// Create a cache in front of the given service.
  pub fn new(service: S) -> Self {
    Self {
      service: Arc::new(service),
      lists: EntryMap::new(),
      details: EntryMap::new(),
      create_loading: watch::channel(false).0,
      mutate_loading: watch::channel(false).0,
    }
  }

  pub fn service(&self) -> &S {
    &self.service
  }

  // ==========================================================================
  // Reads
  // ==========================================================================

  /// Current list entry for a filter, if one was ever written.
  pub fn list_entry(&self, filter: Option<&str>) -> Option<CacheEntry<Vec<S::Item>>> {
    self.lists.get(&ListKey::from_filter(filter).encode())
  }

  /// Current detail entry for an id, if present.
  pub fn detail_entry(&self, id: &str) -> Option<CacheEntry<Option<S::Item>>> {
    self.details.get(id)
  }

  pub fn subscribe_list(&self, filter: Option<&str>) -> watch::Receiver<Slot<Vec<S::Item>>> {
    self.lists.subscribe(&ListKey::from_filter(filter).encode())
  }

  pub fn subscribe_detail(&self, id: &str) -> watch::Receiver<Slot<Option<S::Item>>> {
    self.details.subscribe(id)
  }

  pub fn is_creating(&self) -> bool {
    *self.create_loading.borrow()
  }

  pub fn is_mutating(&self) -> bool {
    *self.mutate_loading.borrow()
  }

  pub fn subscribe_creating(&self) -> watch::Receiver<bool> {
    self.create_loading.subscribe()
  }

  pub fn subscribe_mutating(&self) -> watch::Receiver<bool> {
    self.mutate_loading.subscribe()
  }

  // ==========================================================================
  // Fetches
  // ==========================================================================

  /// Start a list fetch and return without waiting for it.
  ///
  /// The loading entry is written before this returns; the terminal entry is
  /// written by the spawned task.
  pub fn fetch_list(self: &Arc<Self>, filter: Option<&str>) -> JoinHandle<()> {
    let key = ListKey::from_filter(filter);
    self.begin_list(&key);

    let cache = Arc::clone(self);
    tokio::spawn(async move { cache.finish_list(key).await })
  }

  /// Fetch a list and wait for the terminal entry.
  pub async fn load_list(&self, filter: Option<&str>) {
    let key = ListKey::from_filter(filter);
    self.begin_list(&key);
    self.finish_list(key).await;
  }

  /// Start a detail fetch and return without waiting for it.
  ///
  /// The id is not checked; callers gate empty ids themselves.
  pub fn fetch_detail(self: &Arc<Self>, id: &str) -> JoinHandle<()> {
    self.begin_detail(id);

    let cache = Arc::clone(self);
    let id = id.to_string();
    tokio::spawn(async move { cache.finish_detail(&id).await })
  }

  /// Fetch a detail record and wait for the terminal entry.
  pub async fn load_detail(&self, id: &str) {
    self.begin_detail(id);
    self.finish_detail(id).await;
  }

  fn begin_list(&self, key: &ListKey) {
    debug!(key = %key.encode(), "list fetch started");
    self.lists.update(&key.encode(), |prev| {
      CacheEntry::pending(prev.map(|e| e.data.clone()).unwrap_or_default())
    });
  }

  async fn finish_list(&self, key: ListKey) {
    let encoded = key.encode();
    match self.service.find_all(key.param()).await {
      Ok(items) => {
        debug!(key = %encoded, count = items.len(), "list fetch finished");
        self.lists.set(&encoded, CacheEntry::ready(items));
      }
      Err(failure) => {
        warn!(key = %encoded, error = %failure, "list fetch failed");
        let message = reason(&failure, self.service.list_fallback());
        self.lists.set(&encoded, CacheEntry::failed(Vec::new(), message));
      }
    }
  }

  fn begin_detail(&self, id: &str) {
    debug!(id, "detail fetch started");
    self.details.update(id, |prev| {
      CacheEntry::pending(prev.and_then(|e| e.data.clone()))
    });
  }

  async fn finish_detail(&self, id: &str) {
    match self.service.find_one(id).await {
      Ok(item) => {
        debug!(id, "detail fetch finished");
        self.details.set(id, CacheEntry::ready(Some(item)));
      }
      Err(failure) => {
        warn!(id, error = %failure, "detail fetch failed");
        let message = reason(&failure, self.service.detail_fallback());
        self.details.set(id, CacheEntry::failed(None, message));
      }
    }
  }
}

impl<S: CreateService> ResourceCache<S> {
  /// Create a record, then re-sync the unfiltered list from the server.
  ///
  /// A failure is returned untouched and leaves every entry as it was.
  pub async fn create(&self, payload: &S::CreateDto) -> Result<S::Item, Failure> {
    let created = {
      let _creating = FlagGuard::raise(&self.create_loading);
      self.service.create(payload).await
    };

    match created {
      Ok(item) => {
        info!("record created, reconciling list");
        self.load_list(None).await;
        Ok(item)
      }
      Err(failure) => {
        warn!(error = %failure, "create failed");
        Err(failure)
      }
    }
  }
}

impl<S: UpdateService> ResourceCache<S> {
  /// Update a record, drop its cached detail, then re-sync the unfiltered
  /// list from the server.
  pub async fn update(&self, id: &str, payload: &S::UpdateDto) -> Result<S::Item, Failure> {
    let updated = {
      let _mutating = FlagGuard::raise(&self.mutate_loading);
      self.service.update(id, payload).await
    };

    match updated {
      Ok(item) => {
        info!(id, "record updated, reconciling list");
        self.details.purge(id);
        self.load_list(None).await;
        Ok(item)
      }
      Err(failure) => {
        warn!(id, error = %failure, "update failed");
        Err(failure)
      }
    }
  }
}
