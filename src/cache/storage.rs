//! In-memory entry storage with per-key change notification.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use super::entry::CacheEntry;

/// Contents of one slot. `None` means the key has no entry (never fetched,
/// or purged after a mutation).
pub type Slot<T> = Option<CacheEntry<T>>;

/// Mapping from encoded key to entry.
///
/// Each key owns its own watch channel, so a write to one key wakes only the
/// subscribers of that key. Slots are created on first access and live as
/// long as the map.
pub struct EntryMap<T> {
  slots: Mutex<HashMap<String, watch::Sender<Slot<T>>>>,
}

impl<T: Clone> EntryMap<T> {
  pub fn new() -> Self {
    Self {
      slots: Mutex::new(HashMap::new()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, watch::Sender<Slot<T>>>> {
    // Writers never panic mid-update, a poisoned map is still consistent
    self.slots.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Current entry at `key`, if any.
  pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
    self.lock().get(key).and_then(|tx| tx.borrow().clone())
  }

  /// Subscribe to changes at `key`, creating an empty slot if needed.
  pub fn subscribe(&self, key: &str) -> watch::Receiver<Slot<T>> {
    self
      .lock()
      .entry(key.to_string())
      .or_insert_with(|| watch::channel(None).0)
      .subscribe()
  }

  /// Replace the entry at `key`.
  pub fn set(&self, key: &str, entry: CacheEntry<T>) {
    self.replace(key, Some(entry));
  }

  /// Compute the new entry from the current one and store it.
  ///
  /// The read and the write happen under one lock, so concurrent writers to
  /// the same key cannot interleave between them.
  pub fn update<F>(&self, key: &str, f: F) -> CacheEntry<T>
  where
    F: FnOnce(Option<&CacheEntry<T>>) -> CacheEntry<T>,
  {
    let mut slots = self.lock();
    let tx = slots
      .entry(key.to_string())
      .or_insert_with(|| watch::channel(None).0);
    let next = f(tx.borrow().as_ref());
    tx.send_replace(Some(next.clone()));
    next
  }

  /// Drop the entry at `key`. Subscribers see the slot go empty.
  pub fn purge(&self, key: &str) {
    let slots = self.lock();
    if let Some(tx) = slots.get(key) {
      tx.send_replace(None);
    }
  }

  /// Number of keys holding an entry.
  pub fn len(&self) -> usize {
    self
      .lock()
      .values()
      .filter(|tx| tx.borrow().is_some())
      .count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn replace(&self, key: &str, slot: Slot<T>) {
    let mut slots = self.lock();
    match slots.get(key) {
      Some(tx) => {
        tx.send_replace(slot);
      }
      None => {
        slots.insert(key.to_string(), watch::channel(slot).0);
      }
    }
  }
}

impl<T: Clone> Default for EntryMap<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_missing_key() {
    let map: EntryMap<Vec<u32>> = EntryMap::new();
    assert!(map.get("all").is_none());
    assert!(map.is_empty());
  }

  #[test]
  fn test_set_and_get() {
    let map = EntryMap::new();
    map.set("all", CacheEntry::ready(vec![1, 2]));
    assert_eq!(map.get("all"), Some(CacheEntry::ready(vec![1, 2])));
    assert_eq!(map.len(), 1);
  }

  #[test]
  fn test_update_sees_previous_entry() {
    let map = EntryMap::new();
    map.set("all", CacheEntry::ready(vec![7]));

    let next = map.update("all", |prev| {
      CacheEntry::pending(prev.map(|e| e.data.clone()).unwrap_or_default())
    });

    assert_eq!(next, CacheEntry::pending(vec![7]));
    assert_eq!(map.get("all"), Some(CacheEntry::pending(vec![7])));
  }

  #[tokio::test]
  async fn test_subscriber_only_woken_by_own_key() {
    let map = EntryMap::new();
    let mut rx_a = map.subscribe("by:a");
    let mut rx_b = map.subscribe("by:b");

    map.set("by:a", CacheEntry::ready(vec![1]));

    assert!(rx_a.has_changed().unwrap());
    assert!(!rx_b.has_changed().unwrap());
    assert_eq!(
      rx_a.borrow_and_update().clone(),
      Some(CacheEntry::ready(vec![1]))
    );
    assert!(rx_b.borrow_and_update().is_none());
  }

  #[tokio::test]
  async fn test_purge_empties_slot_and_notifies() {
    let map = EntryMap::new();
    map.set("deal-1", CacheEntry::ready(Some(1)));
    let mut rx = map.subscribe("deal-1");
    rx.borrow_and_update();

    map.purge("deal-1");

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_none());
    assert!(map.get("deal-1").is_none());
    assert!(map.is_empty());
  }
}
