//! Tri-state record of one fetch.

/// Last known state of one list or detail fetch.
///
/// `data` is `Vec<T>` for list entries and `Option<T>` for detail entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
  /// Last fetched payload, or the empty value before the first success
  pub data: T,
  /// A fetch for this exact key is in flight
  pub is_loading: bool,
  /// Failure reason from the most recent attempt
  pub error: Option<String>,
}

/// Coarse status derived from an entry, for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
  /// Nothing requested yet (or the query is disabled)
  Idle,
  /// Fetch in flight
  Loading,
  /// Last fetch succeeded
  Ready,
  /// Last fetch failed
  Failed,
}

impl<T> CacheEntry<T> {
  /// Entry written when a fetch starts: keeps `data`, clears the error.
  pub fn pending(data: T) -> Self {
    Self {
      data,
      is_loading: true,
      error: None,
    }
  }

  /// Placeholder for a query that is not allowed to fetch.
  pub fn off(data: T) -> Self {
    Self {
      data,
      is_loading: false,
      error: None,
    }
  }

  pub fn ready(data: T) -> Self {
    Self {
      data,
      is_loading: false,
      error: None,
    }
  }

  pub fn failed(data: T, error: impl Into<String>) -> Self {
    Self {
      data,
      is_loading: false,
      error: Some(error.into()),
    }
  }

  pub fn status(&self) -> EntryStatus {
    match (self.is_loading, &self.error) {
      (true, _) => EntryStatus::Loading,
      (false, Some(_)) => EntryStatus::Failed,
      (false, None) => EntryStatus::Ready,
    }
  }

  pub fn is_settled(&self) -> bool {
    !self.is_loading
  }
}
