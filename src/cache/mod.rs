//! Keyed async resource cache.
//!
//! This module provides the read-through cache the dashboard screens share:
//! - Lists keyed by an optional filter value, details keyed by record id
//! - A `{data, is_loading, error}` entry per key, written before and after
//!   every fetch
//! - Per-key change notification so unrelated keys never wake each other
//! - Re-sync of the unfiltered list after every successful mutation

mod entry;
mod key;
pub mod layer;
mod storage;

pub use entry::{CacheEntry, EntryStatus};
pub use key::ListKey;
pub use layer::ResourceCache;
pub use storage::{EntryMap, Slot};
