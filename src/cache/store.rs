//! Key/value store backing the cache.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// In-memory cache keyed by any hashable `K`.
///
/// Reads hand out clones, so `V` is usually an `Arc` or a small value.
/// Concurrent writers to the same key resolve as last writer wins.
pub struct Cache<K, V> {
  entries: RwLock<HashMap<K, V>>,
}

impl<K: Hash + Eq, V: Clone> Cache<K, V> {
  pub fn new() -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
    }
  }

  // A panic while holding the lock cannot leave a half-written map behind,
  // so poisoning is ignored.
  fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
    self.entries.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
    self.entries.write().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(&self, key: &K) -> Option<V> {
    self.read().get(key).cloned()
  }

  pub fn set(&self, key: K, value: V) {
    self.write().insert(key, value);
  }

  pub fn remove(&self, key: &K) -> Option<V> {
    self.write().remove(key)
  }

  pub fn contains(&self, key: &K) -> bool {
    self.read().contains_key(key)
  }

  pub fn clear(&self) {
    let mut entries = self.write();
    trace!(entries = entries.len(), "clearing cache");
    entries.clear();
  }

  pub fn len(&self) -> usize {
    self.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().is_empty()
  }

  /// Return the cached value or fetch it.
  ///
  /// 1. Cached value present - return it, the fetcher never runs
  /// 2. Otherwise run the fetcher
  /// 3. On success store the value unless a concurrent fetch already did;
  ///    the first stored value wins and is what every caller gets back
  /// 4. On failure nothing is cached and the error is returned
  pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetcher: F) -> Result<V, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    if let Some(value) = self.get(&key) {
      return Ok(value);
    }

    let fetched = fetcher().await?;
    let mut entries = self.write();
    Ok(entries.entry(key).or_insert(fetched).clone())
  }
}

impl<K: Hash + Eq, V: Clone> Default for Cache<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let len = self
      .entries
      .read()
      .map(|e| e.len())
      .unwrap_or_else(|e| e.into_inner().len());
    f.debug_struct("Cache").field("entries", &len).finish()
  }
}
