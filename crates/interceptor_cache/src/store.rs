use std::collections::HashMap;

use crate::entry::CacheEntry;
use crate::key::CacheKey;

/// The key/value mapping. Owned by the coordinator task, so no locking here.
#[derive(Debug, Default)]
pub(crate) struct MemoryCacheStore {
    inner: HashMap<CacheKey, CacheEntry>,
}

impl MemoryCacheStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.inner.get(key)
    }

    /// Insert or replace. Returns true when an older entry was overwritten.
    pub(crate) fn insert(&mut self, key: CacheKey, entry: CacheEntry) -> bool {
        self.inner.insert(key, entry).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::MemoryCacheStore;
    use crate::{entry::CacheEntry, key::CacheKey};

    #[test]
    fn last_writer_wins() {
        let mut store = MemoryCacheStore::new();
        let key = CacheKey::new("GET", "/a");

        assert!(!store.insert(key.clone(), CacheEntry::new(Bytes::from_static(b"one"))));
        assert!(store.insert(key.clone(), CacheEntry::new(Bytes::from_static(b"two"))));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).map(|e| e.body().as_ref()), Some(&b"two"[..]));
    }

    #[test]
    fn empty_store_misses() {
        let store = MemoryCacheStore::new();
        assert!(store.get(&CacheKey::new("GET", "/x")).is_none());
    }
}
