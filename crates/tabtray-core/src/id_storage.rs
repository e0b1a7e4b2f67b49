use std::num::NonZeroUsize;

use lru::LruCache;

use crate::ids::{DisplayId, TabId};
use crate::state::TabRecord;

pub const DEFAULT_ID_CACHE_CAPACITY: usize = 50;

/// Identity of a list row. Tabs and search-term groups never share an id
/// even when a tab id spells out a group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Tab(TabId),
    Group(String),
}

/// Lookups count as use. Once more than `capacity` distinct keys are seen the
/// least recently used key is dropped and gets a fresh id if it comes back.
#[derive(Debug)]
pub struct TabAdapterIdStorage {
    cache: LruCache<RowKey, DisplayId>,
    next_id: u64,
}

impl Default for TabAdapterIdStorage {
    fn default() -> Self {
        Self::new(DEFAULT_ID_CACHE_CAPACITY)
    }
}

impl TabAdapterIdStorage {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(clamp_capacity(capacity)),
            next_id: 1,
        }
    }

    pub fn get_stable_id(&mut self, tab: &TabRecord) -> DisplayId {
        self.get_stable_id_for_key(RowKey::Tab(tab.id.clone()))
    }

    pub fn get_stable_id_for_key(&mut self, key: RowKey) -> DisplayId {
        if let Some(id) = self.cache.get(&key) {
            return *id;
        }

        let id = DisplayId(self.next_id);
        self.next_id += 1;
        if let Some((evicted, _)) = self.cache.push(key, id) {
            tracing::trace!(?evicted, "display id evicted");
        }
        id
    }

    pub fn resize_cache_if_needed(&mut self, new_capacity: usize) {
        let new_capacity = clamp_capacity(new_capacity);
        if new_capacity != self.cache.cap() {
            tracing::debug!(
                from = self.cache.cap().get(),
                to = new_capacity.get(),
                "resizing display id cache"
            );
            self.cache.resize(new_capacity);
        }
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn clamp_capacity(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}
