//! Bounded memoization with first-in, first-out eviction.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A key → value cache holding at most `capacity` entries.
///
/// When an insert pushes the cache over capacity, the oldest inserted key is
/// evicted, regardless of how recently it was read. A capacity of zero
/// disables the cache: lookups always miss and inserts are ignored.
#[derive(Debug, Clone)]
pub struct MemoCache<K, V> {
    capacity: usize,
    order: VecDeque<K>,
    entries: HashMap<K, V>,
}

impl<K: Hash + Eq + Clone, V: Clone> MemoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.capacity > 0 && self.entries.contains_key(key)
    }

    /// Insert `value` under `key`. Re-inserting an existing key replaces the
    /// value but keeps its original position in the eviction order.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        self.evict_overflow();
    }

    /// Change the capacity, evicting the oldest entries if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    tracing::trace!(remaining = self.entries.len(), "memo entry evicted");
                }
                None => break,
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new(0)
    }
}
