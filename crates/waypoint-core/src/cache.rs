//! Per-request memoization of built URLs

use crate::descriptor::RouteDescriptor;
use std::collections::HashMap;

/// Built URLs keyed by canonical descriptor
///
/// Owned by one request context and dropped with it. Keys are owned
/// snapshots, so later changes to the caller's params cannot reach a
/// cached entry.
#[derive(Debug, Default)]
pub struct BuildCache {
    entries: HashMap<RouteDescriptor, String>,
    hits: u64,
    misses: u64,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a built URL, counting the hit or miss
    pub fn get(&mut self, key: &RouteDescriptor) -> Option<String> {
        match self.entries.get(key) {
            Some(url) => {
                self.hits += 1;
                Some(url.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: RouteDescriptor, url: String) {
        self.entries.insert(key, url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop all entries and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
