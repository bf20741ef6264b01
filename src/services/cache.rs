//! Session-scoped result cache.
//!
//! Two independent maps: query key → candidate list, and resource id →
//! resolved resource. Entries are never evicted; the owning control closes
//! the cache on teardown, after which it stays empty.
//!
//! The same id routinely names both a topic's article and its image, so
//! resources are stored per kind: a cached blurb never shadows a thumbnail.

use crate::types::{CandidateList, QueryKey, ResourceEntry, ResourceKind};
use ahash::AHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Result cache shared by the fetcher and joiner of one control.
///
/// Writes are overwrite-only and idempotent per key, so interleaved fetches
/// writing the same key are harmless. Locks are held only for the map
/// operation itself, never across an await point.
#[derive(Default)]
pub struct ResultCache {
    candidates: RwLock<AHashMap<QueryKey, CandidateList>>,
    resources: RwLock<AHashMap<(ResourceKind, String), ResourceEntry>>,
    closed: AtomicBool,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached candidate list for `key`, if any.
    pub fn get_candidates(&self, key: &QueryKey) -> Option<CandidateList> {
        let map = self.candidates.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned()
    }

    /// Stores `list` under `key`, replacing any previous entry.
    pub fn put_candidates(&self, key: QueryKey, list: CandidateList) {
        let mut map = self.candidates.write().unwrap_or_else(|e| e.into_inner());
        if self.is_closed() {
            tracing::trace!("cache closed, dropping candidates for {}", key);
            return;
        }
        map.insert(key, list);
    }

    /// Returns the cached resource of `kind` for `id`, if any.
    pub fn get_resource(&self, kind: ResourceKind, id: &str) -> Option<ResourceEntry> {
        let map = self.resources.read().unwrap_or_else(|e| e.into_inner());
        map.get(&(kind, id.to_string())).cloned()
    }

    /// Stores `entry` under `id`, replacing any previous entry of the same kind.
    pub fn put_resource(&self, id: impl Into<String>, entry: ResourceEntry) {
        let mut map = self.resources.write().unwrap_or_else(|e| e.into_inner());
        if self.is_closed() {
            return;
        }
        map.insert((entry.kind(), id.into()), entry);
    }

    /// Number of cached candidate lists.
    pub fn candidate_len(&self) -> usize {
        self.candidates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Number of cached resources.
    pub fn resource_len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Drops every entry and ignores all later writes.
    ///
    /// Called when the owning control is torn down. Fetches still in flight
    /// at that point complete without repopulating the cache.
    pub fn close(&self) {
        let mut candidates = self.candidates.write().unwrap_or_else(|e| e.into_inner());
        let mut resources = self.resources.write().unwrap_or_else(|e| e.into_inner());
        self.closed.store(true, Ordering::SeqCst);
        candidates.clear();
        resources.clear();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResultCache>();
};
