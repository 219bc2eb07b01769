// ── Resource cache ──
//
// Id-keyed map of full resources behind one mutex, plus a `watch` revision
// counter for push-based change notification. Readers only ever receive
// copies; the lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hue_api::model::{Merge, Resource, StreamBatch};
use tokio::sync::watch;
use tracing::trace;

/// Concurrently readable mirror of bridge resources.
///
/// Entries are created by [`load`](Self::load) or [`insert`](Self::insert)
/// and are never removed. Patches for unknown ids are dropped.
pub struct ResourceCache {
    entries: Mutex<HashMap<String, Resource>>,

    /// Revision counter, bumped once per effective mutation.
    revision: watch::Sender<u64>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            entries: Mutex::new(HashMap::new()),
            revision,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Resource>> {
        // A panic mid-merge leaves a resource partially merged, which is
        // still a valid resource.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert or replace every resource, keyed by id.
    pub fn load(&self, initial: Vec<Resource>) {
        {
            let mut entries = self.lock();
            for r in initial {
                entries.insert(r.id.clone(), r);
            }
        }
        self.bump();
    }

    /// Register a single resource, replacing any entry with the same id.
    pub fn insert(&self, resource: Resource) {
        self.lock().insert(resource.id.clone(), resource);
        self.bump();
    }

    /// Merge one patch into the entry with the same id.
    ///
    /// Returns `false`, leaving the cache untouched, if no such entry exists.
    pub fn apply_patch(&self, patch: &Resource) -> bool {
        let applied = merge_into(&mut self.lock(), patch);
        if applied {
            self.bump();
        }
        applied
    }

    /// Apply every patch of every batch under a single lock acquisition,
    /// so readers see either none or all of them.
    ///
    /// Returns the number of patches that matched an entry.
    pub fn apply_batches(&self, batches: &[StreamBatch]) -> usize {
        let mut applied = 0;
        {
            let mut entries = self.lock();
            for patch in batches.iter().flat_map(|b| &b.data) {
                if merge_into(&mut entries, patch) {
                    applied += 1;
                }
            }
        }
        if applied > 0 {
            self.bump();
        }
        applied
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Independent copies of every entry, ordered by id.
    pub fn snapshot(&self) -> Vec<Resource> {
        let mut out: Vec<Resource> = self.lock().values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn get(&self, id: &str) -> Option<Resource> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Current revision. Starts at 0; every effective mutation adds 1.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribe to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Called after the lock is released.
    fn bump(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.revision.send_modify(|v| *v += 1);
    }
}

fn merge_into(entries: &mut HashMap<String, Resource>, patch: &Resource) -> bool {
    match entries.get_mut(&patch.id) {
        Some(dest) => {
            trace!(id = %patch.id, "merging patch");
            dest.merge_from(patch);
            true
        }
        None => {
            trace!(id = %patch.id, "ignoring patch for unknown resource");
            false
        }
    }
}
