//! Identity map from `(type, id)` to one canonical instance per adapter.
//!
//! Entries carry an expiry deadline instead of a timer. Expired entries are
//! swept lazily whenever the cache is touched, so an entry that is not
//! refreshed within its lifetime is gone from the next observation on.
//! Holders of an evicted instance keep a valid, now unmanaged, handle.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::model::{InstanceRef, ModelInstance};

/// Default lifetime of a cached instance (5 minutes).
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// No identity map: every reconciliation returns a fresh instance.
    Disabled,
    /// Identity is kept for the life of the adapter; nothing expires.
    Unbounded,
    Expiring(Duration),
}

impl CachePolicy {
    /// Zero lifetime keeps identity without eviction.
    pub fn from_lifetime(lifetime: Duration) -> Self {
        if lifetime.is_zero() {
            CachePolicy::Unbounded
        } else {
            CachePolicy::Expiring(lifetime)
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Expiring(DEFAULT_LIFETIME)
    }
}

struct CacheEntry {
    instance: InstanceRef,
    expires_at: Option<Instant>,
}

pub struct InstanceCache {
    policy: CachePolicy,
    entries: Mutex<HashMap<String, Bucket>>,
}

impl InstanceCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn deadline(&self, now: Instant) -> Option<Instant> {
        match self.policy {
            CachePolicy::Expiring(lifetime) => Some(now + lifetime),
            CachePolicy::Unbounded | CachePolicy::Disabled => None,
        }
    }

    /// Returns the canonical instance for `candidate`.
    ///
    /// A new identifier makes `candidate` canonical. A known identifier has the
    /// candidate's fields, saved flag, errors and creation time patched onto
    /// the existing instance, whose handle is returned. Either way the entry's
    /// deadline is pushed out by a full lifetime.
    pub fn reconcile(&self, type_name: &str, candidate: ModelInstance) -> InstanceRef {
        if self.policy == CachePolicy::Disabled || candidate.id().is_none() {
            return InstanceRef::new(candidate);
        }

        let now = Instant::now();
        let expires_at = self.deadline(now);
        let mut entries = self.entries.lock();
        let bucket = entries.entry(type_name.to_string()).or_default();
        sweep_bucket(bucket, now);
        reconcile_entry(bucket, type_name, candidate, expires_at)
    }

    /// Reconciles each candidate, preserving input order. The type's bucket
    /// is swept once for the whole batch.
    pub fn reconcile_many<I>(&self, type_name: &str, candidates: I) -> Vec<InstanceRef>
    where
        I: IntoIterator<Item = ModelInstance>,
    {
        if self.policy == CachePolicy::Disabled {
            return candidates.into_iter().map(InstanceRef::new).collect();
        }

        let now = Instant::now();
        let expires_at = self.deadline(now);
        let mut entries = self.entries.lock();
        let bucket = entries.entry(type_name.to_string()).or_default();
        sweep_bucket(bucket, now);
        candidates
            .into_iter()
            .map(|candidate| reconcile_entry(bucket, type_name, candidate, expires_at))
            .collect()
    }

    pub fn get(&self, type_name: &str, id: &str) -> Option<InstanceRef> {
        let mut entries = self.entries.lock();
        sweep(&mut entries, Instant::now());
        entries
            .get(type_name)
            .and_then(|bucket| bucket.get(id))
            .map(|entry| entry.instance.clone())
    }

    pub fn contains(&self, type_name: &str, id: &str) -> bool {
        self.get(type_name, id).is_some()
    }

    pub fn evict(&self, type_name: &str, id: &str) -> Option<InstanceRef> {
        let mut entries = self.entries.lock();
        let removed = entries
            .get_mut(type_name)
            .and_then(|bucket| bucket.remove(id))
            .map(|entry| entry.instance);
        if removed.is_some() {
            tracing::debug!(type_name, id, "evicted cached instance");
        }
        removed
    }

    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock();
        sweep(&mut entries, Instant::now());
        entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drops expired entries now; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        sweep(&mut entries, Instant::now())
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

type Bucket = HashMap<String, CacheEntry>;

fn reconcile_entry(
    bucket: &mut Bucket,
    type_name: &str,
    candidate: ModelInstance,
    expires_at: Option<Instant>,
) -> InstanceRef {
    let Some(id) = candidate.id() else {
        return InstanceRef::new(candidate);
    };

    match bucket.get_mut(&id) {
        Some(entry) => {
            {
                let mut canonical = entry.instance.write();
                canonical.apply_patch(&candidate.fields);
                canonical.saved = candidate.saved;
                canonical.errors = candidate.errors;
                if candidate.created_at.is_some() {
                    canonical.created_at = candidate.created_at;
                }
            }
            entry.expires_at = expires_at;
            tracing::debug!(type_name, id = %id, "reconciled onto cached instance");
            entry.instance.clone()
        }
        None => {
            let instance = InstanceRef::new(candidate);
            bucket.insert(
                id.clone(),
                CacheEntry {
                    instance: instance.clone(),
                    expires_at,
                },
            );
            tracing::debug!(type_name, id = %id, "cached new instance");
            instance
        }
    }
}

fn sweep_bucket(bucket: &mut Bucket, now: Instant) -> usize {
    let before = bucket.len();
    bucket.retain(|_, entry| entry.expires_at.map_or(true, |at| at > now));
    before - bucket.len()
}

fn sweep(entries: &mut HashMap<String, Bucket>, now: Instant) -> usize {
    let removed: usize = entries
        .values_mut()
        .map(|bucket| sweep_bucket(bucket, now))
        .sum();
    entries.retain(|_, bucket| !bucket.is_empty());
    removed
}
