// In-memory lease store
// Per-key atomicity comes from the map shard locks; expiry is lazy, with an
// optional background sweeper that physically removes dead entries

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metrics::{counter, gauge};
use tokio::time::Instant;
use tracing::debug;

use super::LeaseStore;
use crate::error::StoreError;

struct StoreEntry {
    value: String,
    expires_at: Instant,
}

impl StoreEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`LeaseStore`] backed by a `DashMap`.
///
/// Entries past their expiry are treated as absent by all three primitives,
/// so correctness never depends on the sweeper running. The sweeper only
/// bounds memory by removing dead entries that nobody touches again.
pub struct MemoryLeaseStore {
    entries: Arc<DashMap<String, StoreEntry>>,
    _sweeper: Option<tokio::task::JoinHandle<()>>,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            _sweeper: None,
        }
    }

    /// Attach a background task that removes expired entries every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_sweeper(self, interval: Duration) -> Self {
        let entries = self.entries.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let expired_keys: Vec<String> = entries
                    .iter()
                    .filter(|entry| entry.value().is_expired())
                    .map(|entry| entry.key().clone())
                    .collect();

                for key in &expired_keys {
                    // Re-checked under the shard lock: a racing set_if_absent
                    // may have revived the key since the scan
                    entries.remove_if(key, |_, entry| entry.is_expired());
                }

                if !expired_keys.is_empty() {
                    counter!("trava_lease_swept_keys_total").increment(expired_keys.len() as u64);
                    debug!(count = expired_keys.len(), "swept expired lease entries");
                }
                gauge!("trava_lease_live_keys").set(entries.len() as f64);
            }
        });

        Self {
            entries: self.entries,
            _sweeper: Some(handle),
        }
    }

    /// Current live holder value for `key`, if any.
    ///
    /// Not part of [`LeaseStore`]: the protocol itself never reads, but
    /// callers re-deriving truth after a communication failure (and tests)
    /// need a window into the store.
    pub fn current_value(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }
}

impl Default for MemoryLeaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let created = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(StoreEntry::new(value, ttl));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoreEntry::new(value, ttl));
                true
            }
        };
        Ok(created)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let deleted = self
            .entries
            .remove_if(key, |_, entry| {
                !entry.is_expired() && entry.value == expected
            })
            .is_some();
        Ok(deleted)
    }

    async fn compare_and_extend(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let extended = match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() && entry.value == expected => {
                entry.expires_at = Instant::now() + ttl;
                true
            }
            _ => false,
        };
        Ok(extended)
    }
}
