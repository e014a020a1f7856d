//! Key-value store boundary
//!
//! The lease protocol composes exactly three atomic primitives; any store
//! that honors their contracts can stand behind this trait — the in-memory
//! implementation in this crate, or an adapter over a networked key-value
//! service written by the integrator.

mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryLeaseStore;

/// The three atomic primitives the lease protocol is built on.
///
/// Each method must perform its check and mutation as one indivisible step
/// on the store side. A plain read followed by a separate write does not
/// satisfy the contract: it reopens the race the protocol exists to close.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Create `key` holding `value` with the given time-to-live, only if the
    /// key does not already exist. Returns true iff this call created it.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;

    /// Delete `key`, only if it currently holds `expected`. Returns true iff
    /// the key existed with that value and was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    /// Reset the remaining time-to-live of `key` to `ttl`, only if it
    /// currently holds `expected`. Returns true iff the key existed with
    /// that value and its expiry was reset.
    async fn compare_and_extend(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;
}
