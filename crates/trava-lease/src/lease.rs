//! The lease protocol
//!
//! A [`Lease`] is a value object bound to one resource key and one owner
//! token. Its three operations are each a single atomic round trip to the
//! store; the store is the only ground truth, and the instance itself holds
//! no mutable state.
//!
//! Caller-observable lifecycle: an unacquired lease becomes held when
//! `acquire` returns true; it stays held across successful `renew` calls and
//! ends with a successful `release`, with a `NotOwner` refusal (the key
//! expired or was taken over), or silently when the time-to-live elapses
//! store-side with no renewal. A lease that ended is done for good — start a
//! new attempt with a new instance and a fresh token, so a stale renewal from
//! the old instance can never touch the new holder's entry.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{LeaseError, StoreError};
use crate::model::OwnerToken;
use crate::store::LeaseStore;

/// A time-bounded claim of exclusive ownership over one named resource,
/// recorded in a shared store.
#[derive(Clone)]
pub struct Lease {
    store: Arc<dyn LeaseStore>,
    resource_key: String,
    owner_token: OwnerToken,
    duration: Duration,
    op_deadline: Option<Duration>,
}

impl Lease {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        resource_key: impl Into<String>,
        owner_token: OwnerToken,
        duration: Duration,
    ) -> Self {
        Self {
            store,
            resource_key: resource_key.into(),
            owner_token,
            duration,
            op_deadline: None,
        }
    }

    /// Bound every store round trip by `deadline`. When the store has not
    /// answered in time the operation fails with a communication error and
    /// the lease's true state is indeterminate.
    pub fn with_op_deadline(mut self, deadline: Duration) -> Self {
        self.op_deadline = Some(deadline);
        self
    }

    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }

    pub fn owner_token(&self) -> &OwnerToken {
        &self.owner_token
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Single non-blocking attempt to take the lease.
    ///
    /// Returns true iff this call created the key; false means someone else
    /// holds it, which is a normal contended outcome. Polling or backoff is
    /// the caller's business, layered above this primitive.
    ///
    /// On a communication error the caller must not assume ownership.
    pub async fn acquire(&self) -> Result<bool, LeaseError> {
        let created = self
            .bounded(
                self.store
                    .set_if_absent(&self.resource_key, self.owner_token.as_str(), self.duration),
            )
            .await?;

        if created {
            debug!(key = %self.resource_key, owner = %self.owner_token, "lease acquired");
        } else {
            debug!(key = %self.resource_key, "lease contended");
        }
        Ok(created)
    }

    /// Give the lease back, but only if this instance still holds it.
    ///
    /// `NotOwner` means the lease had already expired, been taken over, or
    /// was never acquired here; any cleanup the caller gated behind the lock
    /// is no longer known to be safe. On a communication error the key may
    /// still be held under this token, orphaned until its expiry fires.
    pub async fn release(&self) -> Result<(), LeaseError> {
        let deleted = self
            .bounded(
                self.store
                    .compare_and_delete(&self.resource_key, self.owner_token.as_str()),
            )
            .await?;

        if !deleted {
            warn!(key = %self.resource_key, owner = %self.owner_token, "release refused, lease no longer held by this owner");
            return Err(LeaseError::NotOwner);
        }
        debug!(key = %self.resource_key, owner = %self.owner_token, "lease released");
        Ok(())
    }

    /// Reset the store-side time-to-live back to the full lease duration,
    /// but only if this instance still holds the lease.
    ///
    /// `NotOwner` usually means the duration elapsed before this renewal
    /// arrived. Whether the holder renewed in time is the ground truth of
    /// ownership, not what the holder believes.
    pub async fn renew(&self) -> Result<(), LeaseError> {
        let extended = self
            .bounded(self.store.compare_and_extend(
                &self.resource_key,
                self.owner_token.as_str(),
                self.duration,
            ))
            .await?;

        if !extended {
            warn!(key = %self.resource_key, owner = %self.owner_token, "renew refused, lease no longer held by this owner");
            return Err(LeaseError::NotOwner);
        }
        debug!(key = %self.resource_key, owner = %self.owner_token, "lease renewed");
        Ok(())
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, LeaseError> {
        match self.op_deadline {
            Some(deadline) => match tokio::time::timeout(deadline, op).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(LeaseError::Communication(StoreError::Deadline(deadline))),
            },
            None => Ok(op.await?),
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("resource_key", &self.resource_key)
            .field("owner_token", &self.owner_token)
            .field("duration", &self.duration)
            .field("op_deadline", &self.op_deadline)
            .finish()
    }
}
