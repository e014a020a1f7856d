//! Error types for the lease protocol
//!
//! This module defines:
//! - `StoreError`: failures of the key-value store round trip itself
//! - `LeaseError`: protocol-level outcomes surfaced to the lease holder

use std::time::Duration;

/// Failures of a single store round trip.
///
/// Every variant means the operation's effect on the store is unknown: the
/// request may or may not have been applied before the failure.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store did not respond within {0:?}")]
    Deadline(Duration),
}

/// Protocol-level errors returned by lease operations.
///
/// A contended acquire is not an error; it is reported as `Ok(false)` by
/// [`Lease::acquire`](crate::lease::Lease::acquire).
#[derive(thiserror::Error, Debug)]
pub enum LeaseError {
    /// The key is absent or held under a different owner token. Terminal for
    /// this lease instance: its ownership is already gone and no retry of the
    /// failed operation can get it back.
    #[error("lease not held by this owner")]
    NotOwner,

    /// The store could not be reached or did not respond in time. The lease's
    /// true state is indeterminate; the caller must re-verify against the
    /// store before taking any ownership-dependent action.
    #[error("store communication failed: {0}")]
    Communication(#[from] StoreError),
}

impl LeaseError {
    pub fn is_not_owner(&self) -> bool {
        matches!(self, LeaseError::NotOwner)
    }

    pub fn is_communication(&self) -> bool {
        matches!(self, LeaseError::Communication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LeaseError::NotOwner;
        assert_eq!(format!("{}", err), "lease not held by this owner");

        let err = LeaseError::from(StoreError::Unreachable("connection refused".to_string()));
        assert_eq!(
            format!("{}", err),
            "store communication failed: store unreachable: connection refused"
        );

        let err = StoreError::Deadline(Duration::from_secs(2));
        assert_eq!(format!("{}", err), "store did not respond within 2s");
    }

    #[test]
    fn test_error_predicates() {
        assert!(LeaseError::NotOwner.is_not_owner());
        assert!(!LeaseError::NotOwner.is_communication());

        let err = LeaseError::from(StoreError::Deadline(Duration::from_millis(500)));
        assert!(err.is_communication());
        assert!(!err.is_not_owner());
    }
}
