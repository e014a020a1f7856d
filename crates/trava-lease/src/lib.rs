//! Trava Lease - mutual exclusion over a shared key-value store
//!
//! This crate provides:
//! - The [`Lease`] protocol: acquire / renew / release against one named
//!   resource, each operation a single atomic store round trip
//! - The [`LeaseStore`] boundary trait with the three primitives the
//!   protocol composes (set-if-absent, compare-and-delete,
//!   compare-and-extend)
//! - An in-memory store for tests and single-process embedding
//! - An opt-in background renewal task
//!
//! Safety comes entirely from the store's atomic primitives: across all
//! processes racing to acquire the same key, exactly one wins, and every
//! later mutation compares the winner's owner token first. That guarantee
//! ends when the lease's time-to-live does — a holder that fails to renew in
//! time no longer owns anything, however strongly it believes otherwise.

pub mod error;
pub mod lease;
pub mod model;
pub mod renew;
pub mod store;

pub use error::{LeaseError, StoreError};
pub use lease::Lease;
pub use model::{DEFAULT_LEASE_DURATION, OwnerToken};
pub use renew::{RenewalHandle, RenewalTask};
pub use store::{LeaseStore, MemoryLeaseStore};
