//! Store test doubles for exercising the lease protocol's failure paths.

use std::time::Duration;

use async_trait::async_trait;
use trava_lease::{LeaseStore, StoreError};

/// A store whose every round trip fails outright.
pub struct FailingStore;

#[async_trait]
impl LeaseStore for FailingStore {
    async fn set_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unreachable("connection refused".to_string()))
    }

    async fn compare_and_delete(&self, _key: &str, _expected: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unreachable("connection refused".to_string()))
    }

    async fn compare_and_extend(
        &self,
        _key: &str,
        _expected: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unreachable("connection refused".to_string()))
    }
}

/// A store that accepts requests and never answers them.
pub struct SilentStore;

#[async_trait]
impl LeaseStore for SilentStore {
    async fn set_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        std::future::pending().await
    }

    async fn compare_and_delete(&self, _key: &str, _expected: &str) -> Result<bool, StoreError> {
        std::future::pending().await
    }

    async fn compare_and_extend(
        &self,
        _key: &str,
        _expected: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        std::future::pending().await
    }
}
