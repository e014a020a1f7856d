//! Lease data model

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lease duration (30 seconds)
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(30);

/// Opaque proof of ownership for a single lease attempt.
///
/// The token is compared by every mutating store operation, so two concurrent
/// attempts must never share one. [`OwnerToken::random`] is the recommended
/// way to mint a token; callers with their own identity scheme (for example
/// process id plus attempt counter) can supply it via [`OwnerToken::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerToken(String);

impl OwnerToken {
    /// Mint a fresh random token.
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for OwnerToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tokens_are_distinct() {
        let a = OwnerToken::random();
        let b = OwnerToken::random();
        assert!(!a.as_str().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_display_matches_inner() {
        let token = OwnerToken::new("worker-7#attempt-3");
        assert_eq!(format!("{}", token), "worker-7#attempt-3");
        assert_eq!(token.as_str(), "worker-7#attempt-3");
    }

    #[test]
    fn test_token_from_str() {
        let token: OwnerToken = "abc".into();
        assert_eq!(token, OwnerToken::new("abc"));
    }
}
