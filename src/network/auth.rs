//! Shared-Secret Authentication
//!
//! Writes require an `X-API-Key` header that exactly matches the configured
//! secret. Only a SHA-256 digest of the secret is held in memory, and only a
//! short hex fingerprint of it is ever logged.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Secret used when `API_KEY` is not set.
pub const DEFAULT_API_KEY: &str = "secret";

/// Authentication errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No key header on the request.
    #[error("missing API key")]
    Missing,
    /// Key header present but wrong.
    #[error("API key mismatch")]
    Mismatch,
}

/// Configured shared secret.
#[derive(Clone)]
pub struct ApiKey {
    digest: [u8; 32],
}

impl ApiKey {
    /// Wrap a secret.
    pub fn new(secret: &str) -> Self {
        Self { digest: digest(secret) }
    }

    /// Check a presented key. Comparison is exact: no trimming, case-sensitive.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let presented = presented.ok_or(AuthError::Missing)?;
        let candidate = digest(presented);

        // Compare every byte so timing does not depend on the mismatch position
        let diff = self
            .digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(AuthError::Mismatch)
        }
    }

    /// Short identifier safe to log.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest[..4])
    }

    /// True if this is the built-in default secret.
    pub fn is_default(&self) -> bool {
        self.digest == digest(DEFAULT_API_KEY)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"scoreboard-api-key:");
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_accepted() {
        let key = ApiKey::new("hunter2");
        assert_eq!(key.verify(Some("hunter2")), Ok(()));
    }

    #[test]
    fn test_missing_key_rejected() {
        let key = ApiKey::new("hunter2");
        assert_eq!(key.verify(None), Err(AuthError::Missing));
    }

    #[test]
    fn test_near_miss_keys_rejected() {
        let key = ApiKey::new("hunter2");
        for wrong in ["Hunter2", "hunter2 ", " hunter2", "hunter", ""] {
            assert_eq!(key.verify(Some(wrong)), Err(AuthError::Mismatch), "{wrong:?}");
        }
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let key = ApiKey::new("super-secret-value");
        let printed = format!("{:?}", key);
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains(&key.fingerprint()));
        assert_eq!(key.fingerprint().len(), 8);
    }

    #[test]
    fn test_default_detection() {
        assert!(ApiKey::new(DEFAULT_API_KEY).is_default());
        assert!(!ApiKey::new("other").is_default());
    }
}
