//! In-process credential storage for retail partner OAuth tokens.
//!
//! Tokens live only for the process lifetime; nothing here touches disk or
//! the database. The [`CredentialStore`] trait is the seam that lets the
//! token manager target process memory today and a shared store later
//! without changing the refresh logic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Whether a credential was issued to the application itself or to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Client-credentials grant; re-fetched on expiry, no refresh token.
    App,
    /// Authorization-code grant; refreshed via the refresh token.
    User,
}

/// An OAuth access/refresh token pair with an expiry timestamp.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Epoch milliseconds after which the access token must not be used.
    pub expires_at_ms: i64,
    pub scope_kind: ScopeKind,
}

impl Credential {
    /// Whether the access token is still usable at `now_ms`.
    #[must_use]
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Keyed get/set/delete storage for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Credential>;
    async fn set(&self, key: &str, credential: Credential);
    async fn delete(&self, key: &str);
}

/// Process-memory credential store backed by a `tokio::sync::Mutex`.
///
/// There is deliberately no locking across get-then-set sequences: two
/// concurrent refreshes for the same key both write, last one wins. The
/// write is idempotent from the provider's perspective.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Option<Credential> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, credential: Credential) {
        self.entries.lock().await.insert(key.to_owned(), credential);
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at_ms: i64) -> Credential {
        Credential {
            access_token: "tok".to_owned(),
            refresh_token: None,
            expires_at_ms,
            scope_kind: ScopeKind::App,
        }
    }

    #[test]
    fn credential_validity_is_strict_at_expiry() {
        let cred = credential(1_000);
        assert!(cred.is_valid_at(999));
        assert!(!cred.is_valid_at(1_000));
        assert!(!cred.is_valid_at(1_001));
    }

    #[tokio::test]
    async fn memory_store_round_trips_and_deletes() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("app").await.is_none());

        store.set("app", credential(5_000)).await;
        let fetched = store.get("app").await.expect("stored credential");
        assert_eq!(fetched.access_token, "tok");

        store.delete("app").await;
        assert!(store.get("app").await.is_none());
    }
}
