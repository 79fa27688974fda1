//! Backend-agnostic token store contract.
//!
//! Callers that only need insert/get/delete can depend on [`TokenStore`]
//! rather than on [`MemoryStore`] directly, so that a different backend
//! can be swapped in without touching them. Every operation carries an
//! error channel even though the in-memory backend never fails.

use crate::entry::Expiry;
use crate::error::Result;
use crate::store::MemoryStore;

/// Trait for token storage backends.
///
/// The associated `Value` type is the payload stored per token, e.g. raw
/// bytes (`Vec<u8>`) or an application session object.
pub trait TokenStore: Send + Sync {
    /// The payload type stored under each token.
    type Value: Clone + Send + Sync + 'static;

    /// Store `value` under `token` until `expires_at`, replacing any
    /// existing entry.
    fn insert(&self, token: &str, value: Self::Value, expires_at: Expiry) -> Result<()>;

    /// Look up the payload for `token`.
    ///
    /// Returns `Ok(None)` if the token is unknown or expired.
    fn get(&self, token: &str) -> Result<Option<Self::Value>>;

    /// Remove `token`. Removing an unknown token is not an error.
    fn delete(&self, token: &str) -> Result<()>;
}

impl<V> TokenStore for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;

    fn insert(&self, token: &str, value: V, expires_at: Expiry) -> Result<()> {
        MemoryStore::insert(self, token, value, expires_at)
    }

    fn get(&self, token: &str) -> Result<Option<V>> {
        Ok(MemoryStore::get(self, token))
    }

    fn delete(&self, token: &str) -> Result<()> {
        MemoryStore::delete(self, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Minimal login/logout flow written only against the trait.
    fn login<S>(store: &S, token: &str, user: &str) -> Result<()>
    where
        S: TokenStore<Value = Vec<u8>>,
    {
        let expires_at = Expiry::after(Duration::from_secs(60));
        store.insert(token, user.as_bytes().to_vec(), expires_at)
    }

    fn current_user<S>(store: &S, token: &str) -> Result<Option<String>>
    where
        S: TokenStore<Value = Vec<u8>>,
    {
        Ok(store
            .get(token)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    #[test]
    fn test_memory_store_through_trait() {
        let store: MemoryStore = MemoryStore::without_sweep();

        login(&store, "abc", "alice").unwrap();
        assert_eq!(
            current_user(&store, "abc").unwrap(),
            Some("alice".to_string())
        );

        TokenStore::delete(&store, "abc").unwrap();
        assert_eq!(current_user(&store, "abc").unwrap(), None);

        // Deleting again is fine.
        TokenStore::delete(&store, "abc").unwrap();
    }

    #[test]
    fn test_trait_object() {
        let store: Arc<dyn TokenStore<Value = String>> =
            Arc::new(MemoryStore::<String>::without_sweep());

        let expired = Expiry::from(Instant::now() - Duration::from_secs(1));
        store.insert("token", "payload".to_string(), expired).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }
}
