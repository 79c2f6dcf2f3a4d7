//! The secure secret store boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{SecretStoreError, SecretStoreResult};
use crate::secret::Secret;

/// Opaque get/set/delete access to a credential vault.
///
/// Entries are addressed by an owner tag (the application) and a key
/// (derived per scope). Every call may block on I/O and may fail.
pub trait SecretStore: Send + Sync {
    /// Fetch the secret stored under `owner`/`key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`SecretStoreError`] if the backend fails.
    fn get(&self, owner: &str, key: &str) -> SecretStoreResult<Option<Secret>>;

    /// Store `secret` under `owner`/`key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`SecretStoreError`] if the backend fails.
    fn set(&self, owner: &str, key: &str, secret: &Secret) -> SecretStoreResult<()>;

    /// Remove the entry under `owner`/`key`. Removing a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`SecretStoreError`] if the backend fails.
    fn delete(&self, owner: &str, key: &str) -> SecretStoreResult<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn get(&self, owner: &str, key: &str) -> SecretStoreResult<Option<Secret>> {
        (**self).get(owner, key)
    }

    fn set(&self, owner: &str, key: &str, secret: &Secret) -> SecretStoreResult<()> {
        (**self).set(owner, key, secret)
    }

    fn delete(&self, owner: &str, key: &str) -> SecretStoreResult<()> {
        (**self).delete(owner, key)
    }
}

/// Process-local secret store for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RwLock<HashMap<(String, String), Secret>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in an Arc for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, owner: &str, key: &str) -> SecretStoreResult<Option<Secret>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| SecretStoreError::Internal(format!("Failed to read secrets: {e}")))?;
        Ok(entries.get(&(owner.to_owned(), key.to_owned())).cloned())
    }

    fn set(&self, owner: &str, key: &str, secret: &Secret) -> SecretStoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| SecretStoreError::Internal(format!("Failed to write secrets: {e}")))?;
        entries.insert((owner.to_owned(), key.to_owned()), secret.clone());
        Ok(())
    }

    fn delete(&self, owner: &str, key: &str) -> SecretStoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| SecretStoreError::Internal(format!("Failed to write secrets: {e}")))?;
        entries.remove(&(owner.to_owned(), key.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();
        assert!(store.get("owner", "key").unwrap().is_none());

        store.set("owner", "key", &Secret::new("s3cret")).unwrap();
        assert_eq!(store.get("owner", "key").unwrap(), Some(Secret::new("s3cret")));
        assert_eq!(store.len(), 1);

        store.delete("owner", "key").unwrap();
        assert!(store.get("owner", "key").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_owner_partitions_keys() {
        let store = MemorySecretStore::new();
        store.set("a", "key", &Secret::new("one")).unwrap();
        assert!(store.get("b", "key").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        assert!(MemorySecretStore::new().delete("owner", "nothing").is_ok());
    }
}
