//! OS keychain backend (macOS Keychain, Windows Credential Manager,
//! Secret Service on Linux).

use crate::error::{SecretStoreError, SecretStoreResult};
use crate::secret::Secret;
use crate::store::SecretStore;

/// [`SecretStore`] backed by the platform keychain through `keyring`.
///
/// The owner tag maps to the keychain service name and the key to the
/// account name.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    /// Create the backend. No I/O happens until the first call.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn map_keyring_error(e: &keyring::Error) -> SecretStoreError {
    match e {
        keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
            SecretStoreError::Unavailable(e.to_string())
        },
        _ => SecretStoreError::Internal(e.to_string()),
    }
}

fn entry(owner: &str, key: &str) -> SecretStoreResult<keyring::Entry> {
    keyring::Entry::new(owner, key).map_err(|e| map_keyring_error(&e))
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, owner: &str, key: &str) -> SecretStoreResult<Option<Secret>> {
        match entry(owner, key)?.get_password() {
            Ok(password) => Ok(Some(Secret::new(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(&e)),
        }
    }

    fn set(&self, owner: &str, key: &str, secret: &Secret) -> SecretStoreResult<()> {
        entry(owner, key)?
            .set_password(secret.expose())
            .map_err(|e| map_keyring_error(&e))
    }

    fn delete(&self, owner: &str, key: &str) -> SecretStoreResult<()> {
        match entry(owner, key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(&e)),
        }
    }
}
