//! Credential error types.

/// Errors reported by a [`SecretStore`](crate::SecretStore) backend.
///
/// These never escape [`CredentialCache`](crate::CredentialCache): they are
/// logged and treated as "no secret".
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    /// The backend (keychain daemon, vault) could not be reached.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the operation.
    #[error("secret store error: {0}")]
    Internal(String),
}

/// Result type for secret store backends.
pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Errors surfaced by [`CredentialCache`](crate::CredentialCache).
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A thread that must not block asked for a credential that was never
    /// preloaded. This is a caller bug, not a runtime condition.
    #[error(
        "credential for scope {scope} was not preloaded; call `CredentialCache::preload` \
         from a thread that may block before reading it here"
    )]
    PreloadRequired {
        /// Display form of the scope that was requested.
        scope: String,
    },
}

/// Result type for credential cache operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
