//! Gerrit Credentials - per-workspace credential handling.
//!
//! Credentials live in an external secure [`SecretStore`] (the OS keychain
//! in production). [`CredentialCache`] sits in front of it and enforces the
//! threading contract:
//!
//! - [`CredentialCache::preload`] blocks on the store and caches the result;
//! - [`CredentialCache::get`] on a thread that may block preloads implicitly;
//! - [`CredentialCache::get`] on a thread that must not block is served from
//!   the cache or fails with [`CredentialError::PreloadRequired`].
//!
//! Every other store failure is logged and read as "no secret".
//!
//! # Feature Flags
//!
//! - **`keychain`** - [`KeyringSecretStore`] backed by the `keyring` crate

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cache;
pub mod error;
pub mod key;
pub mod secret;
pub mod store;

#[cfg(feature = "keychain")]
pub mod keychain;

pub use cache::CredentialCache;
pub use error::{CredentialError, CredentialResult, SecretStoreError, SecretStoreResult};
pub use key::{DEFAULT_OWNER, GLOBAL_SECRET_KEY, secret_key};
pub use secret::Secret;
pub use store::{MemorySecretStore, SecretStore};

#[cfg(feature = "keychain")]
pub use keychain::KeyringSecretStore;
