//! Gerrit Test - Shared test utilities for the settings crates.
//!
//! This crate provides mock collaborators and fixtures that can be used
//! across crates as a dev-dependency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use gerrit_credentials::CredentialCache;
//! use gerrit_test::{MockSecretStore, SwitchableScope};
//!
//! let secrets = Arc::new(MockSecretStore::new());
//! let resolver = Arc::new(SwitchableScope::named("team-a"));
//! let cache = CredentialCache::new(secrets.clone());
//!
//! secrets.fail_all(true);
//! assert!(cache.preload(&resolver.current()).is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Install a `tracing` subscriber for tests, honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
