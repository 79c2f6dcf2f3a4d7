#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Scoped settings for the Gerrit integration.
//!
//! Settings are defined once globally and may be overridden per workspace.
//! This crate owns the scope model, the per-scope record, the store that
//! materializes workspace records from the global one, and the TOML document
//! the store is persisted as.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gerrit_config::{Scope, SettingsFile};
//!
//! let file = SettingsFile::default_location().unwrap();
//! let mut store = file.load();
//!
//! // First access to a workspace copies the global record.
//! let (record, _) = store.resolve_or_create(&Scope::named("team-a"));
//! record.host = "https://team-a.example.com".to_owned();
//!
//! file.save(&mut store, &Scope::named("team-a")).unwrap();
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other internal crates**. Credentials
//! live in `gerrit-credentials`; the caller is told when a workspace record
//! was created via [`Materialized`] so it can seed that workspace's secret.

/// Persisted document encoding.
pub mod document;
/// Configuration error types.
pub mod error;
/// Settings file discovery and I/O.
pub mod file;
/// Per-scope settings record.
pub mod record;
/// Scopes, scope resolution and per-operation context.
pub mod scope;
/// Scope-to-record store.
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use file::SettingsFile;
pub use record::{SettingsRecord, ShowProjectColumn};
pub use scope::{
    BlockingPolicy, FixedScope, GLOBAL_TAG, GlobalOnly, Scope, ScopeContext, ScopeResolver,
    WorkspaceTracker,
};
pub use store::{Materialized, SavedDocument, SettingsStore};
