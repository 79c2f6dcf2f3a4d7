//! Gerrit Settings - scope-aware settings facade.
//!
//! [`GerritSettings`] ties together the settings store, the credential cache
//! and a [`ScopeResolver`](gerrit_config::ScopeResolver). Callers read and
//! write individual settings; the facade routes each access to the current
//! workspace's record, creating it from the global record on first use.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gerrit_config::{BlockingPolicy, SettingsFile, WorkspaceTracker};
//! use gerrit_credentials::MemorySecretStore;
//! use gerrit_settings::GerritSettings;
//!
//! let file = SettingsFile::default_location().unwrap();
//! let workspaces = Arc::new(WorkspaceTracker::new());
//! workspaces.open_workspace("team-a");
//!
//! let settings = GerritSettings::open(&file, workspaces, MemorySecretStore::new().shared());
//! settings.set_host("https://team-a.example.com");
//!
//! // On the coordinating thread, before handing work to a background thread:
//! settings.preload_password();
//! let password = settings.password(BlockingPolicy::MustNotBlock).unwrap();
//!
//! settings.persist(&file).unwrap();
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auth;
pub mod settings;

pub use auth::AuthData;
pub use settings::GerritSettings;
