//! Scope-to-record mapping with copy-on-first-use materialization.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::document;
use crate::error::ConfigResult;
use crate::record::SettingsRecord;
use crate::scope::Scope;

/// Whether [`SettingsStore::resolve_or_create`] had to create the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// The record already existed (or the scope is global).
    Existing,
    /// The record was cloned from the global record just now.
    Created,
}

impl Materialized {
    /// Whether a new record was created.
    #[must_use]
    pub fn is_created(self) -> bool {
        self == Self::Created
    }
}

/// Output of [`SettingsStore::save`].
#[derive(Debug, Clone)]
pub struct SavedDocument {
    /// The document to hand to the file layer.
    pub document: toml::Value,
    /// Whether saving materialized the current scope.
    pub materialized: Materialized,
}

/// All settings records, keyed by scope.
///
/// The global record always exists. A workspace record is created on first
/// access as a copy of the global record at that moment; after that the two
/// evolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsStore {
    global: SettingsRecord,
    scopes: BTreeMap<String, SettingsRecord>,
}

impl SettingsStore {
    /// Store holding only `global`.
    #[must_use]
    pub fn new(global: SettingsRecord) -> Self {
        Self {
            global,
            scopes: BTreeMap::new(),
        }
    }

    /// The global record.
    #[must_use]
    pub fn global(&self) -> &SettingsRecord {
        &self.global
    }

    /// Mutable access to the global record.
    pub fn global_mut(&mut self) -> &mut SettingsRecord {
        &mut self.global
    }

    /// The record for `scope` if it exists. Never creates one.
    #[must_use]
    pub fn get(&self, scope: &Scope) -> Option<&SettingsRecord> {
        match scope.name() {
            None => Some(&self.global),
            Some(name) => self.scopes.get(name),
        }
    }

    /// Whether `scope` has a record (the global scope always does).
    #[must_use]
    pub fn contains(&self, scope: &Scope) -> bool {
        self.get(scope).is_some()
    }

    /// Names of all materialized workspace scopes, sorted.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// The record for `scope`, cloning the global record first if `scope`
    /// has never been seen.
    ///
    /// The global scope (including names reserved for it) returns the global
    /// record directly. The caller is told whether a record was created so
    /// it can seed the new scope's credential.
    pub fn resolve_or_create(&mut self, scope: &Scope) -> (&mut SettingsRecord, Materialized) {
        let Some(name) = scope.name() else {
            return (&mut self.global, Materialized::Existing);
        };

        let mut materialized = Materialized::Existing;
        let global = &self.global;
        let record = self.scopes.entry(name.to_owned()).or_insert_with(|| {
            debug!(scope = %name, "materializing workspace settings from global defaults");
            materialized = Materialized::Created;
            global.clone()
        });
        (record, materialized)
    }

    /// Build a store from a persisted document.
    ///
    /// Never fails: a malformed root yields a default global record and no
    /// workspaces, with a warning. Malformed workspace entries are skipped.
    #[must_use]
    pub fn load(document: &toml::Value) -> Self {
        match document::parse(document) {
            Ok(parsed) => {
                let mut store = Self::new(parsed.global);
                for (name, record) in parsed.scopes {
                    if store.scopes.insert(name.clone(), record).is_some() {
                        warn!(scope = %name, "duplicate workspace entry; keeping the last one");
                    }
                }
                info!(workspaces = store.scopes.len(), "loaded settings");
                store
            },
            Err(e) => {
                warn!(error = %e, "error while loading settings; using defaults");
                Self::default()
            },
        }
    }

    /// [`load`](Self::load) from TOML text, with the same fallback rules.
    #[must_use]
    pub fn load_str(text: &str, origin: &str) -> Self {
        match document::from_text(text, origin) {
            Ok(document) => Self::load(&document),
            Err(e) => {
                warn!(error = %e, "error while loading settings; using defaults");
                Self::default()
            },
        }
    }

    /// Serialize the store, first materializing `current` so a workspace that
    /// was only read this session is still written out.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be encoded.
    pub fn save(&mut self, current: &Scope) -> ConfigResult<SavedDocument> {
        let (_, materialized) = self.resolve_or_create(current);
        let document = self.to_document()?;
        Ok(SavedDocument {
            document,
            materialized,
        })
    }

    /// Serialize the store as it is, without materializing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be encoded.
    pub fn to_document(&self) -> ConfigResult<toml::Value> {
        document::emit(
            &self.global,
            self.scopes
                .iter()
                .map(|(name, record)| (name.as_str(), record)),
        )
    }
}
