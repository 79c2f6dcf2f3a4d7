//! The settings facade used by the rest of the integration.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gerrit_config::{
    BlockingPolicy, ConfigResult, Scope, ScopeContext, ScopeResolver, SettingsFile, SettingsRecord,
    SettingsStore, ShowProjectColumn,
};
use gerrit_credentials::{CredentialCache, CredentialResult, Secret, SecretStore};
use tracing::debug;

/// Generates a getter/setter pair for a boolean record field.
macro_rules! flag_accessors {
    ($($(#[$doc:meta])* $field:ident / $setter:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $field(&self) -> bool {
                self.with_current(|record| record.$field)
            }

            #[doc = concat!("Set `", stringify!($field), "` for the current scope.")]
            pub fn $setter(&self, value: bool) {
                self.update_current(|record| record.$field = value);
            }
        )*
    };
}

/// Settings for the current scope, plus its credential.
///
/// Every accessor asks the [`ScopeResolver`] for the current scope once,
/// materializes that scope's record from the global one if needed, then
/// reads or writes a single field. The first materialization of a workspace
/// also copies the global credential to it.
///
/// Writes are expected from one coordinating thread; reads of already
/// materialized scopes only take a shared lock and may come from anywhere.
///
/// Reading a scope that has no record yet creates it, which takes the write
/// lock and blocks on the secret store while the credential is seeded. A
/// thread that must not block should only read scopes the coordinating
/// thread has already touched, or use
/// [`peek_current_settings`](Self::peek_current_settings).
pub struct GerritSettings {
    store: RwLock<SettingsStore>,
    credentials: CredentialCache,
    resolver: Arc<dyn ScopeResolver>,
}

impl std::fmt::Debug for GerritSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GerritSettings")
            .field("store", &*self.read_store())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl GerritSettings {
    /// Assemble the facade from its parts.
    #[must_use]
    pub fn new(
        store: SettingsStore,
        credentials: CredentialCache,
        resolver: Arc<dyn ScopeResolver>,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            credentials,
            resolver,
        }
    }

    /// Start a session: load `file` (defaults if missing or malformed).
    #[must_use]
    pub fn open(
        file: &SettingsFile,
        resolver: Arc<dyn ScopeResolver>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self::new(file.load(), CredentialCache::new(secrets), resolver)
    }

    /// Write the settings to `file`. The current scope is materialized first
    /// so a workspace that was only looked at is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](gerrit_config::ConfigError) if the file
    /// cannot be written.
    pub fn persist(&self, file: &SettingsFile) -> ConfigResult<()> {
        let scope = self.current_scope();
        let materialized = file.save(&mut self.write_store(), &scope)?;
        if materialized.is_created() {
            self.credentials.seed_from_default(&scope);
        }
        Ok(())
    }

    /// The persisted form of the settings, with the same materialization as
    /// [`persist`](Self::persist).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](gerrit_config::ConfigError) if a record
    /// cannot be encoded.
    pub fn save_document(&self) -> ConfigResult<toml::Value> {
        let scope = self.current_scope();
        let saved = self.write_store().save(&scope)?;
        if saved.materialized.is_created() {
            self.credentials.seed_from_default(&scope);
        }
        Ok(saved.document)
    }

    /// The scope accessors currently operate on.
    #[must_use]
    pub fn current_scope(&self) -> Scope {
        self.resolver.current_scope()
    }

    /// The current scope together with the caller's blocking capability.
    #[must_use]
    pub fn context(&self, blocking: BlockingPolicy) -> ScopeContext {
        ScopeContext::resolve(self.resolver.as_ref(), blocking)
    }

    /// The credential cache.
    #[must_use]
    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    fn read_store(&self) -> RwLockReadGuard<'_, SettingsStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, SettingsStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_current<T>(&self, read: impl FnOnce(&SettingsRecord) -> T) -> T {
        let scope = self.current_scope();
        if let Some(record) = self.read_store().get(&scope) {
            return read(record);
        }
        self.with_record_mut(&scope, |record| read(record))
    }

    fn materialize(&self, scope: &Scope) {
        if !self.read_store().contains(scope) {
            self.with_record_mut(scope, |_| ());
        }
    }

    fn update_current(&self, write: impl FnOnce(&mut SettingsRecord)) {
        let scope = self.current_scope();
        self.with_record_mut(&scope, write);
    }

    fn with_record_mut<T>(&self, scope: &Scope, apply: impl FnOnce(&mut SettingsRecord) -> T) -> T {
        let (value, materialized) = {
            let mut store = self.write_store();
            let (record, materialized) = store.resolve_or_create(scope);
            (apply(record), materialized)
        };
        // Seeded outside the store lock: this blocks on the secret store.
        if materialized.is_created() {
            self.credentials.seed_from_default(scope);
        }
        value
    }

    /// Snapshot of the global record.
    #[must_use]
    pub fn global_settings(&self) -> SettingsRecord {
        self.read_store().global().clone()
    }

    /// Modify the global record directly. Existing workspaces are unaffected.
    pub fn update_global(&self, write: impl FnOnce(&mut SettingsRecord)) {
        write(self.write_store().global_mut());
    }

    /// Snapshot of the current scope's record. Creates the record (and
    /// seeds its credential, which blocks) on first access.
    #[must_use]
    pub fn current_settings(&self) -> SettingsRecord {
        self.with_current(SettingsRecord::clone)
    }

    /// Snapshot of the current scope's record if it already exists.
    ///
    /// Never creates a record and never touches the secret store, so it is
    /// safe on threads that must not block.
    #[must_use]
    pub fn peek_current_settings(&self) -> Option<SettingsRecord> {
        self.read_store().get(&self.current_scope()).cloned()
    }

    // -----------------------------------------------------------------------
    // Record fields
    // -----------------------------------------------------------------------

    /// Account name on the review server.
    #[must_use]
    pub fn login(&self) -> Option<String> {
        self.with_current(|record| record.login.clone())
    }

    /// Set the account name. An empty name clears it.
    pub fn set_login(&self, login: impl Into<String>) {
        let login = Some(login.into()).filter(|l| !l.is_empty());
        self.update_current(|record| record.login = login);
    }

    /// Review server URL (empty when unset).
    #[must_use]
    pub fn host(&self) -> String {
        self.with_current(|record| record.host.clone())
    }

    /// Set the review server URL.
    pub fn set_host(&self, host: impl Into<String>) {
        let host = host.into();
        self.update_current(|record| record.host = host);
    }

    /// Seconds between automatic refreshes.
    #[must_use]
    pub fn refresh_timeout(&self) -> u32 {
        self.with_current(|record| record.refresh_timeout)
    }

    /// Set the refresh interval in seconds.
    pub fn set_refresh_timeout(&self, seconds: u32) {
        self.update_current(|record| record.refresh_timeout = seconds);
    }

    /// Project column visibility.
    #[must_use]
    pub fn show_project_column(&self) -> ShowProjectColumn {
        self.with_current(|record| record.show_project_column)
    }

    /// Set project column visibility.
    pub fn set_show_project_column(&self, mode: ShowProjectColumn) {
        self.update_current(|record| record.show_project_column = mode);
    }

    /// Clone base URL, if one differs from the host.
    #[must_use]
    pub fn clone_base_url(&self) -> Option<String> {
        self.with_current(|record| record.clone_base_url.clone())
    }

    /// Set the clone base URL. An empty URL clears it.
    pub fn set_clone_base_url(&self, url: impl Into<String>) {
        let url = Some(url.into()).filter(|u| !u.is_empty());
        self.update_current(|record| record.clone_base_url = url);
    }

    /// The clone base URL when set, otherwise the host.
    #[must_use]
    pub fn clone_base_url_or_host(&self) -> String {
        self.with_current(|record| record.clone_base_url_or_host().to_owned())
    }

    /// Whether a login is configured (the password may still be empty).
    #[must_use]
    pub fn is_login_and_password_available(&self) -> bool {
        self.with_current(SettingsRecord::has_login)
    }

    flag_accessors! {
        /// List every change on the server, not only the user's own.
        list_all_changes / set_list_all_changes;
        /// Refresh the change list periodically.
        automatic_refresh / set_automatic_refresh;
        /// Notify about new review activity.
        review_notifications / set_review_notifications;
        /// Push to the review server instead of the plain remote.
        push_to_gerrit / set_push_to_gerrit;
        /// Show the numeric change number column.
        show_change_number_column / set_show_change_number_column;
        /// Show the Change-Id column.
        show_change_id_column / set_show_change_id_column;
        /// Show the topic column.
        show_topic_column / set_show_topic_column;
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// The current scope's password.
    ///
    /// # Errors
    ///
    /// Returns [`PreloadRequired`](gerrit_credentials::CredentialError::PreloadRequired)
    /// if `blocking` is [`BlockingPolicy::MustNotBlock`] and
    /// [`preload_password`](Self::preload_password) was not called for the
    /// current scope.
    pub fn password(&self, blocking: BlockingPolicy) -> CredentialResult<Option<Secret>> {
        self.credentials.get(&self.context(blocking))
    }

    /// Fetch the current scope's password into the cache. Blocks.
    pub fn preload_password(&self) -> Option<Secret> {
        let scope = self.current_scope();
        debug!(scope = %scope, "preloading password");
        self.credentials.preload(&scope)
    }

    /// Store the current scope's password. Blocks.
    ///
    /// The scope's record is created first, so first-use seeding from the
    /// global password happens before this write and never after it.
    pub fn set_password(&self, password: &Secret) {
        let scope = self.current_scope();
        self.materialize(&scope);
        self.credentials.set(&scope, password);
    }

    /// Delete the current scope's password. Blocks.
    ///
    /// Like [`set_password`](Self::set_password), creates the record first.
    pub fn forget_password(&self) {
        let scope = self.current_scope();
        self.materialize(&scope);
        self.credentials.forget(&scope);
    }

    /// The global password, independent of the current scope. Blocks.
    #[must_use]
    pub fn default_password(&self) -> Option<Secret> {
        self.credentials.default_secret()
    }

    /// Store the global password. Blocks.
    pub fn set_default_password(&self, password: &Secret) {
        self.credentials.set_default_secret(password);
    }
}
