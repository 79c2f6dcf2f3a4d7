//! Per-scope credential cache in front of a [`SecretStore`].
//!
//! The cache is only filled by [`CredentialCache::preload`] (or by a `get`
//! that is allowed to block, which preloads implicitly). A `get` that must
//! not block is served from the cache or fails with
//! [`CredentialError::PreloadRequired`]; it never silently returns a stale or
//! empty placeholder.
//!
//! Backend failures are logged and read as "no secret".
//!
//! Writes refresh the cache: a successful `set` caches the new value and a
//! successful `forget` caches "absent". Concurrent readers therefore see
//! either the previous or the new value, last write wins.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gerrit_config::{Scope, ScopeContext};
use tracing::{debug, warn};

use crate::error::{CredentialError, CredentialResult};
use crate::key::{DEFAULT_OWNER, secret_key};
use crate::secret::Secret;
use crate::store::SecretStore;

/// In-memory, session-scoped credential cache. Never persisted.
pub struct CredentialCache {
    store: Arc<dyn SecretStore>,
    owner: String,
    cached: RwLock<HashMap<Scope, Option<Secret>>>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("owner", &self.owner)
            .field("cached_scopes", &self.read_cache().len())
            .finish_non_exhaustive()
    }
}

impl CredentialCache {
    /// Cache over `store`, filing entries under [`DEFAULT_OWNER`].
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            owner: DEFAULT_OWNER.to_owned(),
            cached: RwLock::new(HashMap::new()),
        }
    }

    /// Use a different owner tag.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// The owner tag entries are filed under.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<Scope, Option<Secret>>> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<Scope, Option<Secret>>> {
        self.cached.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch(&self, key: &str) -> Option<Secret> {
        match self.store.get(&self.owner, key) {
            Ok(secret) => secret,
            Err(e) => {
                warn!(key = %key, error = %e, "couldn't read credential");
                None
            },
        }
    }

    fn write_secret(&self, key: &str, secret: &Secret) -> bool {
        match self.store.set(&self.owner, key, secret) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "couldn't store credential");
                false
            },
        }
    }

    /// Fetch the credential for `scope` from the secret store and cache it,
    /// replacing any cached value. Blocks on the store.
    ///
    /// Returns the fetched value.
    pub fn preload(&self, scope: &Scope) -> Option<Secret> {
        let secret = self.fetch(&secret_key(scope));
        debug!(scope = %scope, present = secret.is_some(), "credential preloaded");
        self.write_cache().insert(scope.canonical(), secret.clone());
        secret
    }

    /// The credential for the context's scope.
    ///
    /// With [`BlockingPolicy::MayBlock`](gerrit_config::BlockingPolicy::MayBlock)
    /// this preloads first and returns the fresh value. Otherwise only a
    /// cached value is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::PreloadRequired`] when the caller must not
    /// block and the scope was never preloaded.
    pub fn get(&self, ctx: &ScopeContext) -> CredentialResult<Option<Secret>> {
        if ctx.may_block() {
            return Ok(self.preload(ctx.scope()));
        }
        self.read_cache()
            .get(&ctx.scope().canonical())
            .cloned()
            .ok_or_else(|| CredentialError::PreloadRequired {
                scope: ctx.scope().to_string(),
            })
    }

    /// Whether `scope` has a cached entry (possibly "absent").
    #[must_use]
    pub fn is_cached(&self, scope: &Scope) -> bool {
        self.read_cache().contains_key(&scope.canonical())
    }

    /// Write `secret` for `scope` through to the secret store. Blocks.
    ///
    /// On success the cache holds the new value; on failure it is unchanged.
    pub fn set(&self, scope: &Scope, secret: &Secret) {
        if self.write_secret(&secret_key(scope), secret) {
            self.write_cache().insert(scope.canonical(), Some(secret.clone()));
        }
    }

    /// Delete the stored credential for `scope`. Blocks.
    ///
    /// On success the cache records the scope as having no secret.
    pub fn forget(&self, scope: &Scope) {
        let key = secret_key(scope);
        match self.store.delete(&self.owner, &key) {
            Ok(()) => {
                debug!(scope = %scope, "credential forgotten");
                self.write_cache().insert(scope.canonical(), None);
            },
            Err(e) => warn!(key = %key, error = %e, "couldn't forget credential"),
        }
    }

    /// The global credential, read straight from the store. Blocks.
    pub fn default_secret(&self) -> Option<Secret> {
        self.fetch(&secret_key(&Scope::Global))
    }

    /// Store the global credential. Blocks.
    pub fn set_default_secret(&self, secret: &Secret) {
        self.set(&Scope::Global, secret);
    }

    /// Copy the global credential to a newly materialized `scope`. Blocks.
    ///
    /// Nothing is written when there is no global credential or when
    /// `scope` is the global scope.
    pub fn seed_from_default(&self, scope: &Scope) {
        if scope.is_global() {
            return;
        }
        if let Some(secret) = self.default_secret() {
            debug!(scope = %scope, "seeding credential from global default");
            self.set(scope, &secret);
        }
    }

    /// Drop every cached value (end of session).
    pub fn clear(&self) {
        self.write_cache().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SecretStoreError, SecretStoreResult};
    use crate::store::MemorySecretStore;
    use gerrit_config::BlockingPolicy;

    struct BrokenStore;

    impl SecretStore for BrokenStore {
        fn get(&self, _owner: &str, _key: &str) -> SecretStoreResult<Option<Secret>> {
            Err(SecretStoreError::Unavailable("keychain locked".to_owned()))
        }

        fn set(&self, _owner: &str, _key: &str, _secret: &Secret) -> SecretStoreResult<()> {
            Err(SecretStoreError::Unavailable("keychain locked".to_owned()))
        }

        fn delete(&self, _owner: &str, _key: &str) -> SecretStoreResult<()> {
            Err(SecretStoreError::Unavailable("keychain locked".to_owned()))
        }
    }

    fn team() -> Scope {
        Scope::named("team-a")
    }

    fn background(scope: Scope) -> ScopeContext {
        ScopeContext::new(scope, BlockingPolicy::MustNotBlock)
    }

    fn coordinator(scope: Scope) -> ScopeContext {
        ScopeContext::new(scope, BlockingPolicy::MayBlock)
    }

    fn cache_with(store: &Arc<MemorySecretStore>) -> CredentialCache {
        CredentialCache::new(Arc::clone(store) as Arc<dyn SecretStore>)
    }

    #[test]
    fn test_background_get_without_preload_fails() {
        let cache = CredentialCache::new(MemorySecretStore::new().shared());
        let err = cache.get(&background(team())).unwrap_err();

        assert!(matches!(err, CredentialError::PreloadRequired { ref scope } if scope == "team-a"));
        assert!(err.to_string().contains("preload"));
    }

    #[test]
    fn test_background_get_after_preload() {
        let store = MemorySecretStore::new().shared();
        store
            .set(DEFAULT_OWNER, &secret_key(&team()), &Secret::new("pw"))
            .unwrap();
        let cache = cache_with(&store);

        assert_eq!(cache.preload(&team()), Some(Secret::new("pw")));
        assert_eq!(
            cache.get(&background(team())).unwrap(),
            Some(Secret::new("pw"))
        );
    }

    #[test]
    fn test_coordinator_get_preloads_implicitly() {
        let store = MemorySecretStore::new().shared();
        store
            .set(DEFAULT_OWNER, &secret_key(&team()), &Secret::new("pw"))
            .unwrap();
        let cache = cache_with(&store);

        assert!(!cache.is_cached(&team()));
        assert_eq!(
            cache.get(&coordinator(team())).unwrap(),
            Some(Secret::new("pw"))
        );
        assert!(cache.is_cached(&team()));
        assert_eq!(
            cache.get(&background(team())).unwrap(),
            Some(Secret::new("pw"))
        );
    }

    #[test]
    fn test_preload_of_missing_secret_caches_absence() {
        let cache = CredentialCache::new(MemorySecretStore::new().shared());
        assert!(cache.preload(&team()).is_none());
        assert_eq!(cache.get(&background(team())).unwrap(), None);
    }

    #[test]
    fn test_preload_refreshes() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);
        cache.preload(&team());

        store
            .set(DEFAULT_OWNER, &secret_key(&team()), &Secret::new("later"))
            .unwrap();
        assert_eq!(cache.get(&background(team())).unwrap(), None);

        cache.preload(&team());
        assert_eq!(
            cache.get(&background(team())).unwrap(),
            Some(Secret::new("later"))
        );
    }

    #[test]
    fn test_set_writes_through_and_caches() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);

        cache.set(&team(), &Secret::new("new"));
        assert_eq!(
            store.get(DEFAULT_OWNER, &secret_key(&team())).unwrap(),
            Some(Secret::new("new"))
        );
        assert_eq!(
            cache.get(&background(team())).unwrap(),
            Some(Secret::new("new"))
        );
    }

    #[test]
    fn test_forget_then_preload_is_absent() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);
        cache.set(&team(), &Secret::new("pw"));

        cache.forget(&team());
        assert!(cache.preload(&team()).is_none());
        assert_eq!(cache.get(&background(team())).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_scopes_are_isolated() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);
        cache.set(&team(), &Secret::new("a"));
        cache.set(&Scope::named("team-b"), &Secret::new("b"));

        assert_eq!(cache.preload(&team()), Some(Secret::new("a")));
        assert_eq!(cache.preload(&Scope::named("team-b")), Some(Secret::new("b")));
        assert!(cache.preload(&Scope::Global).is_none());
    }

    #[test]
    fn test_default_secret_independent_of_scope() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);
        cache.set(&team(), &Secret::new("team"));
        cache.set_default_secret(&Secret::new("global"));

        assert_eq!(cache.default_secret(), Some(Secret::new("global")));
        assert_eq!(
            cache.get(&background(Scope::Global)).unwrap(),
            Some(Secret::new("global"))
        );
    }

    #[test]
    fn test_reserved_scope_shares_global_entry() {
        let cache = CredentialCache::new(MemorySecretStore::new().shared());
        cache.set_default_secret(&Secret::new("global"));

        let reserved = Scope::Named("GerritSettings".to_owned());
        assert!(cache.is_cached(&reserved));
        assert_eq!(
            cache.get(&background(reserved.clone())).unwrap(),
            Some(Secret::new("global"))
        );

        cache.seed_from_default(&reserved);
        assert_eq!(cache.default_secret(), Some(Secret::new("global")));

        cache.forget(&reserved);
        assert!(cache.default_secret().is_none());
    }

    #[test]
    fn test_seed_from_default() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store);

        cache.seed_from_default(&team());
        assert!(store.is_empty());

        cache.set_default_secret(&Secret::new("global"));
        cache.seed_from_default(&team());
        assert_eq!(cache.preload(&team()), Some(Secret::new("global")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_backend_failures_read_as_absent() {
        let cache = CredentialCache::new(Arc::new(BrokenStore));

        assert!(cache.preload(&team()).is_none());
        assert_eq!(cache.get(&coordinator(team())).unwrap(), None);
        assert!(cache.default_secret().is_none());

        // Failed writes leave the cache alone.
        cache.clear();
        cache.set(&team(), &Secret::new("pw"));
        cache.forget(&team());
        assert!(!cache.is_cached(&team()));
    }

    #[test]
    fn test_owner_tag() {
        let store = MemorySecretStore::new().shared();
        let cache = cache_with(&store).with_owner("OtherPlugin");
        cache.set(&team(), &Secret::new("pw"));

        assert_eq!(cache.owner(), "OtherPlugin");
        assert!(store.get(DEFAULT_OWNER, &secret_key(&team())).unwrap().is_none());
        assert!(store.get("OtherPlugin", &secret_key(&team())).unwrap().is_some());
    }

    #[test]
    fn test_clear_requires_new_preload() {
        let cache = CredentialCache::new(MemorySecretStore::new().shared());
        cache.preload(&team());
        cache.clear();
        assert!(cache.get(&background(team())).is_err());
    }
}
