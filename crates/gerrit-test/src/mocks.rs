//! Mock collaborators for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use gerrit_config::{Scope, ScopeResolver};
use gerrit_credentials::{
    MemorySecretStore, Secret, SecretStore, SecretStoreError, SecretStoreResult,
};

/// One call observed by [`MockSecretStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretCall {
    /// `get(owner, key)`
    Get(String, String),
    /// `set(owner, key, _)`; the value is not recorded.
    Set(String, String),
    /// `delete(owner, key)`
    Delete(String, String),
}

impl SecretCall {
    /// The key the call addressed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(_, key) | Self::Set(_, key) | Self::Delete(_, key) => key,
        }
    }
}

/// In-memory [`SecretStore`] that records every call and can be switched
/// into a failing mode.
#[derive(Debug, Default)]
pub struct MockSecretStore {
    inner: MemorySecretStore,
    calls: Mutex<Vec<SecretCall>>,
    failing: AtomicBool,
}

impl MockSecretStore {
    /// Create an empty, healthy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again with `false`).
    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All calls so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<SecretCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of `get` calls so far.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SecretCall::Get(..)))
            .count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&self) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.clear();
        }
    }

    /// Read an entry directly, bypassing recording and failure injection.
    #[must_use]
    pub fn peek(&self, owner: &str, key: &str) -> Option<Secret> {
        self.inner.get(owner, key).ok().flatten()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn record(&self, call: SecretCall) -> SecretStoreResult<()> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(call);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SecretStoreError::Unavailable("mock secret store failure".to_owned()));
        }
        Ok(())
    }
}

impl SecretStore for MockSecretStore {
    fn get(&self, owner: &str, key: &str) -> SecretStoreResult<Option<Secret>> {
        self.record(SecretCall::Get(owner.to_owned(), key.to_owned()))?;
        self.inner.get(owner, key)
    }

    fn set(&self, owner: &str, key: &str, secret: &Secret) -> SecretStoreResult<()> {
        self.record(SecretCall::Set(owner.to_owned(), key.to_owned()))?;
        self.inner.set(owner, key, secret)
    }

    fn delete(&self, owner: &str, key: &str) -> SecretStoreResult<()> {
        self.record(SecretCall::Delete(owner.to_owned(), key.to_owned()))?;
        self.inner.delete(owner, key)
    }
}

/// [`ScopeResolver`] whose answer tests can change between calls.
#[derive(Debug)]
pub struct SwitchableScope {
    current: RwLock<Scope>,
}

impl SwitchableScope {
    /// Start at `scope`.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self {
            current: RwLock::new(scope),
        }
    }

    /// Start unresolved.
    #[must_use]
    pub fn global() -> Self {
        Self::new(Scope::Global)
    }

    /// Start at the workspace `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::new(Scope::named(name))
    }

    /// Change the current scope.
    pub fn switch_to(&self, scope: Scope) {
        if let Ok(mut guard) = self.current.write() {
            *guard = scope;
        }
    }

    /// The current scope.
    #[must_use]
    pub fn current(&self) -> Scope {
        self.current_scope()
    }
}

impl ScopeResolver for SwitchableScope {
    fn current_scope(&self) -> Scope {
        self.current
            .read()
            .map(|scope| scope.clone())
            .unwrap_or(Scope::Global)
    }
}
