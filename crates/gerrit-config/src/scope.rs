//! Settings scopes and how the current one is determined.
//!
//! A [`Scope`] is either the global partition or a named workspace. Which
//! scope is "current" is answered by a [`ScopeResolver`]; the answer is
//! captured once per operation in a [`ScopeContext`] so a resolve followed by
//! a write always targets the same record.

use std::fmt;
use std::sync::RwLock;

use tracing::{debug, warn};

/// Name under which the global record is filed in the settings document.
///
/// A workspace carrying this name cannot be told apart from the global
/// record once persisted, so it is treated as the global scope.
pub const GLOBAL_TAG: &str = "GerritSettings";

/// A configuration partition.
///
/// Build named scopes with [`Scope::named`]. A `Named` value holding an empty
/// name or [`GLOBAL_TAG`] still behaves as the global scope everywhere a
/// scope is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// The global defaults, also used whenever no workspace is resolvable.
    Global,
    /// A specific workspace, identified by its name.
    Named(String),
}

impl Scope {
    /// Build a scope from a workspace name.
    ///
    /// The empty name is the "unresolved" sentinel and, like [`GLOBAL_TAG`],
    /// maps to [`Scope::Global`].
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if is_reserved(&name) {
            Self::Global
        } else {
            Self::Named(name)
        }
    }

    /// Whether this is the global scope.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.name().is_none()
    }

    /// The workspace name, `None` for the global scope.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) if !is_reserved(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// This scope with reserved names folded onto [`Scope::Global`].
    #[must_use]
    pub fn canonical(&self) -> Self {
        self.name().map_or(Self::Global, |name| Self::Named(name.to_owned()))
    }
}

fn is_reserved(name: &str) -> bool {
    name.is_empty() || name == GLOBAL_TAG
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            None => write!(f, "<global>"),
            Some(name) => write!(f, "{name}"),
        }
    }
}

/// Answers "which scope is current right now?".
///
/// Implementations must be cheap and must not block; they are queried on
/// every settings access.
pub trait ScopeResolver: Send + Sync {
    /// The current scope, or [`Scope::Global`] when none can be determined.
    fn current_scope(&self) -> Scope;
}

/// Resolver that never resolves a workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOnly;

impl ScopeResolver for GlobalOnly {
    fn current_scope(&self) -> Scope {
        Scope::Global
    }
}

/// Resolver pinned to a single scope (e.g. a CLI invoked inside one workspace).
#[derive(Debug, Clone)]
pub struct FixedScope(Scope);

impl FixedScope {
    /// Pin the resolver to `scope`.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self(scope)
    }
}

impl ScopeResolver for FixedScope {
    fn current_scope(&self) -> Scope {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    open: Vec<String>,
    focused: Option<String>,
}

/// Tracks open and focused workspaces the way a multi-window host reports them.
///
/// Resolution order:
/// 1. exactly one open workspace: that workspace;
/// 2. otherwise the focused workspace, if any;
/// 3. otherwise [`Scope::Global`].
#[derive(Debug, Default)]
pub struct WorkspaceTracker {
    state: RwLock<TrackerState>,
}

impl WorkspaceTracker {
    /// Create a tracker with no open workspaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a workspace was opened. Opening twice is a no-op.
    pub fn open_workspace(&self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        if let Ok(mut state) = self.state.write()
            && !state.open.contains(&name)
        {
            debug!(workspace = %name, "workspace opened");
            state.open.push(name);
        }
    }

    /// Record that a workspace was closed, dropping focus if it had it.
    pub fn close_workspace(&self, name: &str) {
        if let Ok(mut state) = self.state.write() {
            state.open.retain(|open| open != name);
            if state.focused.as_deref() == Some(name) {
                state.focused = None;
            }
            debug!(workspace = %name, "workspace closed");
        }
    }

    /// Move focus to `name`, or clear it with `None`.
    pub fn focus(&self, name: Option<&str>) {
        if let Ok(mut state) = self.state.write() {
            state.focused = name.filter(|n| !n.is_empty()).map(str::to_owned);
        }
    }
}

impl ScopeResolver for WorkspaceTracker {
    fn current_scope(&self) -> Scope {
        let Ok(state) = self.state.read() else {
            warn!("workspace tracker lock poisoned; falling back to global scope");
            return Scope::Global;
        };
        if let [only] = state.open.as_slice() {
            return Scope::named(only.clone());
        }
        state
            .focused
            .as_ref()
            .map_or(Scope::Global, |name| Scope::named(name.clone()))
    }
}

/// Whether the calling thread may perform blocking secret-store I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingPolicy {
    /// Coordinating thread (or any thread allowed to wait on I/O).
    MayBlock,
    /// Latency-sensitive thread; only already-cached values may be served.
    MustNotBlock,
}

/// The scope and thread capability an operation runs under.
///
/// Captured once per operation and passed explicitly, instead of each step
/// re-querying ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    scope: Scope,
    blocking: BlockingPolicy,
}

impl ScopeContext {
    /// Build a context for an explicit scope.
    #[must_use]
    pub fn new(scope: Scope, blocking: BlockingPolicy) -> Self {
        Self { scope, blocking }
    }

    /// Build a context by asking `resolver` for the current scope.
    #[must_use]
    pub fn resolve(resolver: &dyn ScopeResolver, blocking: BlockingPolicy) -> Self {
        Self::new(resolver.current_scope(), blocking)
    }

    /// The scope this operation targets.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The caller's blocking capability.
    #[must_use]
    pub fn blocking(&self) -> BlockingPolicy {
        self.blocking
    }

    /// Shorthand for `blocking() == BlockingPolicy::MayBlock`.
    #[must_use]
    pub fn may_block(&self) -> bool {
        self.blocking == BlockingPolicy::MayBlock
    }
}
