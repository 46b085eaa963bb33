//! Error types for the Sense runtime.
//!
//! Reconciliation itself never fails: mismatched keys and types are resolved
//! by the diff policy. What can fail is the *use* of the runtime, mostly hook
//! calls that break the positional contract, and configuration parsing.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of a hook record, used in hook-order diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// A `use_state` record.
    State,
    /// A `use_effect` record.
    Effect,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::State => f.write_str("STATE"),
            HookKind::Effect => f.write_str("EFFECT"),
        }
    }
}

/// Errors surfaced by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A hook was called while no render-function fiber was being rendered.
    #[error("InvalidHookContext: `{hook}` must be called inside a component render function")]
    InvalidHookContext {
        /// Name of the hook that was called.
        hook: &'static str,
    },

    /// The hook at `index` changed kind between two renders of one component.
    #[error(
        "hook #{index} of component `{component}` was {expected} on the previous render but is {found} now; \
         hooks must be called unconditionally and in the same order on every render"
    )]
    HookKindMismatch {
        /// Component whose hook order changed.
        component: String,
        /// Positional index of the offending hook.
        index: usize,
        /// Kind recorded on the previous render.
        expected: HookKind,
        /// Kind requested on this render.
        found: HookKind,
    },

    /// A state hook was read back with a different value type than it was created with.
    #[error("state hook #{index} of component `{component}` changed its value type between renders")]
    HookStateType {
        /// Component whose hook order changed.
        component: String,
        /// Positional index of the offending hook.
        index: usize,
    },

    /// A component called a different number of hooks than on its previous render.
    #[error("component `{component}` called {current} hooks but called {previous} on the previous render")]
    HookCountChanged {
        /// Component whose hook count changed.
        component: String,
        /// Hook count on the previous render.
        previous: usize,
        /// Hook count on this render.
        current: usize,
    },

    /// The runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}
