//! Hooks
//!
//! Hooks give component instances state and lifecycle effects that survive
//! re-renders, even though the component function itself is called afresh
//! every time.
//!
//! # Positional identity
//!
//! A hook is identified by the order in which it is called during one
//! render of one component instance. The Nth hook call on render K reads
//! the record the Nth hook call left on render K-1 (the fiber's alternate).
//! Render functions must therefore call hooks unconditionally and in the
//! same order on every render. With [`RuntimeConfig::validate_hooks`]
//! enabled, a change in a hook's kind or in the number of hooks fails the
//! turn with an error instead of silently mixing up state.
//!
//! # Active fiber
//!
//! While a component renders, the reconciler pushes a frame describing the
//! fiber onto a thread-local stack. The hook functions find their fiber
//! through that frame; calling one with no frame pushed is an
//! [`InvalidHookContext`](crate::Error::InvalidHookContext) error.
//!
//! # Example
//!
//! ```rust,ignore
//! fn counter(_: &Props) -> Element {
//!     let (count, set_count) = use_state(0);
//!
//!     use_effect(Some(deps![count]), move || {
//!         tracing::info!(count, "count changed");
//!         None
//!     });
//!
//!     h("button")
//!         .listener("onClick", move |_| set_count.update(|n| n + 1))
//!         .child(count)
//!         .build()
//! }
//! ```
//!
//! [`RuntimeConfig::validate_hooks`]: crate::RuntimeConfig::validate_hooks

mod context;
mod effect;
mod state;

pub use context::is_rendering;
pub use effect::{try_use_effect, use_effect, Cleanup, Deps};
pub use state::{try_use_state, use_state, SetState};

pub(crate) use context::{HookFrame, HookScope};
pub(crate) use effect::{run_cleanup, EffectHook};

use std::any::Any;
use std::sync::Arc;

use crate::error::HookKind;

/// One hook record stored on a component fiber.
#[derive(Debug)]
pub(crate) enum Hook {
    /// A `use_state` record: the type-erased `StateCell<T>`.
    State(Arc<dyn Any + Send + Sync>),
    /// A `use_effect` record.
    Effect(EffectHook),
}

impl Hook {
    pub(crate) fn kind(&self) -> HookKind {
        match self {
            Hook::State(_) => HookKind::State,
            Hook::Effect(_) => HookKind::Effect,
        }
    }

    /// The part of this record the next render of the same position reads.
    pub(crate) fn snapshot(&self) -> HookSnapshot {
        match self {
            Hook::State(cell) => HookSnapshot::State(Arc::clone(cell)),
            Hook::Effect(effect) => HookSnapshot::Effect {
                deps: effect.deps().cloned(),
                cleanup: effect.cleanup_slot(),
            },
        }
    }
}

/// Read-only view of a previous-generation hook record.
pub(crate) enum HookSnapshot {
    State(Arc<dyn Any + Send + Sync>),
    Effect {
        deps: Option<Deps>,
        cleanup: effect::CleanupSlot,
    },
}

impl HookSnapshot {
    fn kind(&self) -> HookKind {
        match self {
            HookSnapshot::State(_) => HookKind::State,
            HookSnapshot::Effect { .. } => HookKind::Effect,
        }
    }
}
