//! Effect Hook
//!
//! `use_effect` schedules a side effect to run after the commit that
//! follows the render, optionally guarded by a dependency list.
//!
//! # Dependency Semantics
//!
//! - `None`: the effect runs after every commit.
//! - `Some(deps![])`: the effect runs once, after the first commit.
//! - `Some(deps![a, b])`: the effect runs when any dependency differs from
//!   the previous render's value (SameValue comparison) or the length of
//!   the list changed.
//!
//! The cleanup an effect returns lives in a slot shared by every
//! generation of the hook. It runs right before the effect runs again and
//! when the component is removed from the tree.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::context::with_frame;
use super::{Hook, HookSnapshot};
use crate::element::PropValue;
use crate::error::{HookKind, Result};

/// Dependency list of an effect.
pub type Deps = SmallVec<[PropValue; 4]>;

/// Build a [`Deps`] list from values convertible to [`PropValue`].
#[macro_export]
macro_rules! deps {
    ($($dep:expr),* $(,)?) => {
        <$crate::Deps as ::std::iter::FromIterator<$crate::PropValue>>::from_iter(
            [$($crate::PropValue::from($dep)),*]
        )
    };
}

/// The teardown half of an effect.
pub struct Cleanup(Box<dyn FnOnce() + Send>);

impl Cleanup {
    /// Wrap a teardown function.
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup")
    }
}

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup> + Send>;
pub(crate) type CleanupSlot = Arc<Mutex<Option<Cleanup>>>;

/// The record of one effect hook generation.
pub(crate) struct EffectHook {
    deps: Option<Deps>,
    cleanup: CleanupSlot,
    /// The callback, present only when this render marked the effect active.
    pending: Option<EffectFn>,
}

impl fmt::Debug for EffectHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHook")
            .field("deps", &self.deps)
            .field("cleanup", &self.cleanup)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl EffectHook {
    pub(crate) fn deps(&self) -> Option<&Deps> {
        self.deps.as_ref()
    }

    pub(crate) fn cleanup_slot(&self) -> CleanupSlot {
        Arc::clone(&self.cleanup)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the callback of an active effect for the commit to run.
    pub(crate) fn take_pending(&mut self) -> Option<(EffectFn, CleanupSlot)> {
        let callback = self.pending.take()?;
        Some((callback, self.cleanup_slot()))
    }
}

/// Run and clear whatever cleanup `slot` holds. Returns whether one ran.
pub(crate) fn run_cleanup(slot: &CleanupSlot) -> bool {
    let cleanup = slot.lock().take();
    match cleanup {
        Some(cleanup) => {
            cleanup.run();
            true
        }
        None => false,
    }
}

/// Whether an effect must run given the previous render's dependencies.
///
/// `previous` is `None` when there is no previous record at all.
fn has_changed(previous: Option<&Option<Deps>>, next: Option<&Deps>) -> bool {
    match (previous, next) {
        (Some(Some(old)), Some(new)) => {
            old.len() != new.len() || old.iter().zip(new.iter()).any(|(a, b)| !a.same_value(b))
        }
        _ => true,
    }
}

/// Schedule `effect` to run after the next commit if `deps` changed.
///
/// The effect may return a [`Cleanup`], which runs before the effect runs
/// again and when the component unmounts.
///
/// Fails with [`InvalidHookContext`](crate::Error::InvalidHookContext)
/// outside a render function.
pub fn try_use_effect<F>(deps: Option<Deps>, effect: F) -> Result<()>
where
    F: FnOnce() -> Option<Cleanup> + Send + 'static,
{
    with_frame("use_effect", |frame| {
        let index = frame.cursor();
        let (previous_deps, cleanup) = match frame.previous(index, HookKind::Effect) {
            Some(HookSnapshot::Effect { deps, cleanup }) => (Some(deps.clone()), Arc::clone(cleanup)),
            _ => (None, CleanupSlot::default()),
        };

        let changed = has_changed(previous_deps.as_ref(), deps.as_ref());
        let pending = changed.then(|| Box::new(effect) as EffectFn);
        frame.push(Hook::Effect(EffectHook {
            deps,
            cleanup,
            pending,
        }));
    })
}

/// Like [`try_use_effect`] but panics outside a render function.
pub fn use_effect<F>(deps: Option<Deps>, effect: F)
where
    F: FnOnce() -> Option<Cleanup> + Send + 'static,
{
    try_use_effect(deps, effect).unwrap_or_else(|err| panic!("{err}"))
}
