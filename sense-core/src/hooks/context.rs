//! Hook Context
//!
//! The hook context records which component fiber is rendering, so hook
//! calls can find the records they belong to without an explicit handle.
//!
//! # Implementation
//!
//! A thread-local stack of [`HookFrame`]s. The reconciler pushes a frame
//! before invoking a render function and pops it right after through the
//! [`HookScope`] guard, which also pops on unwind if the render panics.
//! The stack holds no runtime state beyond the duration of one render
//! call, so independent runtimes never observe each other's frames.

use std::cell::RefCell;
use std::sync::Arc;

use super::{Hook, HookSnapshot};
use crate::error::{Error, HookKind, Result};
use crate::scheduler::UpdateSignal;

thread_local! {
    static FRAMES: RefCell<Vec<HookFrame>> = const { RefCell::new(Vec::new()) };
}

/// Bookkeeping for the component fiber currently being rendered.
pub(crate) struct HookFrame {
    /// Component name, for diagnostics.
    component: Arc<str>,

    /// Records of the alternate, `None` when the fiber is new.
    previous: Option<Vec<HookSnapshot>>,

    /// Records built by this render, in call order.
    hooks: Vec<Hook>,

    /// Where state updaters request a new pass.
    updates: Arc<UpdateSignal>,

    validate: bool,

    /// First hook-order violation seen in this render.
    violation: Option<Error>,
}

impl HookFrame {
    pub(crate) fn new(
        component: Arc<str>,
        previous: Option<Vec<HookSnapshot>>,
        updates: Arc<UpdateSignal>,
        validate: bool,
    ) -> Self {
        Self {
            component,
            previous,
            hooks: Vec::new(),
            updates,
            validate,
            violation: None,
        }
    }

    /// Index the next hook call will occupy.
    pub(crate) fn cursor(&self) -> usize {
        self.hooks.len()
    }

    /// The previous-generation record at `index`, if its kind matches.
    ///
    /// A record of another kind is reported as a violation and treated as
    /// absent, so the hook starts over from its initial value.
    pub(crate) fn previous(&mut self, index: usize, requested: HookKind) -> Option<&HookSnapshot> {
        let recorded = self.previous.as_ref()?.get(index)?.kind();
        if recorded != requested {
            let error = Error::HookKindMismatch {
                component: self.component.to_string(),
                index,
                expected: recorded,
                found: requested,
            };
            self.report(error);
            return None;
        }
        self.previous.as_ref()?.get(index)
    }

    pub(crate) fn push(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    pub(crate) fn updates(&self) -> &Arc<UpdateSignal> {
        &self.updates
    }

    pub(crate) fn component(&self) -> &str {
        &self.component
    }

    /// Record a hook-order violation.
    pub(crate) fn report(&mut self, error: Error) {
        if self.validate {
            if self.violation.is_none() {
                self.violation = Some(error);
            }
        } else {
            tracing::warn!(component = %self.component, %error, "hook order violation");
        }
    }

    fn finish(mut self) -> Result<Vec<Hook>> {
        if let Some(previous) = &self.previous {
            if previous.len() != self.hooks.len() {
                let error = Error::HookCountChanged {
                    component: self.component.to_string(),
                    previous: previous.len(),
                    current: self.hooks.len(),
                };
                self.report(error);
            }
        }
        match self.violation {
            Some(error) => Err(error),
            None => Ok(self.hooks),
        }
    }
}

/// Guard that keeps a frame active for the duration of one render call.
pub(crate) struct HookScope {
    depth: usize,
    finished: bool,
}

impl HookScope {
    /// Make `frame` the active frame.
    pub(crate) fn enter(frame: HookFrame) -> Self {
        let depth = FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            frames.push(frame);
            frames.len()
        });
        Self {
            depth,
            finished: false,
        }
    }

    /// Pop the frame and return the hook records the render produced.
    pub(crate) fn finish(mut self) -> Result<Vec<Hook>> {
        self.finished = true;
        let frame = FRAMES.with(|frames| frames.borrow_mut().pop());
        match frame {
            Some(frame) => frame.finish(),
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for HookScope {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            debug_assert_eq!(
                frames.len(),
                self.depth,
                "HookScope mismatch: expected depth {}, got {}",
                self.depth,
                frames.len()
            );
            frames.pop();
        });
    }
}

/// Run `f` against the active frame.
pub(crate) fn with_frame<R>(hook: &'static str, f: impl FnOnce(&mut HookFrame) -> R) -> Result<R> {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let frame = frames
            .last_mut()
            .ok_or(Error::InvalidHookContext { hook })?;
        Ok(f(frame))
    })
}

/// Whether a component render function is executing on this thread.
pub fn is_rendering() -> bool {
    FRAMES.with(|frames| !frames.borrow().is_empty())
}
