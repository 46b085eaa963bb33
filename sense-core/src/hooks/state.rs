//! State Hook
//!
//! `use_state` keeps one value per hook position per component instance.
//!
//! # How Updates Work
//!
//! The setter does not write the value. It appends an action to the
//! hook's queue and asks the runtime for a new pass. On the next render,
//! `use_state` starts from the previous generation's value and applies
//! every queued action in order.
//!
//! The queue lives on the committed generation's record and folding does
//! not drain it, so a pass that is superseded before it commits loses
//! nothing: the pass that replaces it folds the same actions again.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::context::with_frame;
use super::{Hook, HookSnapshot};
use crate::error::{Error, HookKind, Result};
use crate::scheduler::UpdateSignal;

type Updater<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;

/// A queued state change.
enum Action<T> {
    Replace(T),
    Update(Updater<T>),
}

/// The shared record behind one state hook generation.
pub(crate) struct StateCell<T> {
    value: T,
    queue: Mutex<Vec<Action<T>>>,
}

impl<T: Clone> StateCell<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// The base value with every queued action applied.
    fn fold(&self) -> T {
        let queue = self.queue.lock();
        queue.iter().fold(self.value.clone(), |value, action| match action {
            Action::Replace(next) => next.clone(),
            Action::Update(f) => f(&value),
        })
    }

    fn enqueue(&self, action: Action<T>) {
        self.queue.lock().push(action);
    }
}

/// Setter returned by [`use_state`].
///
/// Setters are cheap to clone and may be called from any thread, e.g.
/// from event handlers or effects. A setter is bound to the render that
/// created it: once that render's generation has been released (the
/// component unmounted, or a later render committed) its actions are
/// dropped, though it still requests a pass.
pub struct SetState<T> {
    cell: Weak<StateCell<T>>,
    updates: Arc<UpdateSignal>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
            updates: Arc::clone(&self.updates),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SetState<T> {
    /// Replace the state with `value` on the next render.
    pub fn set(&self, value: T) {
        self.dispatch(Action::Replace(value));
    }

    /// Compute the next state from the previous one on the next render.
    pub fn update(&self, f: impl Fn(&T) -> T + Send + Sync + 'static) {
        self.dispatch(Action::Update(Arc::new(f)));
    }

    fn dispatch(&self, action: Action<T>) {
        match self.cell.upgrade() {
            Some(cell) => cell.enqueue(action),
            None => tracing::debug!("state update for an unmounted component dropped"),
        }
        self.updates.request();
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("mounted", &(self.cell.strong_count() > 0))
            .finish()
    }
}

/// Declare a piece of state for the rendering component.
///
/// Returns the current value and a setter. On the first render the value
/// is `initial`; afterwards `initial` is ignored and the previous value
/// with all queued actions applied is returned.
///
/// Fails with [`Error::InvalidHookContext`] outside a render function.
pub fn try_use_state<T>(initial: T) -> Result<(T, SetState<T>)>
where
    T: Clone + Send + Sync + 'static,
{
    with_frame("use_state", |frame| {
        let index = frame.cursor();
        let carried = match frame.previous(index, HookKind::State) {
            Some(HookSnapshot::State(cell)) => Some(Arc::clone(cell)),
            _ => None,
        };

        let previous = match carried.map(|cell| cell.downcast::<StateCell<T>>()) {
            Some(Ok(cell)) => Some(cell),
            Some(Err(_)) => {
                let error = Error::HookStateType {
                    component: frame.component().to_string(),
                    index,
                };
                frame.report(error);
                None
            }
            None => None,
        };

        let value = match &previous {
            Some(cell) => cell.fold(),
            None => initial,
        };

        let cell = Arc::new(StateCell::new(value.clone()));
        let setter = SetState {
            cell: Arc::downgrade(&cell),
            updates: Arc::clone(frame.updates()),
        };
        frame.push(Hook::State(cell as Arc<dyn Any + Send + Sync>));
        (value, setter)
    })
}

/// Like [`try_use_state`] but panics outside a render function.
pub fn use_state<T>(initial: T) -> (T, SetState<T>)
where
    T: Clone + Send + Sync + 'static,
{
    try_use_state(initial).unwrap_or_else(|err| panic!("{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookFrame, HookScope};

    fn render<R>(
        previous: Option<Vec<HookSnapshot>>,
        f: impl FnOnce() -> R,
    ) -> (R, Result<Vec<Hook>>) {
        let frame = HookFrame::new("Test".into(), previous, Arc::new(UpdateSignal::new()), true);
        let scope = HookScope::enter(frame);
        let out = f();
        (out, scope.finish())
    }

    fn snapshots(hooks: &[Hook]) -> Vec<HookSnapshot> {
        hooks.iter().map(Hook::snapshot).collect()
    }

    #[test]
    fn queued_actions_fold_in_order() {
        let cell = StateCell::new(0);
        cell.enqueue(Action::Replace(5));
        cell.enqueue(Action::Update(Arc::new(|n| n + 1)));
        cell.enqueue(Action::Replace(10));

        // Should apply 5, then 6, then 10
        assert_eq!(cell.fold(), 10);
    }

    #[test]
    fn first_render_uses_the_initial_value() {
        let ((value, _), hooks) = render(None, || use_state(3));
        assert_eq!(value, 3);
        assert_eq!(hooks.unwrap().len(), 1);
    }

    #[test]
    fn setter_reaches_the_next_render() {
        let ((_, set), hooks) = render(None, || use_state(0));
        let hooks = hooks.unwrap();

        set.update(|n| n + 1);
        set.update(|n| n * 10);
        assert!(set.updates.is_pending());

        let ((value, _), _) = render(Some(snapshots(&hooks)), || use_state(0));
        assert_eq!(value, 10);
    }

    #[test]
    fn changed_value_type_is_reported() {
        let ((_, _), hooks) = render(None, || use_state(0i32));
        let hooks = hooks.unwrap();

        let (_, result) = render(Some(snapshots(&hooks)), || use_state(String::new()));
        assert!(matches!(result, Err(Error::HookStateType { index: 0, .. })));
    }

    #[test]
    fn setter_of_dropped_state_still_requests() {
        let ((_, set), hooks) = render(None, || use_state(0));
        drop(hooks);

        set.set(4);
        assert!(set.updates.is_pending());
    }

    #[test]
    fn outside_render_is_an_error() {
        let err = try_use_state(0).unwrap_err();
        assert!(matches!(err, Error::InvalidHookContext { hook: "use_state" }));
    }
}
