//! Scheduling Primitives
//!
//! The work loop never decides on its own when to stop: it asks a
//! [`Deadline`] after every unit of work. This keeps the reconciler
//! independent of any particular event loop.
//!
//! - [`IdleDeadline`] mirrors a host idle callback: a turn owns a slice of
//!   wall-clock time and yields once less than a threshold remains.
//! - [`WorkBudget`] yields after a fixed number of units. It is fully
//!   deterministic and is what tests use to force a pass across many turns.
//! - [`Unbounded`] never yields.
//!
//! [`UpdateSignal`] travels the other way: state setters use it to tell the
//! runtime that a new pass is wanted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

/// A yield point consulted by the work loop between units of work.
pub trait Deadline {
    /// Whether the current turn should stop and hand control back.
    fn should_yield(&mut self) -> bool;
}

impl<D: Deadline + ?Sized> Deadline for &mut D {
    fn should_yield(&mut self) -> bool {
        (**self).should_yield()
    }
}

/// A wall-clock slice of one idle period.
#[derive(Debug, Clone, Copy)]
pub struct IdleDeadline {
    end: Instant,
    threshold: Duration,
}

impl IdleDeadline {
    /// A deadline `budget` from now that yields once less than
    /// `threshold` remains.
    pub fn new(budget: Duration, threshold: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
            threshold,
        }
    }

    /// Time left in this slice.
    pub fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

impl Deadline for IdleDeadline {
    fn should_yield(&mut self) -> bool {
        self.time_remaining() < self.threshold
    }
}

/// Yields after a fixed number of units of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkBudget(pub usize);

impl Deadline for WorkBudget {
    fn should_yield(&mut self) -> bool {
        self.0 = self.0.saturating_sub(1);
        self.0 == 0
    }
}

/// Never yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn should_yield(&mut self) -> bool {
        false
    }
}

/// "A new pass is requested" flag shared by state setters and a runtime.
#[derive(Debug, Default)]
pub struct UpdateSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl UpdateSignal {
    /// Create a signal with no request pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a new pass and wake a waiting host loop.
    pub fn request(&self) {
        self.pending.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Whether a request is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Consume the pending request, if any.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    /// Wait until [`request`](Self::request) is called.
    ///
    /// Returns immediately if a request arrived since the last wait.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_budget_counts_units() {
        let mut budget = WorkBudget(3);
        assert!(!budget.should_yield());
        assert!(!budget.should_yield());
        assert!(budget.should_yield());
        // Should keep yielding once spent
        assert!(budget.should_yield());
    }

    #[test]
    fn zero_budget_yields_immediately() {
        assert!(WorkBudget(0).should_yield());
    }

    #[test]
    fn idle_deadline_expires() {
        let mut deadline = IdleDeadline::new(Duration::ZERO, Duration::from_millis(1));
        assert!(deadline.should_yield());

        let mut deadline = IdleDeadline::new(Duration::from_secs(60), Duration::from_millis(1));
        assert!(!deadline.should_yield());
        assert!(deadline.time_remaining() > Duration::from_secs(1));
    }

    #[test]
    fn unbounded_never_yields() {
        let mut deadline = Unbounded;
        assert!((0..1000).all(|_| !deadline.should_yield()));
    }

    #[test]
    fn update_signal_is_consumed_once() {
        let signal = UpdateSignal::new();
        assert!(!signal.take());

        signal.request();
        signal.request();
        assert!(signal.is_pending());
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[tokio::test]
    async fn request_wakes_a_waiter() {
        let signal = std::sync::Arc::new(UpdateSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.notified().await })
        };

        signal.request();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter woke")
            .expect("task joined");
    }
}
