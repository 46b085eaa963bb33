//! Runtime
//!
//! The runtime owns everything a render pass touches: the output host, the
//! fiber arena, the committed root, the work-in-progress root, the frontier
//! of the current pass and the pass-wide deletion list. Independent
//! runtimes share nothing, so several can live side by side.
//!
//! # How It Works
//!
//! 1. [`Runtime::render`] creates a work-in-progress root whose alternate is
//!    the committed root and makes it the frontier. Nothing else happens
//!    until the runtime is given turns.
//!
//! 2. Each call to [`Runtime::work_loop`] is one turn: it processes fibers
//!    until the frontier is exhausted or the [`Deadline`] asks it to
//!    yield. At least one fiber is processed per turn.
//!
//! 3. When the frontier is exhausted the pass is committed in the same
//!    turn, the work-in-progress tree becomes current and the previous
//!    generation is released.
//!
//! 4. A state setter raises the shared [`UpdateSignal`]. The loop checks it
//!    at the start of every turn and between fibers; a raised signal
//!    replaces the work-in-progress tree with a fresh pass from the
//!    committed root. Partial work is discarded without running any
//!    cleanup.
//!
//! # Driving the Loop
//!
//! - [`Runtime::flush`] runs unbounded turns until idle, which is what
//!   tests and synchronous embedders want.
//! - [`Runtime::run_until_idle`] runs turns with caller-made deadlines and
//!   reports how many it took.
//! - [`Runtime::run`] is the permanent async host loop: frame-sized turns,
//!   a yield to tokio between turns, and a wait on the update signal when
//!   idle.

use std::convert::Infallible;
use std::sync::Arc;

use crate::commit::{commit_root, CommitSummary};
use crate::config::RuntimeConfig;
use crate::element::{Element, Props};
use crate::error::Result;
use crate::fiber::{Fiber, FiberArena, FiberId};
use crate::host::Host;
use crate::reconciler::{perform_unit_of_work, WorkContext};
use crate::scheduler::{Deadline, IdleDeadline, Unbounded, UpdateSignal};

/// Outcome of one turn of the work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// There was no work to do.
    Idle,
    /// The deadline expired with work remaining.
    Yielded,
    /// The pass finished and was committed.
    Committed(CommitSummary),
}

/// A reconciliation runtime bound to one output host.
pub struct Runtime<H: Host> {
    host: H,
    config: RuntimeConfig,
    fibers: FiberArena<H::Node>,

    /// Root of the tree the document currently shows.
    current_root: Option<FiberId>,

    /// Root of the pass in progress.
    wip_root: Option<FiberId>,

    /// The frontier: next fiber to process.
    next_unit: Option<FiberId>,

    /// Old fibers to tear down at the next commit.
    deletions: Vec<FiberId>,

    updates: Arc<UpdateSignal>,
    last_commit: Option<CommitSummary>,
    commit_count: u64,
}

impl<H: Host> Runtime<H> {
    /// Create a runtime with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, RuntimeConfig::default())
    }

    /// Create a runtime with an explicit configuration.
    pub fn with_config(host: H, config: RuntimeConfig) -> Self {
        Self {
            host,
            config,
            fibers: FiberArena::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            updates: Arc::new(UpdateSignal::new()),
            last_commit: None,
            commit_count: 0,
        }
    }

    /// Begin a top-level pass rendering `element` into `anchor`.
    ///
    /// Does no work by itself; the pass runs on subsequent turns. A state
    /// update requested earlier is absorbed by this pass: its actions stay
    /// queued on the committed hooks and are folded when the components
    /// render again.
    pub fn render(&mut self, element: Element, anchor: H::Node) {
        self.updates.take();
        let mut props = Props::new();
        props.set_children(vec![element]);
        self.start_pass(anchor, props);
        tracing::debug!(root = ?self.wip_root, "render requested");
    }

    /// Run one turn of the work loop.
    pub fn work_loop<D: Deadline + ?Sized>(&mut self, deadline: &mut D) -> Result<Turn> {
        if self.updates.take() {
            self.restart();
        }
        if self.wip_root.is_none() {
            return Ok(Turn::Idle);
        }

        while let (Some(root), Some(unit)) = (self.wip_root, self.next_unit) {
            let mut cx = WorkContext {
                host: &mut self.host,
                fibers: &mut self.fibers,
                deletions: &mut self.deletions,
                updates: &self.updates,
                config: &self.config,
            };
            match perform_unit_of_work(&mut cx, unit, root) {
                Ok(next) => self.next_unit = next,
                Err(error) => {
                    self.abandon_pass();
                    return Err(error);
                }
            }

            if self.updates.take() {
                self.restart();
            }
            if deadline.should_yield() {
                break;
            }
        }

        match (self.wip_root, self.next_unit) {
            (Some(root), None) => Ok(Turn::Committed(self.commit(root))),
            _ => Ok(Turn::Yielded),
        }
    }

    /// Run unbounded turns until there is no work left.
    ///
    /// Returns the summary of the last commit made, if any.
    pub fn flush(&mut self) -> Result<Option<CommitSummary>> {
        let mut last = None;
        loop {
            match self.work_loop(&mut Unbounded)? {
                Turn::Idle => return Ok(last),
                Turn::Committed(summary) => last = Some(summary),
                Turn::Yielded => {}
            }
        }
    }

    /// Run turns, each with a fresh deadline from `deadline`, until there
    /// is no work left. Returns the number of turns that did work.
    pub fn run_until_idle<D, F>(&mut self, mut deadline: F) -> Result<usize>
    where
        D: Deadline,
        F: FnMut() -> D,
    {
        let mut turns = 0;
        while self.work_loop(&mut deadline())? != Turn::Idle {
            turns += 1;
        }
        Ok(turns)
    }

    /// The permanent host loop.
    ///
    /// Each turn gets a frame-sized [`IdleDeadline`]. Between turns the
    /// task yields to tokio; when idle it sleeps until a state setter
    /// requests a pass. Only returns on a render error.
    pub async fn run(&mut self) -> Result<Infallible> {
        loop {
            let mut deadline =
                IdleDeadline::new(self.config.frame_budget(), self.config.yield_threshold());
            match self.work_loop(&mut deadline)? {
                Turn::Idle => {
                    let updates = Arc::clone(&self.updates);
                    if !updates.is_pending() {
                        updates.notified().await;
                    }
                }
                Turn::Yielded | Turn::Committed(_) => tokio::task::yield_now().await,
            }
        }
    }

    /// The output host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The output host, mutably. Mutating nodes the runtime owns makes
    /// later property syncs work from stale assumptions.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The configuration in use.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The signal state setters raise. Embedders can raise it too.
    pub fn update_signal(&self) -> Arc<UpdateSignal> {
        Arc::clone(&self.updates)
    }

    /// Root of the committed tree.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Look up a fiber of the committed or in-progress tree.
    pub fn fiber(&self, id: FiberId) -> Option<&Fiber<H::Node>> {
        self.fibers.get(id)
    }

    /// The child chain of a fiber.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        self.fibers.children(id)
    }

    /// Whether a pass is in progress.
    pub fn is_rendering(&self) -> bool {
        self.wip_root.is_some()
    }

    /// Number of commits made so far.
    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    /// Number of fibers held across both generations.
    pub fn fiber_count(&self) -> usize {
        self.fibers.len()
    }

    /// Summary of the most recent commit.
    pub fn last_commit(&self) -> Option<CommitSummary> {
        self.last_commit
    }

    // ------------------------------------------------------------------------
    // Pass management
    // ------------------------------------------------------------------------

    fn start_pass(&mut self, anchor: H::Node, props: Props) {
        self.deletions.clear();
        self.release_work_in_progress();
        let root = self
            .fibers
            .insert(Fiber::root(anchor, props, self.current_root));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
    }

    /// Replace the pass in progress with a fresh one from the committed
    /// root, or from the pending root if nothing was committed yet.
    fn restart(&mut self) {
        let Some(base) = self.current_root.or(self.wip_root) else {
            tracing::debug!("update requested with nothing rendered");
            return;
        };
        let Some((anchor, props)) = self.fibers.get(base).and_then(|fiber| {
            let anchor = fiber.dom.clone()?;
            Some((anchor, fiber.props.clone()))
        }) else {
            return;
        };
        self.start_pass(anchor, props);
        tracing::debug!(root = ?self.wip_root, "pass restarted by a state update");
    }

    fn abandon_pass(&mut self) {
        self.deletions.clear();
        self.next_unit = None;
        self.release_work_in_progress();
        tracing::debug!("pass abandoned");
    }

    /// Drop every fiber that is not part of the committed tree.
    fn release_work_in_progress(&mut self) {
        self.wip_root = None;
        let roots: Vec<FiberId> = self.current_root.into_iter().collect();
        let released = self.fibers.retain_reachable(&roots);
        if released > 0 {
            tracing::trace!(released, "work-in-progress fibers released");
        }
    }

    fn commit(&mut self, root: FiberId) -> CommitSummary {
        let deletions = std::mem::take(&mut self.deletions);
        let summary = commit_root(
            &mut self.host,
            &mut self.fibers,
            root,
            &deletions,
            &self.config.event_prefix,
        );

        for id in std::iter::once(root).chain(self.fibers.descendants(root)) {
            if let Some(fiber) = self.fibers.get_mut(id) {
                fiber.alternate = None;
            }
        }
        self.current_root = Some(root);
        self.wip_root = None;
        let released = self.fibers.retain_reachable(&[root]);

        self.commit_count += 1;
        self.last_commit = Some(summary);
        tracing::debug!(
            placements = summary.placements,
            updates = summary.updates,
            deletions = summary.deletions,
            effects = summary.effects_run,
            released,
            "commit"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::h;
    use crate::host::MemoryDocument;
    use crate::scheduler::WorkBudget;

    fn runtime() -> (Runtime<MemoryDocument>, crate::host::NodeId) {
        let mut doc = MemoryDocument::new();
        let anchor = doc.create_root("root");
        (Runtime::new(doc), anchor)
    }

    #[test]
    fn render_does_no_work_until_a_turn() {
        let (mut rt, anchor) = runtime();
        rt.render(h("p").child("hi").build(), anchor);

        assert!(rt.is_rendering());
        assert!(rt.host().children(anchor).is_empty());

        let summary = rt.flush().unwrap().unwrap();
        assert_eq!(summary.placements, 2);
        assert!(!rt.is_rendering());
        assert_eq!(rt.host().inner_html(anchor), "<p>hi</p>");
    }

    #[test]
    fn idle_runtime_reports_idle() {
        let (mut rt, _) = runtime();
        assert_eq!(rt.work_loop(&mut Unbounded).unwrap(), Turn::Idle);
        assert_eq!(rt.commit_count(), 0);
    }

    #[test]
    fn tiny_budget_spreads_the_pass() {
        let (mut rt, anchor) = runtime();
        rt.render(h("ul").children((0..3).map(|i| h("li").child(i))).build(), anchor);

        // Should take one turn per fiber: root, ul, 3 li, 3 text
        let turns = rt.run_until_idle(|| WorkBudget(1)).unwrap();
        assert_eq!(turns, 8);
        assert_eq!(rt.host().text_content(anchor), "012");
    }

    #[test]
    fn previous_generation_is_released() {
        let (mut rt, anchor) = runtime();
        rt.render(h("div").child("a").build(), anchor);
        rt.flush().unwrap();
        let after_first = rt.fiber_count();

        rt.render(h("div").child("b").build(), anchor);
        rt.flush().unwrap();

        assert_eq!(rt.fiber_count(), after_first);
        let root = rt.current_root().unwrap();
        assert!(rt.fiber(root).unwrap().alternate().is_none());
    }

    #[test]
    fn update_before_first_commit_restarts_from_pending_root() {
        let (mut rt, anchor) = runtime();
        rt.render(h("div").child("x").build(), anchor);
        rt.work_loop(&mut WorkBudget(1)).unwrap();

        rt.update_signal().request();
        rt.flush().unwrap();

        assert_eq!(rt.commit_count(), 1);
        assert_eq!(rt.host().inner_html(anchor), "<div>x</div>");
    }
}
