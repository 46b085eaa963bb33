//! Reconciler
//!
//! The render phase: builds the work-in-progress fiber tree one fiber at
//! a time and decides, per position, what the commit has to do.
//!
//! # How a Pass Works
//!
//! 1. The runtime creates a root fiber whose alternate is the committed
//!    root and makes it the next unit of work.
//! 2. Each unit of work ([`perform_unit_of_work`]) processes one fiber:
//!    host and text fibers get their output node created, component fibers
//!    run their render function under a hook frame, and every fiber then
//!    diffs its new child elements against its alternate's children
//!    ([`reconcile_children`]).
//! 3. The unit returns the next fiber in depth-first order, so the pass can
//!    stop after any unit and resume later from that fiber.
//!
//! The render phase creates and configures *detached* output nodes but
//! never inserts or removes nodes in the document; that is left to the
//! commit phase.

mod diff;
mod dom;
mod work;

pub(crate) use diff::reconcile_children;
pub(crate) use dom::{update_dom, DomChanges};
pub(crate) use work::perform_unit_of_work;

use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::fiber::{FiberArena, FiberId};
use crate::host::Host;
use crate::scheduler::UpdateSignal;

/// The runtime state a unit of work reads and writes.
pub(crate) struct WorkContext<'a, H: Host> {
    pub host: &'a mut H,
    pub fibers: &'a mut FiberArena<H::Node>,
    /// Old fibers to tear down at commit.
    pub deletions: &'a mut Vec<FiberId>,
    pub updates: &'a Arc<UpdateSignal>,
    pub config: &'a RuntimeConfig,
}
