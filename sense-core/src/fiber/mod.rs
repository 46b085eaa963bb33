//! Fiber Graph
//!
//! Fibers are the mutable counterpart of elements: one record per tree
//! position per render generation, carrying the diff verdict and the hook
//! records of component instances.
//!
//! # Generations
//!
//! Two trees exist while a pass is running:
//!
//! - the *current* tree, which matches what the output document shows, and
//! - the *work-in-progress* tree, built fresh by the reconciler.
//!
//! Every work-in-progress fiber that continues an existing position points
//! at its predecessor through `alternate`. The current tree is only read
//! during a pass; the commit promotes the work-in-progress tree and releases
//! the old generation.
//!
//! # Design Decisions
//!
//! 1. Tree links are first-child / next-sibling ids, so a fiber needs no
//!    child list and the work loop can resume from any single fiber.
//!
//! 2. All links are ids into a [`FiberArena`]. `parent` and `alternate`
//!    point "backwards" and would form cycles as references; as ids they
//!    are plain data.

mod arena;
mod node;

pub use arena::FiberArena;
pub use node::{EffectTag, Fiber, FiberId, FiberType};
