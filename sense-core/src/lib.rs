//! Sense Core
//!
//! This crate provides the rendering runtime of the Sense UI library. It
//! implements:
//!
//! - An immutable element model built from tags, render functions and
//!   fragments
//! - Hooks (`use_state`, `use_effect`) with positional identity
//! - A fiber tree paired across renders through alternates
//! - An interruptible, resumable reconciler with a keyed sibling diff
//! - A commit phase that applies the result to a document-like host
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `element`: elements, props and child flattening
//! - `host`: the output-document trait and an in-memory document
//! - `fiber`: fiber records and the arena that holds both generations
//! - `hooks`: the hook frame stack and the state/effect hooks
//! - `reconciler`: units of work, the sibling diff and property sync
//! - `commit`: the commit phase
//! - `scheduler`: yield points and the update signal
//! - `runtime`: the work loop and its drivers
//!
//! # Example
//!
//! ```rust,ignore
//! use sense_core::{deps, h, use_effect, use_state, Component, MemoryDocument, Props, Runtime};
//!
//! let counter = Component::new("Counter", |_: &Props| {
//!     let (count, set_count) = use_state(0);
//!
//!     use_effect(Some(deps![count]), move || {
//!         tracing::info!(count, "rendered");
//!         None
//!     });
//!
//!     h("button")
//!         .listener("onClick", move |_| set_count.update(|n| n + 1))
//!         .child(count)
//!         .build()
//! });
//!
//! let mut document = MemoryDocument::new();
//! let root = document.create_root("main");
//!
//! let mut runtime = Runtime::new(document);
//! runtime.render(counter.builder().build(), root);
//! runtime.flush()?;
//! // runtime.host().inner_html(root) == "<button>0</button>"
//! ```

pub mod commit;
pub mod config;
pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
mod reconciler;
pub mod runtime;
pub mod scheduler;

pub use commit::CommitSummary;
pub use config::RuntimeConfig;
pub use element::{
    create_element, create_text_element, flatten_children, fragment, h, Child, Component, Element,
    ElementBuilder, ElementType, Event, EventHandler, Key, PropValue, Props, Style,
};
pub use error::{Error, HookKind, Result};
pub use fiber::{EffectTag, Fiber, FiberId, FiberType};
pub use hooks::{try_use_effect, try_use_state, use_effect, use_state, Cleanup, Deps, SetState};
pub use host::{Host, MemoryDocument, NodeId, NodeSnapshot};
pub use runtime::{Runtime, Turn};
pub use scheduler::{Deadline, IdleDeadline, Unbounded, UpdateSignal, WorkBudget};
