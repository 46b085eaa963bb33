//! Output Host
//!
//! The reconciler never touches a concrete document. Everything it needs
//! from the output tree goes through the [`Host`] trait, which mirrors the
//! small slice of a document API the commit phase uses: node creation,
//! child insertion and removal, live properties versus generic attributes,
//! class names, inline style and event listeners.
//!
//! [`MemoryDocument`] is the in-crate implementation. It backs the tests and
//! benchmarks and can serve headless embedders that only need the resulting
//! tree.

mod memory;

pub use memory::{MemoryDocument, NodeId, NodeSnapshot};

use std::fmt::Debug;

use crate::element::{EventHandler, PropValue, Style};

/// A document-like output tree.
pub trait Host {
    /// Handle to one output node.
    type Node: Clone + PartialEq + Debug;

    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text_node(&mut self, text: &str) -> Self::Node;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Whether `child` is currently a direct child of `parent`.
    fn contains(&self, parent: &Self::Node, child: &Self::Node) -> bool;

    /// Whether `name` is a writable live property of `node`.
    fn has_property(&self, node: &Self::Node, name: &str) -> bool;

    /// Assign a live property.
    fn set_property(&mut self, node: &Self::Node, name: &str, value: &PropValue);

    /// Whether the generic attribute `name` is present on `node`.
    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

    /// Set a generic attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Remove a generic attribute.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Set the class name.
    fn set_class_name(&mut self, node: &Self::Node, class_name: &str);

    /// Merge declarations into the node's inline style.
    fn merge_style(&mut self, node: &Self::Node, style: &Style);

    /// Register a listener for a native event.
    fn add_event_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Unregister a listener for a native event.
    fn remove_event_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Hand back a removed node that will never be attached again, with
    /// its whole subtree. Hosts that own node storage may free it.
    fn release(&mut self, _node: &Self::Node) {}
}
