//! In-memory document.
//!
//! Nodes live in a map keyed by [`NodeId`]; parent and child links are ids.
//! Element nodes expose a fixed set of reflected live properties, the rest
//! of the names fall back to generic attributes, which is the split the
//! property sync relies on.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Host;
use crate::element::{Event, EventHandler, PropValue, Style};

/// Live properties of element nodes.
const ELEMENT_PROPERTIES: &[&str] = &[
    "id",
    "value",
    "checked",
    "disabled",
    "title",
    "hidden",
    "href",
    "src",
    "type",
    "placeholder",
    "name",
    "tabIndex",
    "className",
    "style",
];

/// Live properties of text nodes.
const TEXT_PROPERTIES: &[&str] = &["nodeValue", "data", "textContent"];

/// Handle to a node of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, PropValue>,
    class_name: String,
    style: IndexMap<String, String>,
    listeners: Vec<(String, EventHandler)>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
            class_name: String::new(),
            style: IndexMap::new(),
            listeners: Vec::new(),
        }
    }
}

/// Serializable view of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Tag name of element nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Content of text nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Class name, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Generic attributes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Live properties, stringified.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    /// Inline style declarations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub style: IndexMap<String, String>,
    /// Names of events with at least one listener.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<String>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// A document kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: HashMap<NodeId, NodeData>,
    next_id: u64,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeData::new(kind));
        id
    }

    /// Create a detached element to use as a render anchor.
    pub fn create_root(&mut self, tag: &str) -> NodeId {
        self.insert(NodeKind::Element(tag.to_string()))
    }

    /// Number of nodes stored. Removed nodes stay stored until released,
    /// as do detached nodes of a render pass that never committed.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of a node, in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|data| data.children.as_slice())
            .unwrap_or_default()
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|data| data.parent)
    }

    /// Tag name of an element node.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    /// Concatenated text of a subtree.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// A generic attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(&node)?.attributes.get(name).map(String::as_str)
    }

    /// A live property.
    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        self.nodes.get(&node)?.properties.get(name)
    }

    /// The class name (empty when unset).
    pub fn class_name(&self, node: NodeId) -> &str {
        self.nodes
            .get(&node)
            .map(|data| data.class_name.as_str())
            .unwrap_or_default()
    }

    /// One inline style declaration.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(&node)?.style.get(property).map(String::as_str)
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.nodes
            .get(&node)
            .map(|data| data.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Invoke the listeners registered on `node` for the event's name.
    ///
    /// Events do not bubble. Returns the number of listeners invoked.
    pub fn dispatch_event(&self, node: NodeId, event: &Event) -> usize {
        let handlers: Vec<EventHandler> = self
            .nodes
            .get(&node)
            .map(|data| {
                data.listeners
                    .iter()
                    .filter(|(name, _)| name == event.name())
                    .map(|(_, handler)| handler.clone())
                    .collect()
            })
            .unwrap_or_default();

        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    /// Serializable view of a subtree.
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let data = self.nodes.get(&node)?;
        let (tag, text) = match &data.kind {
            NodeKind::Element(tag) => (Some(tag.clone()), None),
            NodeKind::Text(text) => (None, Some(text.clone())),
        };

        let mut listeners: Vec<String> = Vec::new();
        for (name, _) in &data.listeners {
            if !listeners.contains(name) {
                listeners.push(name.clone());
            }
        }

        Some(NodeSnapshot {
            tag,
            text,
            class_name: (!data.class_name.is_empty()).then(|| data.class_name.clone()),
            attributes: data.attributes.clone(),
            properties: data
                .properties
                .iter()
                .map(|(name, value)| (name.clone(), value.to_attribute_string()))
                .collect(),
            style: data.style.clone(),
            listeners,
            children: data
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    /// JSON view of a subtree.
    pub fn to_json(&self, node: NodeId) -> serde_json::Value {
        self.snapshot(node)
            .and_then(|snapshot| serde_json::to_value(snapshot).ok())
            .unwrap_or(serde_json::Value::Null)
    }

    /// Markup for the children of `node` (the anchor itself is not printed).
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    /// Markup for `node` and its subtree.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        let tag = match &data.kind {
            NodeKind::Text(text) => {
                out.push_str(&escape(text));
                return;
            }
            NodeKind::Element(tag) => tag,
        };

        out.push('<');
        out.push_str(tag);
        if !data.class_name.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&data.class_name)));
        }
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        for (name, value) in &data.properties {
            let name = name.to_lowercase();
            match value {
                PropValue::Bool(true) => out.push_str(&format!(" {name}")),
                PropValue::Null | PropValue::Bool(false) | PropValue::Handler(_) => {}
                PropValue::Str(s) if s.is_empty() => {}
                other => out.push_str(&format!(" {}=\"{}\"", name, escape(&other.to_attribute_string()))),
            }
        }
        if !data.style.is_empty() {
            let css: Vec<String> = data.style.iter().map(|(k, v)| format!("{k}: {v};")).collect();
            out.push_str(&format!(" style=\"{}\"", escape(&css.join(" "))));
        }
        out.push('>');
        for child in &data.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{tag}>"));
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(&child).and_then(|data| data.parent) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(&parent) {
            parent_data.children.retain(|c| *c != child);
        }
        if let Some(child_data) = self.nodes.get_mut(&child) {
            child_data.parent = None;
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn text_of(value: &PropValue) -> String {
    match value {
        PropValue::Null => String::new(),
        other => other.to_attribute_string(),
    }
}

impl Host for MemoryDocument {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(NodeKind::Element(tag.to_string()))
    }

    fn create_text_node(&mut self, text: &str) -> NodeId {
        self.insert(NodeKind::Text(text.to_string()))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            tracing::warn!(?parent, ?child, "append_child on a node that does not exist");
            return;
        }
        self.detach(*child);
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.push(*child);
        }
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = Some(*parent);
        }
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if !self.contains(parent, child) {
            tracing::warn!(?parent, ?child, "remove_child target is not a child of parent");
            return;
        }
        self.detach(*child);
    }

    fn release(&mut self, node: &NodeId) {
        if self.parent(*node).is_some() {
            tracing::warn!(?node, "release of an attached node ignored");
            return;
        }
        let mut pending = vec![*node];
        while let Some(id) = pending.pop() {
            if let Some(data) = self.nodes.remove(&id) {
                pending.extend(data.children);
            }
        }
    }

    fn contains(&self, parent: &NodeId, child: &NodeId) -> bool {
        self.nodes
            .get(child)
            .is_some_and(|data| data.parent == Some(*parent))
    }

    fn has_property(&self, node: &NodeId, name: &str) -> bool {
        match self.nodes.get(node).map(|data| &data.kind) {
            Some(NodeKind::Element(_)) => ELEMENT_PROPERTIES.contains(&name),
            Some(NodeKind::Text(_)) => TEXT_PROPERTIES.contains(&name),
            None => false,
        }
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: &PropValue) {
        let Some(data) = self.nodes.get_mut(node) else {
            return;
        };
        if let NodeKind::Text(text) = &mut data.kind {
            if TEXT_PROPERTIES.contains(&name) {
                *text = text_of(value);
            }
            return;
        }
        match (name, value) {
            ("className", value) => data.class_name = text_of(value),
            ("style", PropValue::Style(style)) => {
                data.style = style.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            }
            ("style", value) => {
                data.style = text_of(value)
                    .split(';')
                    .filter_map(|declaration| {
                        let (property, value) = declaration.split_once(':')?;
                        Some((property.trim().to_string(), value.trim().to_string()))
                    })
                    .collect();
            }
            (name, value) => {
                data.properties.insert(name.to_string(), value.clone());
            }
        }
    }

    fn has_attribute(&self, node: &NodeId, name: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|data| data.attributes.contains_key(name))
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.attributes.shift_remove(name);
        }
    }

    fn set_class_name(&mut self, node: &NodeId, class_name: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.class_name = class_name.to_string();
        }
    }

    fn merge_style(&mut self, node: &NodeId, style: &Style) {
        if let Some(data) = self.nodes.get_mut(node) {
            for (property, value) in style.iter() {
                data.style.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn add_event_listener(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        let Some(data) = self.nodes.get_mut(node) else {
            return;
        };
        let registered = data
            .listeners
            .iter()
            .any(|(name, existing)| name == event && existing.ptr_eq(handler));
        if !registered {
            data.listeners.push((event.to_string(), handler.clone()));
        }
    }

    fn remove_event_listener(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.listeners
                .retain(|(name, existing)| !(name == event && existing.ptr_eq(handler)));
        }
    }
}
