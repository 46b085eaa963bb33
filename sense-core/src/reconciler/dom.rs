//! Output-node property sync.
//!
//! Brings one output node from its previous props to its next props with
//! the fewest host calls. Props split into two classes:
//!
//! - *event props*: names starting with the event prefix (`"on"` by
//!   default) whose value is a handler. `onClick` maps to the native event
//!   `click`.
//! - *plain props*: everything else except `key`.
//!
//! A value "changed" when it is not strictly equal (see
//! [`PropValue::strict_equals`]), so an unchanged handler instance is never
//! re-registered, `1` and `1.0` count as the same number, and syncing
//! identical bags is a no-op.

use crate::element::{PropValue, Props, KEY};
use crate::host::Host;

const CLASS_NAME: &str = "className";
const STYLE: &str = "style";

/// Host call counts of one sync, used by tests and the commit summary logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DomChanges {
    pub listeners_removed: usize,
    pub props_cleared: usize,
    pub props_set: usize,
    pub listeners_added: usize,
}

impl DomChanges {
    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Native event name of an event prop, `None` for plain props.
fn event_name(name: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    name.strip_prefix(prefix).map(str::to_lowercase)
}

fn is_new(prev: &Props, next: &Props, name: &str) -> bool {
    match (prev.get(name), next.get(name)) {
        (Some(a), Some(b)) => !a.strict_equals(b),
        (None, None) => false,
        _ => true,
    }
}

/// Sync `node` from `prev` to `next`.
pub(crate) fn update_dom<H: Host>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
    event_prefix: &str,
) -> DomChanges {
    let mut changes = DomChanges::default();

    // Stale listeners
    for (name, value) in prev.iter() {
        let Some(event) = event_name(name, event_prefix) else {
            continue;
        };
        if !next.contains(name) || is_new(prev, next, name) {
            if let Some(handler) = value.as_handler() {
                host.remove_event_listener(node, &event, handler);
                changes.listeners_removed += 1;
            }
        }
    }

    // Props that are gone
    for (name, _) in prev.iter() {
        if name == KEY || event_name(name, event_prefix).is_some() || next.contains(name) {
            continue;
        }
        if host.has_property(node, name) {
            host.set_property(node, name, &PropValue::from(""));
        }
        if host.has_attribute(node, name) {
            host.remove_attribute(node, name);
        }
        changes.props_cleared += 1;
    }

    // New or changed props
    for (name, value) in next.iter() {
        if name == KEY || event_name(name, event_prefix).is_some() || !is_new(prev, next, name) {
            continue;
        }
        match value {
            _ if name == CLASS_NAME => host.set_class_name(node, &value.to_attribute_string()),
            PropValue::Style(style) if name == STYLE => host.merge_style(node, style),
            _ if host.has_property(node, name) => host.set_property(node, name, value),
            _ => host.set_attribute(node, name, &value.to_attribute_string()),
        }
        changes.props_set += 1;
    }

    // New or changed listeners
    for (name, value) in next.iter() {
        let Some(event) = event_name(name, event_prefix) else {
            continue;
        };
        if !is_new(prev, next, name) {
            continue;
        }
        match value.as_handler() {
            Some(handler) => {
                host.add_event_listener(node, &event, handler);
                changes.listeners_added += 1;
            }
            None => tracing::warn!(prop = name, "event prop without a handler ignored"),
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Event, EventHandler, Style};
    use crate::host::MemoryDocument;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn setup() -> (MemoryDocument, crate::host::NodeId) {
        let mut doc = MemoryDocument::new();
        let node = doc.create_element("input");
        (doc, node)
    }

    #[test]
    fn event_names_strip_the_prefix() {
        assert_eq!(event_name("onClick", "on").as_deref(), Some("click"));
        assert_eq!(event_name("onMouseOver", "on").as_deref(), Some("mouseover"));
        assert_eq!(event_name("title", "on"), None);
        assert_eq!(event_name("onClick", ""), None);
    }

    #[test]
    fn live_properties_and_attributes() {
        let (mut doc, node) = setup();
        let next = Props::new()
            .with("value", "hello")
            .with("data-id", 7)
            .with("className", "big");

        update_dom(&mut doc, &node, &Props::new(), &next, "on");

        assert_eq!(doc.property(node, "value").and_then(|v| v.as_str()), Some("hello"));
        assert_eq!(doc.attribute(node, "data-id"), Some("7"));
        assert_eq!(doc.class_name(node), "big");
    }

    #[test]
    fn identical_props_are_a_no_op() {
        let (mut doc, node) = setup();
        let handler = EventHandler::new(|_| {});
        let props = Props::new()
            .with("id", "a")
            .with("onInput", handler)
            .with("style", Style::new().with("color", "red"));

        update_dom(&mut doc, &node, &Props::new(), &props, "on");
        let changes = update_dom(&mut doc, &node, &props, &props, "on");

        assert!(changes.is_empty());
        assert_eq!(doc.listener_count(node, "input"), 1);
    }

    #[test]
    fn numerically_equal_values_are_not_rewritten() {
        let (mut doc, node) = setup();
        let prev = Props::new().with("data-n", 1).with("data-z", 0.0);
        let next = Props::new().with("data-n", 1.0).with("data-z", -0.0);
        update_dom(&mut doc, &node, &Props::new(), &prev, "on");

        let changes = update_dom(&mut doc, &node, &prev, &next, "on");

        assert!(changes.is_empty());
        assert_eq!(doc.attribute(node, "data-n"), Some("1"));
    }

    #[test]
    fn gone_props_are_cleared() {
        let (mut doc, node) = setup();
        let prev = Props::new().with("title", "t").with("aria-label", "x");
        update_dom(&mut doc, &node, &Props::new(), &prev, "on");

        let changes = update_dom(&mut doc, &node, &prev, &Props::new(), "on");

        assert_eq!(changes.props_cleared, 2);
        assert_eq!(doc.property(node, "title").and_then(|v| v.as_str()), Some(""));
        assert_eq!(doc.attribute(node, "aria-label"), None);
    }

    #[test]
    fn changed_handler_is_swapped() {
        let (mut doc, node) = setup();
        let first = Arc::new(AtomicI32::new(0));
        let second = Arc::new(AtomicI32::new(0));

        let f = first.clone();
        let prev = Props::new().with(
            "onClick",
            EventHandler::new(move |_| {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let s = second.clone();
        let next = Props::new().with(
            "onClick",
            EventHandler::new(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            }),
        );

        update_dom(&mut doc, &node, &Props::new(), &prev, "on");
        let changes = update_dom(&mut doc, &node, &prev, &next, "on");
        doc.dispatch_event(node, &Event::new("click"));

        assert_eq!(changes.listeners_removed, 1);
        assert_eq!(changes.listeners_added, 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn style_objects_merge() {
        let (mut doc, node) = setup();
        let prev = Props::new().with("style", Style::new().with("color", "red"));
        let next = Props::new().with("style", Style::new().with("margin", "0"));

        update_dom(&mut doc, &node, &Props::new(), &prev, "on");
        update_dom(&mut doc, &node, &prev, &next, "on");

        // Should keep earlier declarations
        assert_eq!(doc.style(node, "color"), Some("red"));
        assert_eq!(doc.style(node, "margin"), Some("0"));
    }
}
