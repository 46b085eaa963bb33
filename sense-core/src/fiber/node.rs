//! Fiber Records
//!
//! This module defines the per-position records of the fiber tree.

use std::fmt;

use crate::element::{Component, ElementType, Key, Props};
use crate::hooks::Hook;

/// Identifier of a fiber within its [`FiberArena`](super::FiberArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(u64);

impl FiberId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The verdict attached to a fiber by the diff, consumed by the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTag {
    /// A new output node is inserted under the nearest ancestor node.
    Placement,
    /// The existing output node is kept and its properties synced.
    Update,
    /// The output nodes of an old fiber are removed.
    ///
    /// Never set on a fiber: old fibers are left untouched and membership
    /// in the pass's deletion list implies this tag.
    Deletion,
}

/// What a fiber represents.
#[derive(Debug, Clone)]
pub enum FiberType {
    /// The placeholder root of a pass; its output node is the render anchor.
    Root,
    /// A fiber produced from an element.
    Element(ElementType),
}

impl FiberType {
    /// The element type, `None` for the root.
    pub fn element_type(&self) -> Option<&ElementType> {
        match self {
            FiberType::Root => None,
            FiberType::Element(element_type) => Some(element_type),
        }
    }

    /// The render function of a component fiber.
    pub fn component(&self) -> Option<&Component> {
        match self {
            FiberType::Element(ElementType::Component(component)) => Some(component),
            _ => None,
        }
    }

    /// Whether a new element of `other` type can reuse this fiber.
    pub fn same_type(&self, other: &ElementType) -> bool {
        self.element_type().is_some_and(|t| t.same_type(other))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            FiberType::Root => "#root",
            FiberType::Element(element_type) => element_type.name(),
        }
    }
}

/// One unit of reconciliation: a tree position in one generation.
///
/// Links are ids into the arena, never owning references, so the two
/// generations can be released independently.
pub struct Fiber<N> {
    pub(crate) fiber_type: FiberType,
    pub(crate) props: Props,
    pub(crate) key: Option<Key>,

    /// The output node this fiber is directly responsible for. `None` for
    /// components and fragments, whose nodes belong to descendants.
    pub(crate) dom: Option<N>,

    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,

    /// The fiber at the same position in the committed generation.
    pub(crate) alternate: Option<FiberId>,

    pub(crate) effect_tag: Option<EffectTag>,

    /// Hook records; only component fibers have any.
    pub(crate) hooks: Vec<Hook>,
}

impl<N> Fiber<N> {
    /// The placeholder root of a pass.
    pub(crate) fn root(anchor: N, props: Props, alternate: Option<FiberId>) -> Self {
        Self {
            fiber_type: FiberType::Root,
            props,
            key: None,
            dom: Some(anchor),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect_tag: None,
            hooks: Vec::new(),
        }
    }

    /// A fiber for a new element position.
    pub(crate) fn new(
        element_type: ElementType,
        props: Props,
        key: Option<Key>,
        parent: FiberId,
        effect_tag: EffectTag,
    ) -> Self {
        Self {
            fiber_type: FiberType::Element(element_type),
            props,
            key,
            dom: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect_tag: Some(effect_tag),
            hooks: Vec::new(),
        }
    }

    /// What the fiber represents.
    pub fn fiber_type(&self) -> &FiberType {
        &self.fiber_type
    }

    /// Props copied from the producing element.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Identity key.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The output node owned by this fiber.
    pub fn dom(&self) -> Option<&N> {
        self.dom.as_ref()
    }

    /// The effect the commit applies for this fiber.
    pub fn effect_tag(&self) -> Option<EffectTag> {
        self.effect_tag
    }

    /// Parent fiber.
    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    /// First child fiber.
    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    /// Next sibling fiber.
    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    /// Previous-generation fiber at this position.
    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    /// Number of hook records.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

impl<N: fmt::Debug> fmt::Debug for Fiber<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("type", &self.fiber_type.name())
            .field("key", &self.key)
            .field("dom", &self.dom)
            .field("effect_tag", &self.effect_tag)
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("sibling", &self.sibling)
            .field("alternate", &self.alternate)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_fiber_owns_the_anchor() {
        let fiber = Fiber::root(7u32, Props::new(), None);
        assert_eq!(fiber.dom(), Some(&7));
        assert!(fiber.effect_tag().is_none());
        assert!(fiber.fiber_type().element_type().is_none());
    }

    #[test]
    fn element_fiber_matches_its_type() {
        let fiber: Fiber<u32> = Fiber::new(
            ElementType::from("li"),
            Props::new(),
            None,
            FiberId::from_raw(0),
            EffectTag::Placement,
        );
        assert!(fiber.fiber_type().same_type(&ElementType::from("li")));
        assert!(!fiber.fiber_type().same_type(&ElementType::Text));
        assert!(fiber.dom().is_none());
        assert_eq!(fiber.effect_tag(), Some(EffectTag::Placement));
    }
}
