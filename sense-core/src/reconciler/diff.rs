//! Sibling-list reconciliation.
//!
//! Matches the new child elements of a fiber against the children of its
//! alternate, by key when the new element has one that is still
//! available, else by position.
//!
//! # Matching Rules
//!
//! - A keyed element takes the old fiber with the same key, if any.
//! - Otherwise the element takes the old fiber under the positional
//!   cursor, provided both carry the same key (in practice: both unkeyed).
//!   Once the new list is exhausted, an unkeyed fiber under the cursor is
//!   matched by "nothing" and therefore deleted.
//! - The cursor only advances when the element is unkeyed or its key
//!   equals the key of the fiber under the cursor, so keyed moves
//!   elsewhere in the list do not shift the unkeyed positions.
//! - An old fiber is matched at most once. A positional match also removes
//!   the fiber from the key lookup, and a positional candidate already
//!   taken by key yields no match.
//! - Same type: `UPDATE`, reusing the old output node. Otherwise the
//!   element becomes a `PLACEMENT` and the matched old fiber is deleted.
//! - Old keyed fibers left unmatched are deleted at the end, in their
//!   original sibling order. When old siblings share a key, the first one
//!   is found by key and the others can still be matched by position.
//!
//! Matched fibers keep their output node where it is: a keyed move
//! changes which fiber owns which node but does not reorder the document,
//! and placements are always appended to the parent node.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::WorkContext;
use crate::element::{Element, Key};
use crate::fiber::{EffectTag, Fiber, FiberId};
use crate::host::Host;

/// Build the child chain of `parent` from `elements`.
pub(crate) fn reconcile_children<H: Host>(
    cx: &mut WorkContext<'_, H>,
    parent: FiberId,
    elements: &[Element],
) {
    let old_children = cx
        .fibers
        .get(parent)
        .and_then(|fiber| fiber.alternate)
        .map(|alternate| cx.fibers.children(alternate))
        .unwrap_or_default();
    let first_old = old_children.first().copied();

    let mut by_key: IndexMap<Key, FiberId> = IndexMap::new();
    for &id in &old_children {
        if let Some(key) = cx.fibers.get(id).and_then(|fiber| fiber.key.clone()) {
            by_key.entry(key).or_insert(id);
        }
    }

    let mut consumed: HashSet<FiberId> = HashSet::new();
    let mut produced: Vec<FiberId> = Vec::with_capacity(elements.len());
    let mut cursor = first_old;
    let mut index = 0;

    while index < elements.len() || cursor.is_some() {
        let element = elements.get(index);
        let element_key = element.and_then(Element::key);

        let matched = match element_key.and_then(|key| by_key.shift_remove(key)) {
            Some(id) => Some(id),
            None => cursor.filter(|id| {
                !consumed.contains(id)
                    && cx.fibers.get(*id).and_then(|fiber| fiber.key.as_ref()) == element_key
            }),
        };

        if let Some(old) = matched {
            consumed.insert(old);
            if let Some(key) = cx.fibers.get(old).and_then(|fiber| fiber.key.as_ref()) {
                if by_key.get(key) == Some(&old) {
                    by_key.shift_remove(key);
                }
            }
        }

        let same_type = match (element, matched) {
            (Some(element), Some(old)) => cx
                .fibers
                .get(old)
                .is_some_and(|fiber| fiber.fiber_type.same_type(element.element_type())),
            _ => false,
        };

        if let Some(element) = element {
            let mut fiber = Fiber::new(
                element.element_type().clone(),
                element.props().clone(),
                element.key().cloned(),
                parent,
                if same_type {
                    EffectTag::Update
                } else {
                    EffectTag::Placement
                },
            );
            if same_type {
                fiber.alternate = matched;
                fiber.dom = matched
                    .and_then(|old| cx.fibers.get(old))
                    .and_then(|old| old.dom.clone());
            }
            produced.push(cx.fibers.insert(fiber));
        }

        if let Some(old) = matched {
            if !same_type {
                cx.deletions.push(old);
            }
        }

        if let Some(current) = cursor {
            let current = cx.fibers.get(current);
            let advance = match element_key {
                None => true,
                Some(key) => current.and_then(|fiber| fiber.key.as_ref()) == Some(key),
            };
            if advance {
                cursor = current.and_then(|fiber| fiber.sibling);
            }
        }

        index += 1;
    }

    for &old in &old_children {
        let keyed = cx.fibers.get(old).is_some_and(|fiber| fiber.key.is_some());
        if keyed && !consumed.contains(&old) {
            cx.deletions.push(old);
        }
    }

    link_children(cx, parent, &produced);
}

fn link_children<H: Host>(cx: &mut WorkContext<'_, H>, parent: FiberId, children: &[FiberId]) {
    if let Some(fiber) = cx.fibers.get_mut(parent) {
        fiber.child = children.first().copied();
    }
    for pair in children.windows(2) {
        if let Some(fiber) = cx.fibers.get_mut(pair[0]) {
            fiber.sibling = Some(pair[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::element::{create_element, h, Child, Props};
    use crate::fiber::FiberArena;
    use crate::host::{MemoryDocument, NodeId};
    use crate::scheduler::UpdateSignal;
    use std::sync::Arc;

    struct Fixture {
        doc: MemoryDocument,
        fibers: FiberArena<NodeId>,
        deletions: Vec<FiberId>,
        updates: Arc<UpdateSignal>,
        config: RuntimeConfig,
        anchor: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = MemoryDocument::new();
            let anchor = doc.create_root("root");
            Self {
                doc,
                fibers: FiberArena::new(),
                deletions: Vec::new(),
                updates: Arc::new(UpdateSignal::new()),
                config: RuntimeConfig::default(),
                anchor,
            }
        }

        /// Reconcile `elements` under a root whose alternate is `previous`.
        fn pass(&mut self, previous: Option<FiberId>, elements: &[Element]) -> FiberId {
            self.deletions.clear();
            let root = self
                .fibers
                .insert(Fiber::root(self.anchor, Props::new(), previous));
            let mut cx = WorkContext {
                host: &mut self.doc,
                fibers: &mut self.fibers,
                deletions: &mut self.deletions,
                updates: &self.updates,
                config: &self.config,
            };
            reconcile_children(&mut cx, root, elements);
            root
        }

        fn tags(&self, root: FiberId) -> Vec<Option<EffectTag>> {
            self.fibers
                .children(root)
                .into_iter()
                .map(|id| self.fibers.get(id).unwrap().effect_tag())
                .collect()
        }

        fn alternates(&self, root: FiberId) -> Vec<Option<FiberId>> {
            self.fibers
                .children(root)
                .into_iter()
                .map(|id| self.fibers.get(id).unwrap().alternate())
                .collect()
        }
    }

    fn keyed(tag: &str, key: i64) -> Element {
        h(tag).key(key).build()
    }

    fn plain(tag: &str) -> Element {
        create_element(tag, Props::new(), Vec::<Child>::new())
    }

    #[test]
    fn keyed_reorder_updates_every_fiber() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 2), keyed("li", 3)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[keyed("li", 3), keyed("li", 1), keyed("li", 2)]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Update); 3]);
        assert_eq!(
            fx.alternates(second),
            vec![Some(old[2]), Some(old[0]), Some(old[1])]
        );
        assert!(fx.deletions.is_empty());
    }

    #[test]
    fn unkeyed_type_change_replaces() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[plain("span"), plain("p")]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[plain("p")]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Placement)]);
        // Should delete the span by type mismatch and the p by position
        assert_eq!(fx.deletions, vec![old[0], old[1]]);
    }

    #[test]
    fn vanished_keys_are_deleted() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 2)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[keyed("li", 2)]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Update)]);
        assert_eq!(fx.alternates(second), vec![Some(old[1])]);
        assert_eq!(fx.deletions, vec![old[0]]);
    }

    #[test]
    fn deleted_fibers_are_not_tagged() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 2)]);
        let old = fx.fibers.children(first);

        fx.pass(Some(first), &[keyed("li", 2)]);

        // Should record the deletion in the list only
        assert_eq!(fx.deletions, vec![old[0]]);
        assert_eq!(
            fx.fibers.get(old[0]).unwrap().effect_tag(),
            Some(EffectTag::Placement)
        );
    }

    #[test]
    fn new_key_is_placed() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1)]);

        let second = fx.pass(Some(first), &[keyed("li", 1), keyed("li", 2)]);

        assert_eq!(
            fx.tags(second),
            vec![Some(EffectTag::Update), Some(EffectTag::Placement)]
        );
        assert!(fx.deletions.is_empty());
    }

    #[test]
    fn no_old_fiber_is_deleted_twice() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 2)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[]);

        assert!(fx.tags(second).is_empty());
        assert_eq!(fx.deletions, old);
    }

    #[test]
    fn new_key_never_takes_another_keys_fiber() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 2), keyed("li", 3)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[keyed("li", 1), keyed("li", 3), keyed("li", 4)]);

        assert_eq!(
            fx.tags(second),
            vec![
                Some(EffectTag::Update),
                Some(EffectTag::Update),
                Some(EffectTag::Placement)
            ]
        );
        assert_eq!(fx.alternates(second), vec![Some(old[0]), Some(old[2]), None]);
        assert_eq!(fx.deletions, vec![old[1]]);
    }

    #[test]
    fn unkeyed_element_does_not_take_a_keyed_fiber() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[plain("li")]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Placement)]);
        assert_eq!(fx.deletions, old);
    }

    #[test]
    fn duplicate_keys_reuse_every_fiber() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 1)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[keyed("li", 1), keyed("li", 1)]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Update); 2]);
        assert_eq!(fx.alternates(second), vec![Some(old[0]), Some(old[1])]);
        assert!(fx.deletions.is_empty());
    }

    #[test]
    fn unmatched_duplicate_keys_are_all_deleted() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[keyed("li", 1), keyed("li", 1)]);
        let old = fx.fibers.children(first);

        let second = fx.pass(Some(first), &[keyed("li", 2)]);

        assert_eq!(fx.tags(second), vec![Some(EffectTag::Placement)]);
        assert_eq!(fx.deletions, old);
    }

    #[test]
    fn update_reuses_the_output_node() {
        let mut fx = Fixture::new();
        let first = fx.pass(None, &[plain("div")]);
        let old = fx.fibers.children(first)[0];
        let node = fx.doc.create_element("div");
        fx.fibers.get_mut(old).unwrap().dom = Some(node);

        let second = fx.pass(Some(first), &[plain("div")]);
        let new = fx.fibers.children(second)[0];

        assert_eq!(fx.fibers.get(new).unwrap().dom(), Some(&node));
    }
}
