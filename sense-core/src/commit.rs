//! Commit Phase
//!
//! Applies a finished work-in-progress tree to the output document in one
//! uninterruptible step.
//!
//! # Order of Operations
//!
//! 1. **Deletions.** Every old fiber recorded by the diff loses its output
//!    nodes. A fiber without a node of its own (a component or fragment)
//!    hands the removal down to each of its children, so the topmost node
//!    of every branch is removed. Removal is guarded: a node is only
//!    removed if it really is a child of the claimed parent, and is then
//!    released to the host. Effect cleanups still pending anywhere in the
//!    deleted subtree run afterwards.
//! 2. **Mutations.** A pre-order walk of the new tree appends `PLACEMENT`
//!    nodes to their nearest ancestor node and syncs the props of `UPDATE`
//!    nodes from the alternate's props.
//! 3. **Effects.** A second pre-order walk runs, per fiber, the cleanups of
//!    every effect that is active this commit and then the effect
//!    callbacks. Callbacks therefore only ever observe a fully mutated
//!    document.
//!
//! Promoting the tree to "current" is left to the runtime.

use serde::Serialize;

use crate::fiber::{EffectTag, FiberArena, FiberId};
use crate::hooks::{run_cleanup, Hook};
use crate::host::Host;
use crate::reconciler::update_dom;

/// What one commit did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Fibers tagged `PLACEMENT` in the committed tree.
    pub placements: usize,
    /// Fibers tagged `UPDATE` in the committed tree.
    pub updates: usize,
    /// Old fibers torn down.
    pub deletions: usize,
    /// Effect callbacks invoked.
    pub effects_run: usize,
    /// Effect cleanups invoked, including unmount cleanups.
    pub cleanups_run: usize,
}

/// Apply the tree rooted at `root` and the recorded `deletions`.
pub(crate) fn commit_root<H: Host>(
    host: &mut H,
    fibers: &mut FiberArena<H::Node>,
    root: FiberId,
    deletions: &[FiberId],
    event_prefix: &str,
) -> CommitSummary {
    let mut summary = CommitSummary {
        deletions: deletions.len(),
        ..CommitSummary::default()
    };

    for &deleted in deletions {
        match fibers.host_parent(deleted) {
            Some(parent) => commit_deletion(host, fibers, deleted, &parent),
            None => tracing::warn!(fiber = deleted.raw(), "deleted fiber has no parent node"),
        }
        summary.cleanups_run += unmount_cleanups(fibers, deleted);
    }

    let order = fibers.descendants(root);

    for &id in &order {
        let Some(fiber) = fibers.get(id) else {
            continue;
        };
        match fiber.effect_tag {
            Some(EffectTag::Placement) => {
                summary.placements += 1;
                if let Some(dom) = &fiber.dom {
                    if let Some(parent) = fibers.host_parent(id) {
                        host.append_child(&parent, dom);
                    }
                }
            }
            Some(EffectTag::Update) => {
                summary.updates += 1;
                let previous = fiber.alternate.and_then(|alternate| fibers.get(alternate));
                if let (Some(dom), Some(previous)) = (&fiber.dom, previous) {
                    update_dom(host, dom, &previous.props, &fiber.props, event_prefix);
                }
            }
            Some(EffectTag::Deletion) | None => {}
        }
    }

    for &id in &order {
        let (effects, cleanups) = commit_effects(fibers, id);
        summary.effects_run += effects;
        summary.cleanups_run += cleanups;
    }

    summary
}

fn commit_deletion<H: Host>(
    host: &mut H,
    fibers: &FiberArena<H::Node>,
    id: FiberId,
    parent: &H::Node,
) {
    let Some(fiber) = fibers.get(id) else {
        return;
    };
    match &fiber.dom {
        Some(dom) => {
            if host.contains(parent, dom) {
                host.remove_child(parent, dom);
                host.release(dom);
            } else {
                tracing::warn!(fiber = id.raw(), "deleted node is not attached to its parent");
            }
        }
        None => {
            for child in fibers.children(id) {
                commit_deletion(host, fibers, child, parent);
            }
        }
    }
}

/// Run the stored cleanups of every effect in the subtree of `id`.
fn unmount_cleanups<N: Clone>(fibers: &FiberArena<N>, id: FiberId) -> usize {
    let mut ran = 0;
    for fiber_id in std::iter::once(id).chain(fibers.descendants(id)) {
        let Some(fiber) = fibers.get(fiber_id) else {
            continue;
        };
        for hook in &fiber.hooks {
            if let Hook::Effect(effect) = hook {
                if run_cleanup(&effect.cleanup_slot()) {
                    ran += 1;
                }
            }
        }
    }
    ran
}

/// Run the active effects of one fiber, cleanups first.
fn commit_effects<N: Clone>(fibers: &mut FiberArena<N>, id: FiberId) -> (usize, usize) {
    let Some(fiber) = fibers.get_mut(id) else {
        return (0, 0);
    };
    let jobs: Vec<_> = fiber
        .hooks
        .iter_mut()
        .filter_map(|hook| match hook {
            Hook::Effect(effect) => effect.take_pending(),
            Hook::State(_) => None,
        })
        .collect();

    let mut cleanups = 0;
    for (_, slot) in &jobs {
        if run_cleanup(slot) {
            cleanups += 1;
        }
    }

    let mut effects = 0;
    for (callback, slot) in jobs {
        if let Some(cleanup) = callback() {
            *slot.lock() = Some(cleanup);
        }
        effects += 1;
    }
    (effects, cleanups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, Props};
    use crate::fiber::Fiber;
    use crate::host::{MemoryDocument, NodeId};

    fn add(
        fibers: &mut FiberArena<NodeId>,
        parent: FiberId,
        element_type: ElementType,
        dom: Option<NodeId>,
    ) -> FiberId {
        let mut fiber = Fiber::new(element_type, Props::new(), None, parent, EffectTag::Placement);
        fiber.dom = dom;
        let id = fibers.insert(fiber);
        let siblings = fibers.children(parent);
        match siblings.last() {
            Some(&last) => fibers.get_mut(last).unwrap().sibling = Some(id),
            None => fibers.get_mut(parent).unwrap().child = Some(id),
        }
        id
    }

    #[test]
    fn placements_append_in_tree_order() {
        let mut doc = MemoryDocument::new();
        let anchor = doc.create_root("root");
        let mut fibers = FiberArena::new();
        let root = fibers.insert(Fiber::root(anchor, Props::new(), None));

        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let a_fiber = add(&mut fibers, root, ElementType::from("a"), Some(a));
        add(&mut fibers, a_fiber, ElementType::from("b"), Some(b));

        let summary = commit_root(&mut doc, &mut fibers, root, &[], "on");

        assert_eq!(summary.placements, 2);
        assert_eq!(doc.children(anchor), &[a]);
        assert_eq!(doc.children(a), &[b]);
    }

    #[test]
    fn deleting_a_nodeless_fiber_removes_every_branch() {
        let mut doc = MemoryDocument::new();
        let anchor = doc.create_root("root");
        let mut fibers = FiberArena::new();
        let root = fibers.insert(Fiber::root(anchor, Props::new(), None));

        let x = doc.create_element("x");
        let y = doc.create_element("y");
        doc.append_child(&anchor, &x);
        doc.append_child(&anchor, &y);

        let group = add(&mut fibers, root, ElementType::Fragment, None);
        add(&mut fibers, group, ElementType::from("x"), Some(x));
        add(&mut fibers, group, ElementType::from("y"), Some(y));

        let next = fibers.insert(Fiber::root(anchor, Props::new(), Some(root)));
        let summary = commit_root(&mut doc, &mut fibers, next, &[group], "on");

        assert_eq!(summary.deletions, 1);
        assert!(doc.children(anchor).is_empty());
    }
}
