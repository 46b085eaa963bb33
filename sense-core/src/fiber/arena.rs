//! Fiber Arena
//!
//! All fibers of both generations live in one arena indexed by [`FiberId`].
//! Tree links are ids, so releasing a generation is a sweep over the ids
//! that are no longer reachable rather than a cascade of drops.

use std::collections::{HashMap, HashSet};

use super::node::{Fiber, FiberId};

/// Storage for the fibers of a runtime.
pub struct FiberArena<N> {
    /// All live fibers, indexed by ID.
    fibers: HashMap<FiberId, Fiber<N>>,

    /// Next raw id to hand out.
    next_id: u64,
}

impl<N: Clone> FiberArena<N> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            fibers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Add a fiber, returning its id.
    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId::from_raw(self.next_id);
        self.next_id += 1;
        self.fibers.insert(id, fiber);
        id
    }

    /// Get a reference to a fiber.
    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(&id)
    }

    /// Get a mutable reference to a fiber.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(&id)
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// The child chain of a fiber, first child first.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|fiber| fiber.child);
        while let Some(child) = next {
            out.push(child);
            next = self.get(child).and_then(|fiber| fiber.sibling);
        }
        out
    }

    /// The fiber processed after `id` in a depth-first pass that never
    /// leaves the subtree of `boundary`: the first child, else the nearest
    /// next sibling of `id` or of one of its ancestors below `boundary`.
    pub fn next_within(&self, id: FiberId, boundary: FiberId) -> Option<FiberId> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Some(child);
        }

        let mut current = id;
        loop {
            if current == boundary {
                return None;
            }
            let fiber = self.get(current)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            current = fiber.parent?;
        }
    }

    /// All descendants of `root` in depth-first pre-order, `root` excluded.
    pub fn descendants(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.next_within(root, root);
        while let Some(id) = next {
            out.push(id);
            next = self.next_within(id, root);
        }
        out
    }

    /// The output node of the nearest ancestor of `id` that owns one.
    pub fn host_parent(&self, id: FiberId) -> Option<N> {
        let mut current = self.get(id)?.parent;
        while let Some(parent_id) = current {
            let parent = self.get(parent_id)?;
            if let Some(dom) = &parent.dom {
                return Some(dom.clone());
            }
            current = parent.parent;
        }
        None
    }

    /// Drop every fiber not reachable from `roots` through child and
    /// sibling links. Returns the number of fibers removed.
    pub fn retain_reachable(&mut self, roots: &[FiberId]) -> usize {
        let mut reachable = HashSet::new();
        for &root in roots {
            if self.fibers.contains_key(&root) {
                reachable.insert(root);
                reachable.extend(self.descendants(root));
            }
        }

        let before = self.fibers.len();
        self.fibers.retain(|id, _| reachable.contains(id));
        before - self.fibers.len()
    }
}

impl<N: Clone> Default for FiberArena<N> {
    fn default() -> Self {
        Self::new()
    }
}
