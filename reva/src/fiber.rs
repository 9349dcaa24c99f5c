// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber storage: a generational arena of linked work-tree nodes.
//!
//! Fibers link to each other through [`FiberId`] handles: `child` points at the first
//! child, `sibling` at the next sibling, `parent` back up. Freeing a tree bumps the
//! generation of its slots, so handles into a released tree (for example the
//! `alternate` links of a freshly committed tree) resolve to nothing.

use alloc::vec::Vec;

use crate::element::Element;
use crate::hooks::{HookCells, InstanceId};

/// Identifier for a fiber in the arena (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct FiberId(u32, u32);

impl FiberId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Pending host mutation of a fiber.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Effect {
    #[default]
    None,
    Placement,
    Update,
    Deletion,
}

#[derive(Clone, Debug)]
pub(crate) struct Fiber<N> {
    generation: u32,
    pub(crate) element: Element,
    /// Host node; only host and text fibers own one.
    pub(crate) node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Effect,
    pub(crate) hooks: HookCells,
    /// Component instance identity, carried across generations.
    pub(crate) instance: Option<InstanceId>,
}

impl<N> Fiber<N> {
    pub(crate) fn new(element: Element) -> Self {
        Self {
            generation: 0,
            element,
            node: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: Effect::None,
            hooks: HookCells::new(),
            instance: None,
        }
    }
}

pub(crate) struct FiberArena<N> {
    /// slots
    fibers: Vec<Option<Fiber<N>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<N> core::fmt::Debug for FiberArena<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FiberArena")
            .field("slots", &self.fibers.len())
            .field("alive", &self.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<N> FiberArena<N> {
    pub(crate) fn new() -> Self {
        Self {
            fibers: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, mut fiber: Fiber<N>) -> FiberId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.fibers.push(None);
            self.generations.push(1);
            (self.fibers.len() - 1, 1)
        };
        fiber.generation = generation;
        self.fibers[idx] = Some(fiber);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "FiberId uses 32-bit indices by design."
        )]
        FiberId(idx as u32, generation)
    }

    pub(crate) fn is_alive(&self, id: FiberId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers
            .get(id.idx())?
            .as_ref()
            .filter(|f| f.generation == id.1)
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers
            .get_mut(id.idx())?
            .as_mut()
            .filter(|f| f.generation == id.1)
    }

    /// Access a fiber; panics if `id` is stale.
    pub(crate) fn fiber(&self, id: FiberId) -> &Fiber<N> {
        self.get(id).expect("dangling FiberId")
    }

    /// Access a fiber mutably; panics if `id` is stale.
    pub(crate) fn fiber_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        self.get_mut(id).expect("dangling FiberId")
    }

    /// Number of live fibers.
    pub(crate) fn len(&self) -> usize {
        self.fibers.len() - self.free_list.len()
    }

    /// Next fiber in depth-first pre-order, staying inside the subtree of `root`.
    pub(crate) fn next_in_order(&self, current: FiberId, root: FiberId) -> Option<FiberId> {
        if let Some(child) = self.get(current)?.child {
            return Some(child);
        }
        let mut node = current;
        while node != root {
            let fiber = self.get(node)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            node = fiber.parent?;
        }
        None
    }

    /// Release `root` and every fiber below it, and return the fibers of the subtree.
    pub(crate) fn free_tree(&mut self, root: FiberId) -> Vec<Fiber<N>> {
        let mut ids = Vec::new();
        let mut cursor = Some(root);
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.next_in_order(id, root);
        }
        ids.into_iter()
            .filter_map(|id| {
                let fiber = self.fibers.get_mut(id.idx())?.take()?;
                self.free_list.push(id.idx());
                Some(fiber)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(arena: &mut FiberArena<u32>, parent: Option<FiberId>) -> FiberId {
        let mut fiber = Fiber::new(Element::host("x"));
        fiber.parent = parent;
        arena.insert(fiber)
    }

    /// root -> [a -> [a1, a2], b]
    fn sample(arena: &mut FiberArena<u32>) -> [FiberId; 5] {
        let root = leaf(arena, None);
        let a = leaf(arena, Some(root));
        let b = leaf(arena, Some(root));
        let a1 = leaf(arena, Some(a));
        let a2 = leaf(arena, Some(a));
        arena.fiber_mut(root).child = Some(a);
        arena.fiber_mut(a).sibling = Some(b);
        arena.fiber_mut(a).child = Some(a1);
        arena.fiber_mut(a1).sibling = Some(a2);
        [root, a, b, a1, a2]
    }

    #[test]
    fn depth_first_pre_order() {
        let mut arena = FiberArena::new();
        let [root, a, b, a1, a2] = sample(&mut arena);
        let mut order = Vec::new();
        let mut cursor = Some(root);
        while let Some(id) = cursor {
            order.push(id);
            cursor = arena.next_in_order(id, root);
        }
        assert_eq!(order, [root, a, a1, a2, b]);
    }

    #[test]
    fn traversal_stays_inside_subtree() {
        let mut arena = FiberArena::new();
        let [_, a, _, a1, a2] = sample(&mut arena);
        assert_eq!(arena.next_in_order(a, a), Some(a1));
        assert_eq!(arena.next_in_order(a1, a), Some(a2));
        assert_eq!(arena.next_in_order(a2, a), None);
    }

    #[test]
    fn free_tree_makes_handles_stale_and_reuses_slots() {
        let mut arena = FiberArena::new();
        let [root, a, b, a1, a2] = sample(&mut arena);
        let freed = arena.free_tree(a);
        assert_eq!(freed.len(), 3);
        assert!(arena.is_alive(root));
        assert!(arena.is_alive(b));
        assert!(!arena.is_alive(a) && !arena.is_alive(a1) && !arena.is_alive(a2));
        assert_eq!(arena.len(), 2);

        let reused = leaf(&mut arena, None);
        assert!(arena.is_alive(reused));
        assert!(!arena.is_alive(a) && !arena.is_alive(a1) && !arena.is_alive(a2));
        assert_ne!(reused, a);
    }
}
