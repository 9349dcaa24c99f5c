// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase: apply a completed pass to the host in one go.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::engine::Engine;
use crate::fiber::{Effect, FiberId};
use crate::host::{Host, update_properties};

impl<H: Host> Engine<H> {
    /// Apply every pending effect of the work-in-progress tree and make it current.
    ///
    /// Deletions go first, then placements and updates in depth-first order. The
    /// previous current tree is released afterwards.
    pub(crate) fn commit_root(&mut self, host: &mut H) {
        let Some(root) = self.wip_root.take() else {
            return;
        };
        let deletions = core::mem::take(&mut self.deletions);
        log::debug!("committing {root:?} with {} deletions", deletions.len());

        for id in deletions {
            self.forget_subtree(id);
            match self.host_parent(id) {
                Some(parent) => self.commit_deletion(host, id, &parent),
                None => log::debug!("deleted fiber {id:?} has no host ancestor"),
            }
        }

        let mut live = HashSet::new();
        let mut cursor = self.fibers.fiber(root).child;
        while let Some(id) = cursor {
            self.commit_work(host, id);
            let fiber = self.fibers.fiber_mut(id);
            if let Some(instance) = fiber.instance {
                live.insert(instance);
                let mut queue = self.queue.borrow_mut();
                for (index, cell) in fiber.hooks.iter_mut().enumerate() {
                    queue.consume((instance, index), core::mem::take(&mut cell.consumed));
                }
                queue.truncate(instance, fiber.hooks.len());
            }
            fiber.effect = Effect::None;
            fiber.alternate = None;
            cursor = self.fibers.next_in_order(id, root);
        }
        self.fibers.fiber_mut(root).alternate = None;

        if let Some(old) = self.current_root.replace(root) {
            let released = self.fibers.free_tree(old);
            log::trace!("released {} fibers of the previous tree", released.len());
        }
        self.queue.borrow_mut().retain_instances(&live);
        self.stats.commits += 1;
    }

    fn commit_work(&self, host: &mut H, id: FiberId) {
        let fiber = self.fibers.fiber(id);
        let Some(node) = &fiber.node else {
            return;
        };
        match fiber.effect {
            Effect::Placement => match self.host_parent(id) {
                Some(parent) => host.append_child(&parent, node),
                None => log::debug!("placed fiber {id:?} has no host ancestor"),
            },
            Effect::Update => {
                let Some(old) = fiber.alternate.and_then(|alt| self.fibers.get(alt)) else {
                    return;
                };
                if !old.element.ptr_eq(&fiber.element) {
                    update_properties(host, node, old.element.props(), fiber.element.props());
                }
            }
            Effect::None | Effect::Deletion => {}
        }
    }

    /// Remove the host nodes of a deleted subtree from `parent`.
    ///
    /// A fiber without a node (a component) stands for its children's nodes.
    fn commit_deletion(&self, host: &mut H, id: FiberId, parent: &H::Node) {
        let fiber = self.fibers.fiber(id);
        if let Some(node) = &fiber.node {
            host.remove_child(parent, node);
            return;
        }
        let mut child = fiber.child;
        while let Some(id) = child {
            self.commit_deletion(host, id, parent);
            child = self.fibers.fiber(id).sibling;
        }
    }

    /// Node of the nearest ancestor that owns one.
    fn host_parent(&self, id: FiberId) -> Option<H::Node> {
        let mut cursor = self.fibers.fiber(id).parent;
        while let Some(parent) = cursor {
            let fiber = self.fibers.fiber(parent);
            if let Some(node) = &fiber.node {
                return Some(node.clone());
            }
            cursor = fiber.parent;
        }
        None
    }

    /// Drop queued updates of every component instance under `id`.
    fn forget_subtree(&self, id: FiberId) {
        let mut instances = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            instances.extend(self.fibers.fiber(current).instance);
            cursor = self.fibers.next_in_order(current, id);
        }
        let mut queue = self.queue.borrow_mut();
        for instance in instances {
            queue.forget(instance);
        }
    }
}
