// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional diff of a fiber's previous children against new elements.

use crate::element::{Element, ElementKind};
use crate::engine::Engine;
use crate::fiber::{Effect, Fiber, FiberId};
use crate::host::Host;

impl<H: Host> Engine<H> {
    /// Build the new child fibers of `parent` from `elements`.
    ///
    /// The old children are the sibling chain below `parent`'s alternate. Position
    /// `i` of the old chain is compared with `elements[i]`: equal kinds produce an
    /// `Update` fiber sharing the old node and instance, anything else produces a
    /// `Placement` for the new element and a `Deletion` for the old fiber. There are
    /// no keys, so a reordered list is replaced rather than moved.
    pub(crate) fn reconcile_children(&mut self, parent: FiberId, elements: &[Element]) {
        let mut old = self
            .fibers
            .fiber(parent)
            .alternate
            .and_then(|alt| self.fibers.get(alt))
            .and_then(|alt| alt.child);
        let mut prev: Option<FiberId> = None;
        let mut index = 0;

        while index < elements.len() || old.is_some() {
            let element = elements.get(index);
            let old_id = old.filter(|id| self.fibers.is_alive(*id));
            let old_fiber = old_id.map(|id| self.fibers.fiber(id));
            let next_old = old_fiber.and_then(|f| f.sibling);
            let same_type = matches!(
                (element, old_fiber),
                (Some(element), Some(old_fiber)) if element.kind() == old_fiber.element.kind()
            );

            let new_fiber = match (element, old_id) {
                (Some(element), Some(old_id)) if same_type => {
                    let old_fiber = self.fibers.fiber(old_id);
                    let mut fiber = Fiber::new(element.clone());
                    fiber.node = old_fiber.node.clone();
                    fiber.instance = old_fiber.instance;
                    fiber.alternate = Some(old_id);
                    fiber.effect = Effect::Update;
                    Some(fiber)
                }
                _ => {
                    if let Some(old_id) = old_id {
                        self.fibers.fiber_mut(old_id).effect = Effect::Deletion;
                        self.deletions.push(old_id);
                    }
                    element.map(|element| {
                        let mut fiber = Fiber::new(element.clone());
                        fiber.effect = Effect::Placement;
                        if matches!(element.kind(), ElementKind::Component(_)) {
                            fiber.instance = Some(self.allocate_instance());
                        }
                        fiber
                    })
                }
            };

            if let Some(mut fiber) = new_fiber {
                fiber.parent = Some(parent);
                let id = self.fibers.insert(fiber);
                match prev {
                    None => self.fibers.fiber_mut(parent).child = Some(id),
                    Some(prev) => self.fibers.fiber_mut(prev).sibling = Some(id),
                }
                prev = Some(id);
            }

            old = next_old;
            index += 1;
        }
    }
}
