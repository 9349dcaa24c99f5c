// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine state: current and work-in-progress trees, and the pending-updates table.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::config::{EngineConfig, UpdatePolicy};
use crate::element::Element;
use crate::fiber::{Effect, Fiber, FiberArena, FiberId};
use crate::hooks::{HookError, InstanceId, SharedQueue, UpdateQueue};
use crate::host::Host;
use crate::props::Props;

/// Tag of the synthetic root fiber that owns the container node.
pub(crate) const ROOT_TAG: &str = "#root";

/// Counters accumulated over the lifetime of an [`Engine`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Units of work performed.
    pub units: u64,
    /// Passes committed.
    pub commits: u64,
    /// Passes discarded before they could commit.
    pub discarded: u64,
}

/// A reconciliation engine for one container.
///
/// The engine owns the last committed fiber tree ("current") and at most one
/// tree under construction ("work in progress"). It is single-threaded: hook
/// setters share the engine's pending-updates table through `Rc`.
///
/// Work only happens inside [`Engine::work_loop`], which a host calls once per
/// idle period. [`Engine::run`] and [`Engine::flush`] are drivers around it.
pub struct Engine<H: Host> {
    pub(crate) config: EngineConfig,
    pub(crate) fibers: FiberArena<H::Node>,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) queue: SharedQueue,
    pub(crate) diagnostics: Vec<HookError>,
    pub(crate) stats: EngineStats,
    /// Nodes created by discarded passes, released at the start of the next slice.
    orphans: Vec<H::Node>,
    next_instance: u64,
}

impl<H: Host> core::fmt::Debug for Engine<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("fibers", &self.fibers)
            .field("current_root", &self.current_root)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .field("deletions", &self.deletions.len())
            .field("queue", &self.queue.borrow())
            .field("stats", &self.stats)
            .field("orphans", &self.orphans.len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Default for Engine<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Engine<H> {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            fibers: FiberArena::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            queue: Rc::new(RefCell::new(UpdateQueue::default())),
            diagnostics: Vec::new(),
            stats: EngineStats::default(),
            orphans: Vec::new(),
            next_instance: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schedule rendering `element` into `container`.
    ///
    /// Nothing is computed until the next [`Engine::work_loop`]. The committed tree
    /// of a previous `render` is the diff baseline. A pass still in progress is
    /// discarded and replaced. The new pass renders every component again, so it
    /// also picks up all queued state updates.
    pub fn render(&mut self, element: Element, container: H::Node) {
        if let Some(wip) = self.wip_root.take() {
            log::debug!("render replaces an in-progress pass");
            self.discard_wip(wip);
        }
        self.queue.borrow_mut().take_rerender();
        let mut props = Props::new();
        props.set_children(vec![element]);
        self.start_pass(Element::new(ROOT_TAG, props), container);
    }

    /// Returns `true` if there is no pass in progress and no state update pending.
    pub fn is_idle(&self) -> bool {
        self.wip_root.is_none() && !self.queue.borrow().rerender_requested()
    }

    /// Returns `true` if a later [`Engine::work_loop`] has something to do.
    pub fn has_pending_work(&self) -> bool {
        !self.is_idle()
    }

    /// Returns `true` if a tree has been committed.
    pub fn is_mounted(&self) -> bool {
        self.current_root.is_some()
    }

    /// Number of state updates queued and not yet committed.
    pub fn pending_updates(&self) -> usize {
        self.queue.borrow().pending_len()
    }

    /// Number of fibers currently held, across the current and in-progress trees.
    pub fn live_fibers(&self) -> usize {
        self.fibers.len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Hook contract violations recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<HookError> {
        core::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn allocate_instance(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    /// Build a new root fiber and make it the next unit of work.
    fn start_pass(&mut self, element: Element, container: H::Node) {
        let mut root = Fiber::new(element);
        root.node = Some(container);
        root.alternate = self.current_root;
        let id = self.fibers.insert(root);
        self.deletions.clear();
        self.wip_root = Some(id);
        self.next_unit = Some(id);
        log::debug!("starting pass at {id:?}");
    }

    /// Hand nodes of discarded passes back to the host.
    pub(crate) fn release_orphans(&mut self, host: &mut H) {
        for node in self.orphans.drain(..) {
            host.discard_node(&node);
        }
    }

    /// Start a pass for queued state updates, honoring the update policy.
    pub(crate) fn poll_updates(&mut self) {
        if !self.queue.borrow().rerender_requested() {
            return;
        }
        if self.wip_root.is_some() && self.config.update_policy == UpdatePolicy::Coalesce {
            return;
        }
        self.queue.borrow_mut().take_rerender();

        // An in-progress pass already describes the latest requested tree.
        let Some(source) = self.wip_root.or(self.current_root) else {
            return;
        };
        let source = self.fibers.fiber(source);
        let element = source.element.clone();
        let Some(container) = source.node.clone() else {
            return;
        };
        if let Some(wip) = self.wip_root.take() {
            log::debug!("state update restarts the in-progress pass");
            self.discard_wip(wip);
        }
        self.start_pass(element, container);
    }

    /// Drop an uncommitted tree. Nodes it created become orphans.
    fn discard_wip(&mut self, wip: FiberId) {
        for id in core::mem::take(&mut self.deletions) {
            if let Some(fiber) = self.fibers.get_mut(id) {
                fiber.effect = Effect::None;
            }
        }
        for fiber in self.fibers.free_tree(wip) {
            if fiber.effect == Effect::Placement
                && let Some(node) = fiber.node
            {
                self.orphans.push(node);
            }
        }
        self.next_unit = None;
        self.stats.discarded += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::UnitBudget;
    use crate::testing::{Call, RecordingHost};

    #[test]
    fn render_schedules_a_root_pass() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine: Engine<RecordingHost> = Engine::new();
        assert!(engine.is_idle());
        engine.render(Element::host("div"), container);
        assert!(engine.has_pending_work());
        assert!(!engine.is_mounted());
        assert_eq!(engine.live_fibers(), 1);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn second_render_replaces_the_pending_pass() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine: Engine<RecordingHost> = Engine::new();
        engine.render(Element::host("div"), container);
        engine.render(Element::host("span"), container);
        assert_eq!(engine.live_fibers(), 1);
        assert_eq!(engine.stats().discarded, 1);
    }

    #[test]
    fn replaced_pass_hands_created_nodes_back() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::new();
        engine.render(Element::new("div", Props::new().child(Element::host("p"))), container);
        // root, then the div, which creates node 1; the p is still pending
        engine.work_loop(&mut host, &UnitBudget::new(2));
        engine.render(Element::host("span"), container);
        engine.flush(&mut host);
        assert_eq!(
            host.take(),
            vec![
                Call::Create(1, "div".into()),
                Call::Discard(1),
                Call::Create(2, "span".into()),
                Call::Append(container, 2),
            ]
        );
    }
}
