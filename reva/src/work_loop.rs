// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cooperative work loop: one fiber per unit of work, yielding on deadline.

use crate::element::ElementKind;
use crate::engine::Engine;
use crate::fiber::FiberId;
use crate::hooks::{HookCells, HookError, Hooks};
use crate::host::{Host, NodeKind, update_properties};
use crate::props::Props;
use crate::scheduler::{Deadline, IdleScheduler, Unbounded};

/// State of the engine at the end of a slice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    /// Nothing left to do until the next `render` or state update.
    Idle,
    /// The slice ran out; the next slice resumes where this one stopped.
    Suspended,
}

/// Outcome of one [`Engine::work_loop`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SliceReport {
    /// Units of work performed in this slice.
    pub units: usize,
    /// Whether a pass was committed in this slice.
    pub committed: bool,
    /// What is left.
    pub status: LoopStatus,
}

impl<H: Host> Engine<H> {
    /// Run one idle slice.
    ///
    /// Performs units of work until none remain or the deadline reports less than
    /// [`EngineConfig::yield_threshold`](crate::EngineConfig::yield_threshold). The
    /// deadline is polled before every unit. Once the pass has no unit left it is
    /// committed within the same call, regardless of the deadline.
    pub fn work_loop<D: Deadline + ?Sized>(&mut self, host: &mut H, deadline: &D) -> SliceReport {
        self.release_orphans(host);
        self.poll_updates();

        let mut units = 0;
        while let Some(id) = self.next_unit {
            if self.should_yield(deadline, units) {
                log::trace!("yielding after {units} units");
                break;
            }
            self.next_unit = self.perform_unit_of_work(host, id);
            units += 1;
        }
        self.stats.units += units as u64;

        let committed = self.next_unit.is_none() && self.wip_root.is_some();
        if committed {
            self.commit_root(host);
        }

        SliceReport {
            units,
            committed,
            status: if self.has_pending_work() {
                LoopStatus::Suspended
            } else {
                LoopStatus::Idle
            },
        }
    }

    /// Feed every idle period of `scheduler` to [`Engine::work_loop`].
    ///
    /// Returns once the scheduler stops handing out periods. The number of periods
    /// consumed is returned.
    pub fn run<S: IdleScheduler>(&mut self, host: &mut H, scheduler: &mut S) -> usize {
        let mut periods = 0;
        while let Some(deadline) = scheduler.next_idle_period() {
            self.work_loop(host, &deadline);
            periods += 1;
        }
        periods
    }

    /// Work with an unbounded deadline until nothing is pending.
    ///
    /// Returns the number of units performed. Does not return if rendering keeps
    /// requesting state updates.
    pub fn flush(&mut self, host: &mut H) -> usize {
        let mut units = 0;
        loop {
            let report = self.work_loop(host, &Unbounded);
            units += report.units;
            if report.status == LoopStatus::Idle {
                return units;
            }
        }
    }

    fn should_yield<D: Deadline + ?Sized>(&self, deadline: &D, units: usize) -> bool {
        if self
            .config
            .max_units_per_slice
            .is_some_and(|max| units >= max.get())
        {
            return true;
        }
        let remaining = deadline.time_remaining();
        remaining.is_zero() || remaining < self.config.yield_threshold
    }

    /// Process `id` and return the next unit in depth-first order.
    fn perform_unit_of_work(&mut self, host: &mut H, id: FiberId) -> Option<FiberId> {
        log::trace!("unit of work {id:?}");
        let element = self.fibers.fiber(id).element.clone();
        match element.kind() {
            ElementKind::Component(component) => {
                let instance = match self.fibers.fiber(id).instance {
                    Some(instance) => instance,
                    None => {
                        let instance = self.allocate_instance();
                        self.fibers.fiber_mut(id).instance = Some(instance);
                        instance
                    }
                };
                let previous: Option<HookCells> = self
                    .fibers
                    .fiber(id)
                    .alternate
                    .and_then(|alt| self.fibers.get(alt))
                    .map(|alt| alt.hooks.clone());
                let baseline = previous.as_deref().unwrap_or(&[]);

                let mut hooks = Hooks::new(
                    instance,
                    component.name(),
                    baseline,
                    &self.queue,
                    &mut self.diagnostics,
                );
                let child = component.render(element.props(), &mut hooks);
                if previous.is_some() && hooks.cursor() != baseline.len() {
                    hooks.report(HookError::CountMismatch {
                        component: component.name(),
                        previous: baseline.len(),
                        current: hooks.cursor(),
                    });
                }
                let cells = hooks.finish();

                self.fibers.fiber_mut(id).hooks = cells;
                self.reconcile_children(id, core::slice::from_ref(&child));
            }
            ElementKind::Host(_) | ElementKind::Text => {
                if self.fibers.fiber(id).node.is_none() {
                    let kind = match element.kind() {
                        ElementKind::Host(tag) => NodeKind::Element(tag),
                        _ => NodeKind::Text,
                    };
                    let node = host.create_node(kind);
                    update_properties(host, &node, &Props::new(), element.props());
                    self.fibers.fiber_mut(id).node = Some(node);
                }
                self.reconcile_children(id, element.children());
            }
        }
        let root = self.wip_root?;
        self.fibers.next_in_order(id, root)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::element::{Component, Element};
    use crate::scheduler::{SliceQueue, UnitBudget};
    use crate::testing::{Call, RecordingHost};
    use crate::{EngineConfig, children, create_element};

    fn list(n: usize) -> Element {
        let items = (0..n).map(|i| Element::text(i as i64)).collect::<alloc::vec::Vec<_>>();
        create_element("ul", Props::new(), vec![items.into()])
    }

    #[test]
    fn zero_budget_does_nothing() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::new();
        engine.render(list(2), container);
        let report = engine.work_loop(&mut host, &UnitBudget::new(0));
        assert_eq!(report.units, 0);
        assert_eq!(report.status, LoopStatus::Suspended);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn budget_bounds_units_and_resumes() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::new();
        // root, ul, three text nodes
        engine.render(list(3), container);

        let first = engine.work_loop(&mut host, &UnitBudget::new(2));
        assert_eq!(first.units, 2);
        assert!(!first.committed);
        assert!(host.calls.iter().all(|c| !matches!(c, Call::Append(..))));

        let second = engine.work_loop(&mut host, &UnitBudget::new(2));
        assert_eq!(second.units, 2);
        assert!(!second.committed);

        let third = engine.work_loop(&mut host, &UnitBudget::new(2));
        assert_eq!(third.units, 1);
        assert!(third.committed);
        assert_eq!(third.status, LoopStatus::Idle);
        assert_eq!(engine.stats().units, 5);
        assert_eq!(host.calls.iter().filter(|c| c.is_create()).count(), 4);
    }

    #[test]
    fn sliced_run_matches_unbounded_run() {
        let element = create_element(
            "div",
            Props::new().with("id", "app"),
            children![list(2), "tail", create_element("p", Props::new(), children![1, 2])],
        );

        let mut sliced_host = RecordingHost::default();
        let container = sliced_host.container();
        let mut sliced = Engine::new();
        sliced.render(element.clone(), container);
        let mut slices: SliceQueue<UnitBudget> = (0..20).map(|_| UnitBudget::new(1)).collect();
        sliced.run(&mut sliced_host, &mut slices);

        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::new();
        engine.render(element, container);
        engine.flush(&mut host);

        assert!(sliced.is_idle());
        assert_eq!(sliced_host.calls, host.calls);
    }

    #[test]
    fn unit_cap_applies_without_deadline_pressure() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::with_config(EngineConfig::default().with_max_units_per_slice(1));
        engine.render(list(1), container);
        assert_eq!(engine.work_loop(&mut host, &Unbounded).units, 1);
        assert_eq!(engine.flush(&mut host), 2);
    }

    #[test]
    fn zero_unit_cap_still_makes_progress() {
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::with_config(EngineConfig::default().with_max_units_per_slice(0));
        // root, ul, two text nodes
        engine.render(list(2), container);
        assert_eq!(engine.work_loop(&mut host, &Unbounded).units, 1);
        assert_eq!(engine.flush(&mut host), 3);
        assert!(engine.is_mounted());
    }

    #[test]
    fn hook_count_change_is_diagnosed() {
        fn flaky(props: &Props, hooks: &mut Hooks<'_>) -> Element {
            hooks.use_state(0_u8);
            if props.contains_key("extra") {
                hooks.use_state(0_u8);
            }
            Element::host("div")
        }
        let mut host = RecordingHost::default();
        let container = host.container();
        let mut engine = Engine::new();
        engine.render(Element::component(Component::new(flaky), Props::new()), container);
        engine.flush(&mut host);
        assert!(engine.take_diagnostics().is_empty());

        engine.render(
            Element::component(Component::new(flaky), Props::new().with("extra", true)),
            container,
        );
        engine.flush(&mut host);
        assert!(matches!(
            engine.take_diagnostics().as_slice(),
            [HookError::CountMismatch {
                previous: 1,
                current: 2,
                ..
            }]
        ));
    }
}
