// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hook state: ordered per-instance state cells and their setters.
//!
//! A component receives a [`Hooks`] context while it is rendered. Each call to
//! [`Hooks::use_state`] claims the next cell by position, so a component must make
//! the same hook calls in the same order on every render. The engine reports a
//! change in hook count or in the state type at a position as a [`HookError`].
//!
//! Setters never touch the cell they were handed out with. They push an update into
//! a pending-updates table owned by the engine, keyed by component instance and hook
//! index, and request a new pass. The next render of that instance folds the queued
//! updates into the committed value, and the updates leave the table only when that
//! render commits.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// Stable identity of a mounted component instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct InstanceId(pub(crate) u64);

type UpdateKey = (InstanceId, usize);
type ErasedUpdate = Rc<dyn Fn(&dyn Any) -> Option<Box<dyn Any>>>;

/// One state cell as of a render.
#[derive(Clone, Debug)]
pub(crate) struct HookCell {
    pub(crate) value: Rc<dyn Any>,
    /// Number of queued updates folded into `value`; removed from the queue on commit.
    pub(crate) consumed: usize,
}

pub(crate) type HookCells = SmallVec<[HookCell; 4]>;

/// Pending state updates, shared between the engine and every setter it handed out.
#[derive(Default)]
pub(crate) struct UpdateQueue {
    pending: HashMap<UpdateKey, VecDeque<ErasedUpdate>>,
    rerender: bool,
}

pub(crate) type SharedQueue = Rc<RefCell<UpdateQueue>>;

impl UpdateQueue {
    fn push(&mut self, key: UpdateKey, update: ErasedUpdate) {
        self.pending.entry(key).or_default().push_back(update);
        self.rerender = true;
    }

    fn snapshot(&self, key: UpdateKey) -> Vec<ErasedUpdate> {
        self.pending
            .get(&key)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop the first `count` updates for `key`.
    pub(crate) fn consume(&mut self, key: UpdateKey, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(queue) = self.pending.get_mut(&key) {
            let n = count.min(queue.len());
            queue.drain(..n);
            if queue.is_empty() {
                self.pending.remove(&key);
            }
        }
    }

    /// Drop all updates of an unmounted instance.
    pub(crate) fn forget(&mut self, instance: InstanceId) {
        self.pending.retain(|(owner, _), _| *owner != instance);
    }

    /// Drop updates of `instance` aimed at hook positions `len` and beyond.
    pub(crate) fn truncate(&mut self, instance: InstanceId, len: usize) {
        self.pending
            .retain(|(owner, index), _| *owner != instance || *index < len);
    }

    /// Drop updates whose instance is not in `live`.
    pub(crate) fn retain_instances(&mut self, live: &HashSet<InstanceId>) {
        self.pending.retain(|(owner, _), _| live.contains(owner));
    }

    pub(crate) fn rerender_requested(&self) -> bool {
        self.rerender
    }

    pub(crate) fn take_rerender(&mut self) -> bool {
        core::mem::take(&mut self.rerender)
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }
}

impl fmt::Debug for UpdateQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.pending_len())
            .field("rerender", &self.rerender)
            .finish()
    }
}

/// A violation of the hook call-order contract.
///
/// These are diagnostics: the engine keeps rendering, but the state of the
/// affected instance may be wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    /// The instance called a different number of hooks than in its previous render.
    #[error("`{component}` called {current} hooks, but {previous} in its previous render")]
    CountMismatch {
        /// Component type name.
        component: &'static str,
        /// Hook count of the previous render.
        previous: usize,
        /// Hook count of this render.
        current: usize,
    },
    /// The state at a position has a different type than in the previous render.
    #[error("`{component}` hook #{index} is no longer a `{expected}`; state was reset")]
    TypeMismatch {
        /// Component type name.
        component: &'static str,
        /// Hook position.
        index: usize,
        /// Type requested by this render.
        expected: &'static str,
    },
}

/// Hook context handed to a component while it renders.
pub struct Hooks<'a> {
    instance: InstanceId,
    component: &'static str,
    previous: &'a [HookCell],
    cells: HookCells,
    cursor: usize,
    queue: &'a SharedQueue,
    errors: &'a mut Vec<HookError>,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        instance: InstanceId,
        component: &'static str,
        previous: &'a [HookCell],
        queue: &'a SharedQueue,
        errors: &'a mut Vec<HookError>,
    ) -> Self {
        Self {
            instance,
            component,
            previous,
            cells: HookCells::new(),
            cursor: 0,
            queue,
            errors,
        }
    }

    /// Local state, seeded with `initial` on first render.
    ///
    /// Returns the current value and a setter. Queued updates are applied in the
    /// order they were made.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Setter<T>) {
        self.use_state_with(|| initial)
    }

    /// Like [`Hooks::use_state`], but the initial value is computed only when needed.
    pub fn use_state_with<T, F>(&mut self, init: F) -> (T, Setter<T>)
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let index = self.cursor;
        self.cursor += 1;
        let key = (self.instance, index);
        let previous = self.previous;

        let mut state = match previous.get(index) {
            Some(cell) => match cell.value.downcast_ref::<T>() {
                Some(value) => value.clone(),
                None => {
                    self.report(HookError::TypeMismatch {
                        component: self.component,
                        index,
                        expected: core::any::type_name::<T>(),
                    });
                    init()
                }
            },
            None => init(),
        };

        let updates = self.queue.borrow().snapshot(key);
        for update in &updates {
            match update(&state as &dyn Any).map(|next| next.downcast::<T>()) {
                Some(Ok(next)) => state = *next,
                _ => log::debug!("dropping a state update of the wrong type for `{}`", self.component),
            }
        }

        self.cells.push(HookCell {
            value: Rc::new(state.clone()),
            consumed: updates.len(),
        });

        let setter = Setter {
            key,
            queue: Rc::downgrade(self.queue),
            marker: PhantomData,
        };
        (state, setter)
    }

    /// Number of hooks called so far in this render.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn report(&mut self, error: HookError) {
        log::warn!("{error}");
        self.errors.push(error);
    }

    pub(crate) fn finish(self) -> HookCells {
        self.cells
    }
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("component", &self.component)
            .field("cursor", &self.cursor)
            .field("previous", &self.previous.len())
            .finish_non_exhaustive()
    }
}

/// Queues updates for one state cell.
///
/// Setters can be called from anywhere on the rendering thread, including event
/// handlers. Each call requests a new pass; calls made after the engine was dropped
/// are ignored.
pub struct Setter<T> {
    key: UpdateKey,
    queue: Weak<RefCell<UpdateQueue>>,
    marker: PhantomData<fn(T) -> T>,
}

impl<T: 'static> Setter<T> {
    /// Queue `f`, applied to the state as of the next render.
    ///
    /// `f` may run more than once if a pass is discarded before it commits, so it
    /// should be a pure function of its input.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        let Some(queue) = self.queue.upgrade() else {
            log::debug!("state update after the engine was dropped");
            return;
        };
        let update: ErasedUpdate = Rc::new(move |value: &dyn Any| {
            value
                .downcast_ref::<T>()
                .map(|v| Box::new(f(v)) as Box<dyn Any>)
        });
        queue.borrow_mut().push(self.key, update);
    }

    /// Replace the state.
    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        self.update(move |_| value.clone());
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            queue: self.queue.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("instance", &self.key.0)
            .field("index", &self.key.1)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn queue() -> SharedQueue {
        Rc::new(RefCell::new(UpdateQueue::default()))
    }

    #[test]
    fn first_render_uses_initial_value() {
        let queue = queue();
        let mut errors = Vec::new();
        let mut hooks = Hooks::new(InstanceId(1), "c", &[], &queue, &mut errors);
        let (a, _) = hooks.use_state(5_i32);
        let (b, _) = hooks.use_state_with(|| "x");
        assert_eq!((a, b), (5, "x"));
        assert_eq!(hooks.cursor(), 2);
        let cells = hooks.finish();
        assert_eq!(cells.len(), 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn queued_updates_apply_in_order_and_stay_until_consumed() {
        let queue = queue();
        let mut errors = Vec::new();
        let previous = vec![HookCell {
            value: Rc::new(1_i32),
            consumed: 0,
        }];

        let setter = {
            let mut hooks = Hooks::new(InstanceId(7), "c", &previous, &queue, &mut errors);
            hooks.use_state(0_i32).1
        };
        setter.update(|c| c + 1);
        setter.update(|c| c * 10);
        assert!(queue.borrow().rerender_requested());

        let mut hooks = Hooks::new(InstanceId(7), "c", &previous, &queue, &mut errors);
        let (value, _) = hooks.use_state(0_i32);
        assert_eq!(value, 20);
        let cells = hooks.finish();
        assert_eq!(cells[0].consumed, 2);
        assert_eq!(queue.borrow().pending_len(), 2);

        queue.borrow_mut().consume((InstanceId(7), 0), cells[0].consumed);
        assert_eq!(queue.borrow().pending_len(), 0);
    }

    #[test]
    fn type_change_is_reported_and_resets_state() {
        let queue = queue();
        let mut errors = Vec::new();
        let previous = vec![HookCell {
            value: Rc::new(1_i32),
            consumed: 0,
        }];
        let mut hooks = Hooks::new(InstanceId(1), "c", &previous, &queue, &mut errors);
        let (value, _) = hooks.use_state(false);
        assert!(!value);
        drop(hooks);
        assert!(matches!(
            errors.as_slice(),
            [HookError::TypeMismatch { index: 0, .. }]
        ));
    }

    #[test]
    fn setter_outliving_queue_is_a_no_op() {
        let queue = queue();
        let mut errors = Vec::new();
        let setter = {
            let mut hooks = Hooks::new(InstanceId(1), "c", &[], &queue, &mut errors);
            hooks.use_state(0_u8).1
        };
        let weak = Rc::downgrade(&queue);
        drop(queue);
        setter.set(3);
        setter.update(|v| v + 1);
        assert!(weak.upgrade().is_none());
        assert!(setter.queue.upgrade().is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn truncate_drops_positions_past_the_hook_count() {
        let queue = queue();
        let noop: ErasedUpdate = Rc::new(|_: &dyn Any| -> Option<Box<dyn Any>> { None });
        let mut q = queue.borrow_mut();
        q.push((InstanceId(1), 0), noop.clone());
        q.push((InstanceId(1), 1), noop.clone());
        q.push((InstanceId(1), 2), noop.clone());
        q.push((InstanceId(2), 1), noop);
        q.truncate(InstanceId(1), 1);
        assert_eq!(q.pending_len(), 2);
        assert!(q.pending.contains_key(&(InstanceId(1), 0)));
        assert!(q.pending.contains_key(&(InstanceId(2), 1)));
    }

    #[test]
    fn forget_and_retain_drop_instances() {
        let queue = queue();
        let noop: ErasedUpdate = Rc::new(|_: &dyn Any| -> Option<Box<dyn Any>> { None });
        {
            let mut q = queue.borrow_mut();
            q.push((InstanceId(1), 0), noop.clone());
            q.push((InstanceId(2), 0), noop.clone());
            q.push((InstanceId(3), 1), noop);
            q.forget(InstanceId(1));
            let live: HashSet<InstanceId> = [InstanceId(2)].into_iter().collect();
            q.retain_instances(&live);
        }
        assert_eq!(queue.borrow().pending_len(), 1);
        assert!(queue.borrow_mut().take_rerender());
        assert!(!queue.borrow().rerender_requested());
    }
}
