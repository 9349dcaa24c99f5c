// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Idle time slices: the deadline the work loop polls and the scheduler handing them out.

use alloc::collections::VecDeque;
use core::cell::Cell;
use core::time::Duration;

/// Time budget of one idle slice.
///
/// Polled by the work loop before every unit of work.
pub trait Deadline {
    /// Time left in this slice.
    fn time_remaining(&self) -> Duration;
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}

/// A deadline that never runs out.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// A deadline that allows a fixed number of polls, then reports zero.
///
/// Since the work loop polls once before each unit, a budget of `n` admits at
/// most `n` units of work. Useful for deterministic tests and for hosts that
/// measure work in units rather than time.
#[derive(Clone, Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    /// Allow `units` polls.
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Polls left.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        match self.remaining.get() {
            0 => Duration::ZERO,
            n => {
                self.remaining.set(n - 1);
                Duration::MAX
            }
        }
    }
}

/// Source of idle periods.
///
/// The engine is re-entered once per period handed out; see
/// [`Engine::run`](crate::Engine::run). Returning `None` ends the run.
pub trait IdleScheduler {
    /// Deadline type of a period.
    type Deadline: Deadline;

    /// Wait for the next idle period.
    fn next_idle_period(&mut self) -> Option<Self::Deadline>;
}

/// A scheduler replaying a prepared queue of deadlines.
#[derive(Clone, Debug, Default)]
pub struct SliceQueue<D> {
    slices: VecDeque<D>,
}

impl<D> SliceQueue<D> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slices: VecDeque::new(),
        }
    }

    /// Queue one more period.
    pub fn push(&mut self, deadline: D) {
        self.slices.push_back(deadline);
    }

    /// Builder form of [`SliceQueue::push`].
    pub fn with(mut self, deadline: D) -> Self {
        self.push(deadline);
        self
    }

    /// Periods left.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Returns `true` if no periods are left.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl<D: Deadline> IdleScheduler for SliceQueue<D> {
    type Deadline = D;

    fn next_idle_period(&mut self) -> Option<D> {
        self.slices.pop_front()
    }
}

impl<D> FromIterator<D> for SliceQueue<D> {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self {
            slices: iter.into_iter().collect(),
        }
    }
}
