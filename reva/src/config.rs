// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use core::num::NonZeroUsize;
use core::time::Duration;

/// What to do when state changes while a pass is still being built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Discard the in-progress pass and start over from the latest requested tree.
    ///
    /// Work already done for the discarded pass is lost. Queued state updates are
    /// not: they stay pending until a pass that includes them commits.
    #[default]
    Restart,
    /// Let the in-progress pass commit, then start a follow-up pass.
    Coalesce,
}

/// Tuning knobs for an [`Engine`](crate::Engine).
///
/// ```
/// use core::num::NonZeroUsize;
/// use core::time::Duration;
/// use reva::{EngineConfig, UpdatePolicy};
///
/// let config = EngineConfig::default()
///     .with_yield_threshold(Duration::from_micros(500))
///     .with_update_policy(UpdatePolicy::Coalesce)
///     .with_max_units_per_slice(64);
/// assert_eq!(config.max_units_per_slice, NonZeroUsize::new(64));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// The work loop yields once the deadline reports less than this much time left.
    pub yield_threshold: Duration,
    /// Handling of state updates that arrive mid-pass.
    pub update_policy: UpdatePolicy,
    /// Optional cap on units of work per slice, independent of the deadline.
    pub max_units_per_slice: Option<NonZeroUsize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            update_policy: UpdatePolicy::default(),
            max_units_per_slice: None,
        }
    }
}

impl EngineConfig {
    /// Set [`EngineConfig::yield_threshold`].
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    /// Set [`EngineConfig::update_policy`].
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Set [`EngineConfig::max_units_per_slice`].
    ///
    /// A slice always gets to perform at least one unit, so `0` is treated as `1`.
    pub fn with_max_units_per_slice(mut self, max: usize) -> Self {
        self.max_units_per_slice = Some(NonZeroUsize::new(max).unwrap_or(NonZeroUsize::MIN));
        self
    }
}
