// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reva: incremental, interruptible tree reconciliation.
//!
//! Reva keeps a host tree (a DOM, a widget tree, a terminal scene) in line with a
//! declarative description of it, without blocking the caller for unbounded periods.
//!
//! - Describe the tree with immutable [`Element`]s: host nodes, text, and [`Component`] functions.
//! - Hand the description to an [`Engine`] with [`Engine::render`].
//! - Give the engine idle time through [`Engine::work_loop`]. It walks the tree one fiber
//!   per unit of work, diffing each fiber's children against the previous committed tree,
//!   and yields when the [`Deadline`] runs low.
//! - When the walk completes, the engine commits: it applies the collected placements,
//!   updates and deletions to the [`Host`] in one uninterrupted step.
//!
//! Components keep local state through [`Hooks::use_state`]. A [`Setter`] queues an update
//! and schedules a new pass; updates stay queued until a pass that includes them commits.
//!
//! ## Reconciliation
//!
//! Children are matched by position and kind. Host elements match by tag, text by being
//! text, and components by the function they run (see [`Component`]). There are no keys: inserting at
//! the front of a list or reordering it replaces nodes rather than moving them.
//!
//! ## Scheduling
//!
//! The engine never waits or sleeps. A host owns the clock and calls [`Engine::work_loop`]
//! with a [`Deadline`] once per idle period, or passes an [`IdleScheduler`] to [`Engine::run`].
//! [`Engine::flush`] completes all pending work with an [`Unbounded`] deadline.
//! State updates that arrive while a pass is in progress restart it by default; see
//! [`UpdatePolicy`].
//!
//! ## Example
//!
//! ```
//! use reva::{Component, Element, Engine, Hooks, Props, children, create_element};
//! # use reva::{EventHandler, Host, NodeKind, PropValue};
//! # #[derive(Default)]
//! # struct Nodes(u32);
//! # impl Host for Nodes {
//! #     type Node = u32;
//! #     fn create_node(&mut self, _: NodeKind<'_>) -> u32 { self.0 += 1; self.0 }
//! #     fn set_property(&mut self, _: &u32, _: &str, _: &PropValue) {}
//! #     fn remove_property(&mut self, _: &u32, _: &str) {}
//! #     fn add_event_listener(&mut self, _: &u32, _: &str, _: &EventHandler) {}
//! #     fn remove_event_listener(&mut self, _: &u32, _: &str, _: &EventHandler) {}
//! #     fn append_child(&mut self, _: &u32, _: &u32) {}
//! #     fn remove_child(&mut self, _: &u32, _: &u32) {}
//! # }
//!
//! fn counter(_: &Props, hooks: &mut Hooks<'_>) -> Element {
//!     let (count, set_count) = hooks.use_state(0_i32);
//!     create_element(
//!         "h1",
//!         Props::new().on("click", move |_| set_count.update(|c| c + 1)),
//!         children!["Count: ", count],
//!     )
//! }
//!
//! let mut host = Nodes::default();
//! let mut engine = Engine::new();
//! engine.render(Element::component(Component::new(counter), Props::new()), 0);
//! engine.flush(&mut host);
//! assert!(engine.is_mounted());
//! ```
//!
//! The `reva_document` crate provides an in-memory document implementing [`Host`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod commit;
mod config;
mod element;
mod engine;
mod fiber;
mod hooks;
mod host;
mod props;
mod reconcile;
mod scheduler;
mod work_loop;

#[cfg(test)]
mod testing;

pub use config::{EngineConfig, UpdatePolicy};
pub use element::{Child, Component, Element, ElementKind, RenderPtr, create_element};
pub use engine::{Engine, EngineStats};
pub use hooks::{HookError, Hooks, Setter};
pub use host::{Host, NodeKind};
pub use props::{
    CHILDREN, EVENT_PREFIX, Event, EventHandler, NODE_VALUE, PropValue, Props, event_name,
    is_event_key, is_plain_key,
};
pub use scheduler::{Deadline, IdleScheduler, SliceQueue, Unbounded, UnitBudget};
pub use work_loop::{LoopStatus, SliceReport};

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
}
