// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reva Document: an in-memory host tree for the Reva reconciler.
//!
//! [`Document`] implements [`reva::Host`] over a generational node arena, so an
//! [`Engine`](reva::Engine) can render into it without a browser or a toolkit. It is
//! meant for tests, demos, and headless tools.
//!
//! - Nodes are addressed by [`NodeId`], a generational handle. Removing a node makes its
//!   id (and the ids of its subtree) stale.
//! - Every host call is recorded as a [`Mutation`]; [`Document::take_mutations`] drains
//!   them into a [`MutationLog`] that can be filtered by [`MutationKinds`].
//! - [`Document::dispatch_event`] delivers an [`Event`](reva::Event) to a node's listeners
//!   and bubbles it up through its ancestors.
//! - [`Document::to_markup`] and [`Document::text_content`] serialize a subtree.
//!
//! Host calls are best effort: a call naming a stale node is skipped and logged at
//! `debug` level. Removing a child releases its whole subtree.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
mod mutation;
mod types;

pub use document::Document;
pub use mutation::{Mutation, MutationKinds, MutationLog};
pub use types::{DocumentError, NodeId, NodeType};
