// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutation log recorded by [`crate::Document`].

use alloc::string::String;
use alloc::vec::Vec;

use reva::PropValue;

use crate::types::{NodeId, NodeType};

bitflags::bitflags! {
    /// Set of mutation kinds, for filtering a [`MutationLog`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MutationKinds: u8 {
        /// [`Mutation::Create`].
        const CREATE          = 0b0000_0001;
        /// [`Mutation::SetProperty`].
        const SET_PROPERTY    = 0b0000_0010;
        /// [`Mutation::RemoveProperty`].
        const REMOVE_PROPERTY = 0b0000_0100;
        /// [`Mutation::AddListener`].
        const ADD_LISTENER    = 0b0000_1000;
        /// [`Mutation::RemoveListener`].
        const REMOVE_LISTENER = 0b0001_0000;
        /// [`Mutation::AppendChild`].
        const APPEND_CHILD    = 0b0010_0000;
        /// [`Mutation::RemoveChild`].
        const REMOVE_CHILD    = 0b0100_0000;
        /// Every change to an existing node's properties or listeners.
        const PROPERTIES = Self::SET_PROPERTY.bits()
            | Self::REMOVE_PROPERTY.bits()
            | Self::ADD_LISTENER.bits()
            | Self::REMOVE_LISTENER.bits();
        /// Every change to the tree structure.
        const STRUCTURE = Self::CREATE.bits() | Self::APPEND_CHILD.bits() | Self::REMOVE_CHILD.bits();
    }
}

/// One host call, as applied to the document.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// A detached node was created.
    Create {
        /// New node.
        node: NodeId,
        /// Its type.
        node_type: NodeType,
    },
    /// A plain property was set.
    SetProperty {
        /// Target node.
        node: NodeId,
        /// Property name.
        key: String,
        /// New value.
        value: PropValue,
    },
    /// A plain property was cleared.
    RemoveProperty {
        /// Target node.
        node: NodeId,
        /// Property name.
        key: String,
    },
    /// A listener was attached.
    AddListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A listener was detached.
    RemoveListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// `child` was appended to `parent`.
    AppendChild {
        /// New parent.
        parent: NodeId,
        /// Appended node.
        child: NodeId,
    },
    /// `child` was removed from `parent` and released.
    RemoveChild {
        /// Former parent.
        parent: NodeId,
        /// Removed node.
        child: NodeId,
    },
}

impl Mutation {
    /// The kind of this mutation.
    pub fn kind(&self) -> MutationKinds {
        match self {
            Self::Create { .. } => MutationKinds::CREATE,
            Self::SetProperty { .. } => MutationKinds::SET_PROPERTY,
            Self::RemoveProperty { .. } => MutationKinds::REMOVE_PROPERTY,
            Self::AddListener { .. } => MutationKinds::ADD_LISTENER,
            Self::RemoveListener { .. } => MutationKinds::REMOVE_LISTENER,
            Self::AppendChild { .. } => MutationKinds::APPEND_CHILD,
            Self::RemoveChild { .. } => MutationKinds::REMOVE_CHILD,
        }
    }

    /// The node the mutation applies to. For structural edits this is the child.
    pub fn node(&self) -> NodeId {
        match self {
            Self::Create { node, .. }
            | Self::SetProperty { node, .. }
            | Self::RemoveProperty { node, .. }
            | Self::AddListener { node, .. }
            | Self::RemoveListener { node, .. } => *node,
            Self::AppendChild { child, .. } | Self::RemoveChild { child, .. } => *child,
        }
    }
}

/// Mutations drained from a document with [`crate::Document::take_mutations`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationLog {
    /// Mutations in the order they were applied.
    pub mutations: Vec<Mutation>,
}

impl MutationLog {
    /// Number of mutations whose kind is in `kinds`.
    pub fn count(&self, kinds: MutationKinds) -> usize {
        self.mutations
            .iter()
            .filter(|m| kinds.contains(m.kind()))
            .count()
    }

    /// Union of the kinds present.
    pub fn kinds(&self) -> MutationKinds {
        self.mutations
            .iter()
            .fold(MutationKinds::empty(), |acc, m| acc | m.kind())
    }

    /// Mutations whose kind is in `kinds`, in order.
    pub fn filter(&self, kinds: MutationKinds) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter().filter(move |m| kinds.contains(m.kind()))
    }

    /// Total number of mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}
