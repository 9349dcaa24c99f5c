// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document: node identifiers, node types, and errors.

use alloc::string::String;

/// Identifier for a node in the document (generational).
///
/// A removed node's id goes stale; its slot may be reused by a later node with a
/// higher generation, so stale ids never alias live nodes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeType {
    /// An element with a tag.
    Element(String),
    /// A text node; its content is the `nodeValue` property.
    Text,
}

impl NodeType {
    /// The tag of an element node.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(tag) => Some(tag),
            Self::Text => None,
        }
    }
}

/// Failures of the checked document queries.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The id refers to a removed node.
    #[error("node {0:?} is not alive")]
    StaleNode(NodeId),
}
