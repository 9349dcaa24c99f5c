// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host that records every call, for unit tests.

use alloc::string::String;
use alloc::vec::Vec;

use crate::host::{Host, NodeKind};
use crate::props::{EventHandler, PropValue};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Create(u32, String),
    SetProperty(u32, String, PropValue),
    RemoveProperty(u32, String),
    AddListener(u32, String, EventHandler),
    RemoveListener(u32, String, EventHandler),
    Append(u32, u32),
    Remove(u32, u32),
    Discard(u32),
}

impl Call {
    pub(crate) fn is_create(&self) -> bool {
        matches!(self, Self::Create(..))
    }
}

/// Nodes are numbered in creation order; node `0` is whatever the test creates first.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    next: u32,
    pub(crate) calls: Vec<Call>,
}

impl RecordingHost {
    /// A container node created outside the call log.
    pub(crate) fn container(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub(crate) fn take(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }
}

impl Host for RecordingHost {
    type Node = u32;

    fn create_node(&mut self, kind: NodeKind<'_>) -> u32 {
        let id = self.next;
        self.next += 1;
        let tag = match kind {
            NodeKind::Element(tag) => tag.into(),
            NodeKind::Text => "#text".into(),
        };
        self.calls.push(Call::Create(id, tag));
        id
    }

    fn set_property(&mut self, node: &u32, key: &str, value: &PropValue) {
        self.calls
            .push(Call::SetProperty(*node, key.into(), value.clone()));
    }

    fn remove_property(&mut self, node: &u32, key: &str) {
        self.calls.push(Call::RemoveProperty(*node, key.into()));
    }

    fn add_event_listener(&mut self, node: &u32, event: &str, handler: &EventHandler) {
        self.calls
            .push(Call::AddListener(*node, event.into(), handler.clone()));
    }

    fn remove_event_listener(&mut self, node: &u32, event: &str, handler: &EventHandler) {
        self.calls
            .push(Call::RemoveListener(*node, event.into(), handler.clone()));
    }

    fn append_child(&mut self, parent: &u32, child: &u32) {
        self.calls.push(Call::Append(*parent, *child));
    }

    fn remove_child(&mut self, parent: &u32, child: &u32) {
        self.calls.push(Call::Remove(*parent, *child));
    }

    fn discard_node(&mut self, node: &u32) {
        self.calls.push(Call::Discard(*node));
    }
}
