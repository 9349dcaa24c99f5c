// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host mutation interface and host property reconciliation.

use core::fmt::Debug;

use crate::props::{EventHandler, PropValue, Props, event_name};

/// Kind of host node to create.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// An element node with a tag.
    Element(&'a str),
    /// A text node.
    Text,
}

/// The environment owning the real nodes.
///
/// The engine calls these methods only from [`Engine::work_loop`](crate::Engine::work_loop):
/// `create_node` while building a pass, everything else while committing one.
/// Implementations are expected to be best effort; none of the methods can fail.
pub trait Host {
    /// Handle to a host node.
    type Node: Clone + PartialEq + Debug;

    /// Create a detached node.
    fn create_node(&mut self, kind: NodeKind<'_>) -> Self::Node;

    /// Set a plain property.
    fn set_property(&mut self, node: &Self::Node, key: &str, value: &PropValue);

    /// Reset a plain property to its empty value.
    fn remove_property(&mut self, node: &Self::Node, key: &str);

    /// Attach a listener for `event`.
    fn add_event_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Detach a listener previously attached for `event`.
    fn remove_event_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Remove `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Release a node that was created for a pass that never committed.
    ///
    /// The node was never attached. The default does nothing.
    fn discard_node(&mut self, node: &Self::Node) {
        let _ = node;
    }
}

/// Apply the property and listener difference between `prev` and `next` to `node`.
///
/// Order: stale listeners are detached, new listeners attached, removed plain
/// properties cleared, then new or changed plain properties set. Handlers compare
/// by identity; plain values by `==`.
pub(crate) fn update_properties<H: Host + ?Sized>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
) {
    for (key, value) in prev.events() {
        if next.get(key) == Some(value) {
            continue;
        }
        if let (Some(name), Some(handler)) = (event_name(key), value.as_handler()) {
            host.remove_event_listener(node, &name, handler);
        }
    }

    for (key, value) in next.events() {
        if prev.get(key) == Some(value) {
            continue;
        }
        match (event_name(key), value.as_handler()) {
            (Some(name), Some(handler)) => host.add_event_listener(node, &name, handler),
            _ => log::warn!("ignoring `{key}`: event props must hold a handler"),
        }
    }

    for (key, _) in prev.attributes() {
        if !next.contains_key(key) {
            host.remove_property(node, key);
        }
    }

    for (key, value) in next.attributes() {
        if prev.get(key) != Some(value) {
            host.set_property(node, key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingHost};
    use alloc::vec;

    fn diff(prev: &Props, next: &Props) -> alloc::vec::Vec<Call> {
        let mut host = RecordingHost::default();
        let node = host.create_node(NodeKind::Element("div"));
        host.calls.clear();
        update_properties(&mut host, &node, prev, next);
        host.calls
    }

    #[test]
    fn unchanged_props_produce_no_calls() {
        let handler = EventHandler::new(|_| {});
        let props = Props::new().with("x", 1).on_handler("click", handler);
        assert!(diff(&props, &props.clone()).is_empty());
    }

    #[test]
    fn changed_handler_is_swapped() {
        let old = EventHandler::new(|_| {});
        let new = EventHandler::new(|_| {});
        let prev = Props::new().on_handler("click", old.clone());
        let next = Props::new().on_handler("click", new.clone());
        assert_eq!(
            diff(&prev, &next),
            vec![
                Call::RemoveListener(0, "click".into(), old),
                Call::AddListener(0, "click".into(), new),
            ]
        );
    }

    #[test]
    fn dropped_handler_is_removed() {
        let handler = EventHandler::new(|_| {});
        let prev = Props::new().with("x", 1).on_handler("click", handler.clone());
        let next = Props::new().with("x", 1);
        assert_eq!(
            diff(&prev, &next),
            vec![Call::RemoveListener(0, "click".into(), handler)]
        );
    }

    #[test]
    fn plain_props_are_cleared_then_set() {
        let prev = Props::new().with("a", 1).with("b", 2);
        let next = Props::new().with("b", 3).with("c", "x");
        assert_eq!(
            diff(&prev, &next),
            vec![
                Call::RemoveProperty(0, "a".into()),
                Call::SetProperty(0, "b".into(), PropValue::Int(3)),
                Call::SetProperty(0, "c".into(), PropValue::from("x")),
            ]
        );
    }

    #[test]
    fn event_key_without_handler_is_ignored() {
        let next = Props::new().with("onclick", "nope");
        assert!(diff(&Props::new(), &next).is_empty());
    }
}
