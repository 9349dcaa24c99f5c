// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, host mutations, queries.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use reva::{Event, EventHandler, Host, NODE_VALUE, NodeKind, PropValue};
use smallvec::SmallVec;

use crate::mutation::{Mutation, MutationLog};
use crate::types::{DocumentError, NodeId, NodeType};

/// An in-memory node tree that a [`reva::Engine`] can render into.
///
/// Structure is stored in a generational arena. Nodes created through the [`Host`]
/// methods start detached; [`Document::insert`] creates nodes (typically containers)
/// directly, outside the mutation log.
///
/// Every host call that reaches a live node is recorded as a [`Mutation`] while
/// recording is on (the default). Calls that name a stale node are skipped.
///
/// ## Example
///
/// ```rust
/// use reva::{Element, Engine, Props};
/// use reva_document::{Document, MutationKinds, NodeType};
///
/// let mut doc = Document::new();
/// let root = doc.insert(None, NodeType::Element("body".into()));
///
/// let mut engine = Engine::new();
/// engine.render(Element::new("p", Props::new().with("id", "x").child("hi")), root);
/// engine.flush(&mut doc);
///
/// assert_eq!(doc.to_markup(root), r#"<body><p id="x">hi</p></body>"#);
/// assert_eq!(doc.take_mutations().count(MutationKinds::CREATE), 2);
/// ```
pub struct Document {
    nodes: Vec<Option<Node>>,
    /// Generation stamped on the newest node of each slot, kept after the node is freed.
    generations: Vec<u32>,
    /// Vacant slots, reused most recent first.
    free_list: Vec<usize>,
    log: Vec<Mutation>,
    recording: bool,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("pending_mutations", &self.log.len())
            .field("recording", &self.recording)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    node_type: NodeType,
    properties: Vec<(String, PropValue)>,
    listeners: SmallVec<[(String, EventHandler); 2]>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(generation: u32, node_type: NodeType) -> Self {
        Self {
            generation,
            node_type,
            properties: Vec::new(),
            listeners: SmallVec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Document {
    /// Create an empty document with recording on.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            log: Vec::new(),
            recording: true,
        }
    }

    /// Create a node outside the mutation log, appended to `parent` if it is live.
    pub fn insert(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = self.allocate(node_type);
        if let Some(parent) = parent.filter(|&p| self.is_alive(p)) {
            self.attach(id, parent);
        }
        id
    }

    /// Remove a node and its subtree. Not recorded; stale ids are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.detach(id, parent);
        }
        self.free_subtree(id);
    }

    /// Turn mutation recording on or off.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    /// Drain the recorded mutations.
    pub fn take_mutations(&mut self) -> MutationLog {
        MutationLog {
            mutations: core::mem::take(&mut self.log),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Returns `true` if the document holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` still names a node, i.e. its slot was not freed since.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Returns the parent of a node if live, or `None` for roots, detached nodes, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// The type of a live node.
    pub fn node_type(&self, id: NodeId) -> Option<&NodeType> {
        self.node_opt(id).map(|n| &n.node_type)
    }

    /// The tag of a live element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node_type(id)?.tag()
    }

    /// A plain property of a live node.
    pub fn property(&self, id: NodeId, key: &str) -> Option<&PropValue> {
        self.node_opt(id)?
            .properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of listeners attached for `event`.
    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.node_opt(id)
            .map_or(0, |n| n.listeners.iter().filter(|(e, _)| e == event).count())
    }

    /// Concatenated text of all text nodes in the subtree of `id`, in document order.
    ///
    /// Empty for stale ids; see [`Document::try_text_content`].
    pub fn text_content(&self, id: NodeId) -> String {
        self.try_text_content(id).unwrap_or_default()
    }

    /// Like [`Document::text_content`], but reports stale ids.
    pub fn try_text_content(&self, id: NodeId) -> Result<String, DocumentError> {
        if !self.is_alive(id) {
            return Err(DocumentError::StaleNode(id));
        }
        let mut out = String::new();
        self.write_text(id, &mut out);
        Ok(out)
    }

    /// Serialize the subtree of `id` as markup.
    ///
    /// Properties are written as attributes in the order they were first set;
    /// listeners are omitted. Text is escaped. Empty for stale ids.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    /// Deliver `event` to `target` and then to each of its ancestors.
    ///
    /// Listeners registered for `event.name` run in registration order per node.
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, target: NodeId, event: &Event) -> Result<usize, DocumentError> {
        if !self.is_alive(target) {
            return Err(DocumentError::StaleNode(target));
        }
        let mut invoked = 0;
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            let node = self.node(id);
            let handlers: SmallVec<[EventHandler; 2]> = node
                .listeners
                .iter()
                .filter(|(name, _)| *name == event.name)
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                handler.call(event);
                invoked += 1;
            }
            cursor = node.parent;
        }
        log::trace!("dispatched `{}` to {invoked} listeners", event.name);
        Ok(invoked)
    }

    /// Find the first node in the subtree of `root` (inclusive) with the given tag.
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        if self.tag(root) == Some(tag) {
            return Some(root);
        }
        self.children_of(root)
            .iter()
            .find_map(|&child| self.find_by_tag(child, tag))
    }

    // --- internals ---

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.node_opt(id).expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.node_opt_mut(id).expect("dangling NodeId")
    }

    /// Stamp a fresh generation on a vacant (or new) slot and fill it.
    fn allocate(&mut self, node_type: NodeType) -> NodeId {
        let idx = match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                self.nodes.push(None);
                self.generations.push(0);
                self.nodes.len() - 1
            }
        };
        let generation = self.generations[idx].wrapping_add(1).max(1);
        self.generations[idx] = generation;
        self.nodes[idx] = Some(Node::new(generation, node_type));
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node slots are addressed with 32-bit indices"
        )]
        let idx = idx as u32;
        NodeId::new(idx, generation)
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
    }

    fn detach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.node_mut(id).parent = None;
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            if self.is_alive(child) {
                self.free_subtree(child);
            }
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    fn record(&mut self, mutation: Mutation) {
        if self.recording {
            self.log.push(mutation);
        }
    }

    fn write_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if node.node_type == NodeType::Text {
            if let Some((_, value)) = node.properties.iter().find(|(k, _)| k == NODE_VALUE) {
                let _ = write!(out, "{value}");
            }
            return;
        }
        for &child in &node.children {
            self.write_text(child, out);
        }
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        let tag = match &node.node_type {
            NodeType::Text => {
                let mut text = String::new();
                self.write_text(id, &mut text);
                escape_into(&text, false, out);
                return;
            }
            NodeType::Element(tag) => tag,
        };
        out.push('<');
        out.push_str(tag);
        for (key, value) in &node.properties {
            if matches!(value, PropValue::Handler(_)) {
                continue;
            }
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            let mut text = String::new();
            let _ = write!(text, "{value}");
            escape_into(&text, true, out);
            out.push('"');
        }
        out.push('>');
        for &child in &node.children {
            self.write_markup(child, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

impl Host for Document {
    type Node = NodeId;

    fn create_node(&mut self, kind: NodeKind<'_>) -> NodeId {
        let node_type = match kind {
            NodeKind::Element(tag) => NodeType::Element(tag.into()),
            NodeKind::Text => NodeType::Text,
        };
        let node = self.insert(None, node_type.clone());
        self.record(Mutation::Create { node, node_type });
        node
    }

    fn set_property(&mut self, node: &NodeId, key: &str, value: &PropValue) {
        let Some(n) = self.node_opt_mut(*node) else {
            log::debug!("set_property on stale node {node:?}");
            return;
        };
        match n.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.clone(),
            None => n.properties.push((key.into(), value.clone())),
        }
        self.record(Mutation::SetProperty {
            node: *node,
            key: key.into(),
            value: value.clone(),
        });
    }

    fn remove_property(&mut self, node: &NodeId, key: &str) {
        let Some(n) = self.node_opt_mut(*node) else {
            log::debug!("remove_property on stale node {node:?}");
            return;
        };
        n.properties.retain(|(k, _)| k != key);
        self.record(Mutation::RemoveProperty {
            node: *node,
            key: key.into(),
        });
    }

    fn add_event_listener(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        let Some(n) = self.node_opt_mut(*node) else {
            log::debug!("add_event_listener on stale node {node:?}");
            return;
        };
        if n.listeners.iter().any(|(e, h)| e == event && h == handler) {
            return;
        }
        n.listeners.push((event.into(), handler.clone()));
        self.record(Mutation::AddListener {
            node: *node,
            event: event.into(),
        });
    }

    fn remove_event_listener(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        let Some(n) = self.node_opt_mut(*node) else {
            log::debug!("remove_event_listener on stale node {node:?}");
            return;
        };
        n.listeners.retain(|(e, h)| !(e == event && h == handler));
        self.record(Mutation::RemoveListener {
            node: *node,
            event: event.into(),
        });
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        if !self.is_alive(*parent) || !self.is_alive(*child) {
            log::debug!("append_child with stale node {parent:?} <- {child:?}");
            return;
        }
        if let Some(old) = self.node(*child).parent {
            self.detach(*child, old);
        }
        self.attach(*child, *parent);
        self.record(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if !self.is_alive(*child) {
            log::debug!("remove_child of stale node {child:?}");
            return;
        }
        if self.node(*child).parent != Some(*parent) {
            log::debug!("remove_child: {child:?} is not a child of {parent:?}");
            return;
        }
        self.detach(*child, *parent);
        self.free_subtree(*child);
        self.record(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }

    fn discard_node(&mut self, node: &NodeId) {
        if self.is_alive(*node) && self.node(*node).parent.is_none() {
            self.free_subtree(*node);
        }
    }
}
