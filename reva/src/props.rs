// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property bags: plain values, event handlers, and the ordered [`Props`] map.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::element::Element;

/// Key prefix marking a property as an event handler (`onclick`, `onInput`).
pub const EVENT_PREFIX: &str = "on";

/// Reserved key naming the children of an element.
///
/// Children are not stored as a regular entry; see [`Props::children`].
pub const CHILDREN: &str = "children";

/// Property holding the content of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Returns `true` if `key` names an event handler.
pub fn is_event_key(key: &str) -> bool {
    key.starts_with(EVENT_PREFIX)
}

/// Returns `true` if `key` names a plain host attribute.
pub fn is_plain_key(key: &str) -> bool {
    key != CHILDREN && !is_event_key(key)
}

/// Host event name for an event key: the prefix is stripped and the rest lower-cased.
///
/// Returns `None` when `key` is not an event key.
///
/// ```
/// assert_eq!(reva::event_name("onClick").as_deref(), Some("click"));
/// assert_eq!(reva::event_name("title"), None);
/// ```
pub fn event_name(key: &str) -> Option<String> {
    key.strip_prefix(EVENT_PREFIX).map(str::to_lowercase)
}

/// An event delivered to an [`EventHandler`] by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event name as used for listener registration (`click`, `input`).
    pub name: String,
    /// Optional payload supplied by the host.
    pub detail: Option<PropValue>,
}

impl Event {
    /// Create an event without payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    /// Attach a payload.
    pub fn with_detail(mut self, detail: impl Into<PropValue>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A shared event callback.
///
/// Handlers compare by identity: two handlers are equal only if they are clones of
/// the same [`EventHandler`]. Building a fresh closure on every render therefore
/// re-registers the listener on the host.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    /// Wrap a callback.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Value of a single property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// String attribute or text content.
    Str(Rc<str>),
    /// Integer value.
    Int(i64),
    /// Floating point value. Compared with `==`, so `NaN` always counts as changed.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Event callback; only meaningful under an event key.
    Handler(EventHandler),
}

impl PropValue {
    /// Returns the string payload, if this is a [`PropValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the handler, if this is a [`PropValue::Handler`].
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

/// Ordered property map of an element, plus its children.
///
/// Entries keep insertion order; replacing an existing key keeps its position.
/// The reserved [`CHILDREN`] key is not a regular entry: children live in their
/// own list and are read through [`Props::children`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(Rc<str>, PropValue)>,
    children: Vec<Element>,
}

impl Props {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::insert`].
    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Register an event handler under `on{event}`.
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_handler(event, EventHandler::new(handler))
    }

    /// Register an existing handler under `on{event}`.
    pub fn on_handler(mut self, event: &str, handler: EventHandler) -> Self {
        let mut key = String::from(EVENT_PREFIX);
        key.push_str(event);
        self.insert(&key, handler);
        self
    }

    /// Append one child, normalizing it like [`create_element`](crate::create_element).
    pub fn child(mut self, child: impl Into<crate::Child>) -> Self {
        child.into().flatten_into(&mut self.children);
        self
    }

    /// Insert or replace a property and return the previous value.
    ///
    /// The reserved [`CHILDREN`] key is rejected.
    pub fn insert(&mut self, key: &str, value: impl Into<PropValue>) -> Option<PropValue> {
        if key == CHILDREN {
            log::warn!("`{CHILDREN}` is reserved; pass children through `Props::child` instead");
            return None;
        }
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| &**k == key) {
            return Some(core::mem::replace(slot, value));
        }
        self.entries.push((key.into(), value));
        None
    }

    /// Remove a property.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let pos = self.entries.iter().position(|(k, _)| &**k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate all entries in insertion order. Children are not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    /// Iterate plain host attributes.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter().filter(|(k, _)| is_plain_key(k))
    }

    /// Iterate event entries.
    pub fn events(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter().filter(|(k, _)| is_event_key(k))
    }

    /// Number of entries, children excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries and no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.children.is_empty()
    }

    /// The ordered children.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }
}
