// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element model: immutable descriptions of what should exist.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::hooks::Hooks;
use crate::props::{NODE_VALUE, PropValue, Props};

type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> Element;

/// A plain function pointer usable as a component.
pub type RenderPtr = fn(&Props, &mut Hooks<'_>) -> Element;

/// What makes two components the same kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Identity {
    /// A zero-sized function type: an `fn` item or a closure that captures nothing.
    Type(TypeId),
    /// A function pointer, compared by address.
    Address(usize),
    /// Any other callable; only clones of the same [`Component`] match.
    Shared,
}

/// A component function: props in, one element out.
///
/// Two components are the same kind for reconciliation when they run the same
/// function:
///
/// - `fn` items and closures that capture nothing match by type, no matter where
///   the [`Component`] was constructed.
/// - function pointers ([`RenderPtr`]) match by address.
/// - capturing closures and boxed callables only match clones of the same
///   [`Component`]; build those once and clone them into each render.
#[derive(Clone)]
pub struct Component {
    identity: Identity,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    /// Wrap a render function.
    ///
    /// The function receives the element's props and the [`Hooks`] context for
    /// the instance being rendered.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Element + 'static,
    {
        if let Some(&ptr) = (&render as &dyn Any).downcast_ref::<RenderPtr>() {
            return Self::from_fn(ptr);
        }
        let identity = if core::mem::size_of::<F>() == 0 {
            Identity::Type(TypeId::of::<F>())
        } else {
            Identity::Shared
        };
        Self {
            identity,
            name: core::any::type_name::<F>(),
            render: Rc::new(render),
        }
    }

    /// Wrap a function pointer. Pointers to the same function are the same kind.
    pub fn from_fn(render: RenderPtr) -> Self {
        #[allow(
            clippy::fn_to_numeric_cast_any,
            reason = "the address is only compared, never called"
        )]
        let address = render as usize;
        Self {
            identity: Identity::Address(address),
            name: core::any::type_name::<RenderPtr>(),
            render: Rc::new(render),
        }
    }

    /// Type name of the wrapped function, used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Element {
        (self.render)(props, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (self.identity, other.identity) {
            (Identity::Shared, Identity::Shared) => Rc::ptr_eq(&self.render, &other.render),
            (a, b) => a == b,
        }
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What an element stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A host node with the given tag.
    Host(Rc<str>),
    /// A text node; its content is the [`NODE_VALUE`] prop.
    Text,
    /// A component function.
    Component(Component),
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        Self::Host(tag.into())
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        Self::Host(tag.into())
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

struct ElementData {
    kind: ElementKind,
    props: Props,
}

/// An immutable element. Cloning shares the underlying data.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

impl Element {
    /// Create an element from a kind and props. Children are taken from `props`.
    pub fn new(kind: impl Into<ElementKind>, props: Props) -> Self {
        Self(Rc::new(ElementData {
            kind: kind.into(),
            props,
        }))
    }

    /// A host element with no props and no children.
    pub fn host(tag: &str) -> Self {
        Self::new(tag, Props::new())
    }

    /// A text element holding `value`.
    pub fn text(value: impl Into<PropValue>) -> Self {
        Self::new(ElementKind::Text, Props::new().with(NODE_VALUE, value))
    }

    /// A component element.
    pub fn component(component: Component, props: Props) -> Self {
        Self::new(component, props)
    }

    /// The element's kind.
    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    /// The element's props.
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// The element's children.
    pub fn children(&self) -> &[Element] {
        self.0.props.children()
    }

    /// Returns `true` if both handles share the same data.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.kind == other.0.kind && self.0.props == other.0.props)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.0.kind)
            .field("props", &self.0.props)
            .finish()
    }
}

/// A child argument to [`create_element`].
///
/// Plain values become text elements; lists are spliced in place.
#[derive(Clone, Debug)]
pub enum Child {
    /// An element.
    Element(Element),
    /// A value rendered as a text element.
    Value(PropValue),
    /// A sequence of children.
    List(Vec<Child>),
}

impl Child {
    pub(crate) fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            Self::Element(element) => out.push(element),
            Self::Value(value) => out.push(Element::text(value)),
            Self::List(list) => {
                for child in list {
                    child.flatten_into(out);
                }
            }
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<PropValue> for Child {
    fn from(value: PropValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl<T: Into<Self>> From<Vec<T>> for Child {
    fn from(list: Vec<T>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

/// Build an element from a kind, props, and positional children.
///
/// If exactly one child is passed and it is a [`Child::List`], that list becomes
/// the children. Otherwise every argument is one child; a list among several
/// arguments is spliced in place. Non-element children become text elements.
/// Children already present on `props` are replaced.
///
/// ```
/// use reva::{Child, ElementKind, Props, children, create_element};
///
/// let el = create_element("h1", Props::new(), children!["Count: ", 3]);
/// assert_eq!(el.children().len(), 2);
/// assert_eq!(el.children()[1].kind(), &ElementKind::Text);
///
/// let items = vec![Child::from("a"), Child::from("b")];
/// let list = create_element("ul", Props::new(), vec![Child::List(items)]);
/// assert_eq!(list.children().len(), 2);
/// ```
pub fn create_element(kind: impl Into<ElementKind>, mut props: Props, children: Vec<Child>) -> Element {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        child.flatten_into(&mut flat);
    }
    props.set_children(flat);
    Element::new(kind, props)
}

/// Build a `Vec<Child>` from heterogeneous child expressions.
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        $crate::__private::vec![$($crate::Child::from($child)),*]
    };
}
