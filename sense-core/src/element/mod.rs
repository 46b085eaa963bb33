//! Element Model
//!
//! An [`Element`] is the immutable description of one node to render: a
//! type, a property bag, the children (stored in the bag) and an optional
//! identity key. Elements are rebuilt from scratch on every render and are
//! cheap to clone (`Arc`-backed), so fibers keep a copy of the props they
//! were produced from.
//!
//! # Element types
//!
//! The type is resolved once, when the element is built:
//!
//! - [`ElementType::Host`]: a primitive output node with a tag name.
//! - [`ElementType::Text`]: a text node; its content lives in the `nodeValue` prop.
//! - [`ElementType::Fragment`]: a grouping with no output node of its own.
//! - [`ElementType::Component`]: a render function `props -> element`.
//!
//! Because the type is a closed enum, "neither a tag nor a function" cannot
//! be expressed and no runtime check for it exists.

mod child;
mod props;

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

pub use child::{flatten_children, Child};
pub use props::{Event, EventHandler, PropValue, Props, Style, CHILDREN, KEY};

/// Display name of the text element type.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Prop holding the content of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Stable identity used to match list items across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A numeric key.
    Int(i64),
    /// A string key.
    Str(Arc<str>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value.into())
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value.into())
    }
}

impl From<Key> for PropValue {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(n) => PropValue::Int(n),
            Key::Str(s) => PropValue::Str(s),
        }
    }
}

// ----------------------------------------------------------------------------
// Components
// ----------------------------------------------------------------------------

type RenderFn = dyn Fn(&Props) -> Element + Send + Sync;

/// A user-defined render function.
///
/// Two components are the same type when they were built from the same
/// function item or closure expression, so constructing the component anew
/// on every render does not remount it. Coercing distinct functions to one
/// `fn` pointer type erases that distinction; pass the function item itself.
#[derive(Clone)]
pub struct Component {
    name: Arc<str>,
    identity: TypeId,
    render: Arc<RenderFn>,
}

impl Component {
    /// Wrap a render function.
    pub fn new<F>(name: impl Into<Arc<str>>, render: F) -> Self
    where
        F: Fn(&Props) -> Element + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            identity: TypeId::of::<F>(),
            render: Arc::new(render),
        }
    }

    /// The component's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the render function.
    pub fn render(&self, props: &Props) -> Element {
        (self.render)(props)
    }

    /// Start building an element of this component type.
    pub fn builder(&self) -> ElementBuilder {
        ElementBuilder::new(ElementType::Component(self.clone()))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name).finish()
    }
}

/// What an element renders as.
#[derive(Debug, Clone)]
pub enum ElementType {
    /// A primitive output node.
    Host(Arc<str>),
    /// A text node.
    Text,
    /// A grouping that renders only its children.
    Fragment,
    /// A render function.
    Component(Component),
}

impl ElementType {
    /// Whether two types describe the same kind of node, so that the fiber
    /// and its output node can be reused.
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (ElementType::Host(a), ElementType::Host(b)) => a == b,
            (ElementType::Text, ElementType::Text) => true,
            (ElementType::Fragment, ElementType::Fragment) => true,
            (ElementType::Component(a), ElementType::Component(b)) => a == b,
            _ => false,
        }
    }

    /// Tag name, `TEXT_ELEMENT`, `Fragment`, or the component name.
    pub fn name(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Text => TEXT_ELEMENT,
            ElementType::Fragment => "Fragment",
            ElementType::Component(component) => component.name(),
        }
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.same_type(other)
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(tag.into())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(tag.into())
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

// ----------------------------------------------------------------------------
// Elements
// ----------------------------------------------------------------------------

struct ElementData {
    element_type: ElementType,
    props: Props,
    key: Option<Key>,
}

/// An immutable render description.
#[derive(Clone)]
pub struct Element(Arc<ElementData>);

impl Element {
    /// The element type.
    pub fn element_type(&self) -> &ElementType {
        &self.0.element_type
    }

    /// The property bag, including children.
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// The identity key lifted from the `key` prop.
    pub fn key(&self) -> Option<&Key> {
        self.0.key.as_ref()
    }

    /// The child elements.
    pub fn children(&self) -> &[Element] {
        self.0.props.children()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type", &self.element_type().name())
            .field("key", &self.0.key)
            .field("props", &self.0.props)
            .finish()
    }
}

/// Build an element from a type, a property bag and child expressions.
///
/// Children are flattened at any depth, empty entries are dropped and
/// primitives are wrapped into text elements. A truthy `key` prop becomes
/// the element key and also stays readable through the props.
pub fn create_element<T, I>(element_type: T, mut props: Props, children: I) -> Element
where
    T: Into<ElementType>,
    I: IntoIterator<Item = Child>,
{
    props.set_children(flatten_children(children));
    let key = props.key();
    Element(Arc::new(ElementData {
        element_type: element_type.into(),
        props,
        key,
    }))
}

/// Build a text element.
pub fn create_text_element(text: impl Into<String>) -> Element {
    let props = Props::new().with(NODE_VALUE, text.into());
    Element(Arc::new(ElementData {
        element_type: ElementType::Text,
        props,
        key: None,
    }))
}

// ----------------------------------------------------------------------------
// Builder
// ----------------------------------------------------------------------------

/// Incremental element construction for hand-written trees.
#[derive(Debug)]
pub struct ElementBuilder {
    element_type: ElementType,
    props: Props,
    children: Vec<Child>,
}

/// Start building a host element.
pub fn h(tag: &str) -> ElementBuilder {
    ElementBuilder::new(ElementType::from(tag))
}

/// Start building a fragment.
pub fn fragment() -> ElementBuilder {
    ElementBuilder::new(ElementType::Fragment)
}

impl ElementBuilder {
    /// Start building an element of any type.
    pub fn new(element_type: impl Into<ElementType>) -> Self {
        Self {
            element_type: element_type.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Set a prop.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Set the identity key.
    pub fn key(self, key: impl Into<Key>) -> Self {
        self.prop(KEY, key.into())
    }

    /// Attach an event handler under a prop name such as `onClick`.
    pub fn listener<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.prop(name, EventHandler::new(handler))
    }

    /// Append one child expression.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child expressions.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Finish the element.
    pub fn build(self) -> Element {
        create_element(self.element_type, self.props, self.children)
    }
}

impl From<ElementBuilder> for Child {
    fn from(builder: ElementBuilder) -> Self {
        Child::Element(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::children;

    fn label(props: &Props) -> Element {
        h("span").child(props.get_str("text").unwrap_or_default().to_string()).build()
    }

    #[test]
    fn key_is_lifted_and_kept_in_props() {
        let element = create_element("li", crate::props! { "key" => "a", "id" => "x" }, children![]);
        assert_eq!(element.key(), Some(&Key::Str("a".into())));
        assert_eq!(element.props().get_str("key"), Some("a"));
    }

    #[test]
    fn falsy_key_is_dropped() {
        let element = create_element("li", crate::props! { "key" => 0 }, children![]);
        assert_eq!(element.key(), None);
    }

    #[test]
    fn children_are_normalized() {
        let element = create_element(
            "p",
            Props::new(),
            children!["Count: ", 3, None::<Element>, vec![h("b").build()]],
        );
        let kinds: Vec<_> = element.children().iter().map(|c| c.element_type().name().to_string()).collect();
        assert_eq!(kinds, [TEXT_ELEMENT, TEXT_ELEMENT, "b"]);
    }

    #[test]
    fn component_identity_follows_the_function() {
        let a = Component::new("Label", label);
        let b = Component::new("Label", label);
        let other = Component::new("Other", |_: &Props| h("div").build());

        assert!(ElementType::from(a.clone()).same_type(&ElementType::from(b)));
        assert!(!ElementType::from(a).same_type(&ElementType::from(other)));
    }

    #[test]
    fn host_types_compare_by_tag() {
        assert!(ElementType::from("div").same_type(&ElementType::from("div")));
        assert!(!ElementType::from("div").same_type(&ElementType::from("span")));
        assert!(!ElementType::Text.same_type(&ElementType::Fragment));
    }
}
