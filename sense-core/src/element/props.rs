//! Property bags and property values.
//!
//! A [`Props`] bag is an ordered map from names to [`PropValue`]s plus the
//! list of child elements. The reserved `children` entry is kept apart from
//! the named values; the reserved `key` entry stays in the map so components
//! can still read it.
//!
//! # Identity
//!
//! Property diffing compares values the way the host language compares them
//! by identity: scalars and strings by value, style maps, handlers and opaque
//! values by pointer. Two closures that do the same thing are two different
//! handlers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Element, Key};

/// Reserved prop name holding the child list.
pub const CHILDREN: &str = "children";

/// Reserved prop name holding the identity key.
pub const KEY: &str = "key";

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

/// An event delivered to a handler by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    detail: PropValue,
}

impl Event {
    /// Create an event with the given native name (e.g. `"click"`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: PropValue::Null,
        }
    }

    /// Attach a payload to the event.
    pub fn with_detail(mut self, detail: impl Into<PropValue>) -> Self {
        self.detail = detail.into();
        self
    }

    /// The native event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The payload, `Null` if none was attached.
    pub fn detail(&self) -> &PropValue {
        &self.detail
    }
}

/// A shareable event listener.
///
/// Equality is pointer identity, so re-creating a closure on every render
/// produces a "changed" handler.
#[derive(Clone)]
pub struct EventHandler(Arc<dyn Fn(&Event) + Send + Sync>);

impl EventHandler {
    /// Wrap a closure as a handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Whether both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

// ----------------------------------------------------------------------------
// Style
// ----------------------------------------------------------------------------

/// An inline style object: ordered declarations merged into the node's style.
#[derive(Clone, Default)]
pub struct Style(Arc<IndexMap<String, String>>);

impl Style {
    /// An empty style object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, returning the updated style.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).insert(property.into(), value.into());
        self
    }

    /// Iterate declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Look up a single declaration.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no declarations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(Arc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (property, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{property}: {value};")?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ----------------------------------------------------------------------------
// Values
// ----------------------------------------------------------------------------

/// A single property value.
#[derive(Clone, Default)]
pub enum PropValue {
    /// Absent / null.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Str(Arc<str>),
    /// An inline style object.
    Style(Style),
    /// An event handler.
    Handler(EventHandler),
    /// Any other shared value, compared by pointer.
    Any(Arc<dyn Any + Send + Sync>),
}

impl PropValue {
    /// Wrap an arbitrary value, compared by identity.
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Self::Any(Arc::new(value))
    }

    /// Borrow the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The handler payload.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Downcast an opaque payload.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Whether this value would be `false` in a boolean context of the host language.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Float(x) => *x == 0.0 || x.is_nan(),
            Self::Str(s) => s.is_empty(),
            Self::Style(_) | Self::Handler(_) | Self::Any(_) => false,
        }
    }

    /// Interpret the value as an element key. Falsy values mean "no key".
    pub fn to_key(&self) -> Option<Key> {
        if self.is_falsy() {
            return None;
        }
        match self {
            Self::Int(n) => Some(Key::Int(*n)),
            Self::Str(s) => Some(Key::Str(Arc::clone(s))),
            Self::Float(x) if x.is_finite() => Some(Key::Str(number_to_string(*x).into())),
            _ => None,
        }
    }

    /// The string written when the value is set as a generic attribute.
    pub fn to_attribute_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(x) => number_to_string(*x),
            Self::Str(s) => s.to_string(),
            Self::Style(style) => style.to_string(),
            Self::Handler(_) => "[function]".to_string(),
            Self::Any(_) => "[object]".to_string(),
        }
    }

    /// Identity comparison: scalars by value (floats by bit pattern),
    /// shared payloads by pointer.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            (Self::Any(a), Self::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PropValue {
    /// Strict equality of the host language, used when syncing props onto
    /// output nodes. Unlike [`same_value`](Self::same_value), numbers
    /// compare by numeric value across `Int` and `Float`, `0.0` equals
    /// `-0.0`, and NaN never equals anything.
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            _ => self.same_value(other),
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Style(style) => f.debug_tuple("Style").field(style).finish(),
            Self::Handler(h) => h.fmt(f),
            Self::Any(value) => write!(f, "Any({:p})", Arc::as_ptr(value).cast::<()>()),
        }
    }
}

/// Format a number the way the host language stringifies it.
pub(crate) fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == value.trunc() && value.abs() < 1e21 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
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

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
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

impl From<Arc<str>> for PropValue {
    fn from(value: Arc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        Self::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ----------------------------------------------------------------------------
// Props
// ----------------------------------------------------------------------------

/// A property bag: named values in insertion order plus the child list.
#[derive(Clone, Default)]
pub struct Props {
    values: IndexMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, returning the updated bag.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    ///
    /// `children` is reserved for the child list and is ignored here.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let name = name.into();
        if name == CHILDREN {
            tracing::warn!("`children` is reserved; pass child elements as children instead");
            return;
        }
        self.values.insert(name, value.into());
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Look up a string value.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    /// Look up an integer value.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    /// Look up an opaque value of type `T`.
    pub fn get_any<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(PropValue::downcast_ref)
    }

    /// Whether a named value is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate named values in insertion order (the child list is not included).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of named values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no named values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    /// The element key carried by the `key` prop, if any.
    pub fn key(&self) -> Option<Key> {
        self.get(KEY).and_then(PropValue::to_key)
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.iter());
        if !self.children.is_empty() {
            map.entry(&CHILDREN, &self.children);
        }
        map.finish()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (name, value) in iter {
            props.insert(name, value);
        }
        props
    }
}

/// Build a [`Props`] bag.
///
/// ```rust,ignore
/// let props = props! { "id" => "main", "tabIndex" => 0 };
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::Props::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::Props::new();
        $( props.insert($name, $value); )+
        props
    }};
}
