//! Child normalization.
//!
//! Compiled tag syntax hands the element constructor whatever expressions
//! appeared between the tags: elements, strings, numbers, nested lists and
//! the results of conditional expressions. [`Child`] is the sum of those
//! shapes; [`Child::flatten_into`] turns any of them into a flat element list.

use super::{create_text_element, props::number_to_string, Element};

/// One child expression passed to the element constructor.
#[derive(Debug, Clone)]
pub enum Child {
    /// An already-built element.
    Element(Element),
    /// A primitive that becomes a text element.
    Text(String),
    /// A nested list, flattened at any depth.
    List(Vec<Child>),
    /// Nothing: `null`, `false` and other dropped values.
    Empty,
}

impl Child {
    /// Append the elements this child expands to onto `out`.
    pub fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            Child::Element(element) => out.push(element),
            Child::Text(text) => out.push(create_text_element(text)),
            Child::List(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Child::Empty => {}
        }
    }
}

/// Flatten a sequence of children into elements.
pub fn flatten_children<I>(children: I) -> Vec<Element>
where
    I: IntoIterator<Item = Child>,
{
    let mut out = Vec::new();
    for child in children {
        child.flatten_into(&mut out);
    }
    out
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Text(value.clone())
    }
}

impl From<char> for Child {
    fn from(value: char) -> Self {
        Child::Text(value.to_string())
    }
}

macro_rules! integer_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.to_string())
                }
            }
        )*
    };
}

integer_child!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Child {
    fn from(value: f32) -> Self {
        Child::Text(number_to_string(value.into()))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Text(number_to_string(value))
    }
}

/// `false` is dropped so `cond && <el/>` composes; `true` renders as text.
impl From<bool> for Child {
    fn from(value: bool) -> Self {
        if value {
            Child::Text("true".to_string())
        } else {
            Child::Empty
        }
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Child::List(value.into_iter().map(Into::into).collect())
    }
}

/// Build a `Vec<Child>` from heterogeneous child expressions.
///
/// ```rust,ignore
/// let kids = children!["Count: ", count, show_extra.then(|| h("em").build())];
/// ```
#[macro_export]
macro_rules! children {
    () => { ::std::vec::Vec::<$crate::Child>::new() };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::Child::from($child)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, TEXT_ELEMENT};

    #[test]
    fn nested_lists_flatten_and_drop_empties() {
        let children = vec![
            Child::from("a"),
            Child::List(vec![
                Child::from(None::<&str>),
                Child::List(vec![Child::from(1), Child::from(false)]),
            ]),
            Child::Empty,
            Child::from(2.5),
        ];

        let flat = flatten_children(children);
        let texts: Vec<_> = flat
            .iter()
            .map(|e| e.props().get_str("nodeValue").unwrap().to_string())
            .collect();
        assert_eq!(texts, ["a", "1", "2.5"]);
    }

    #[test]
    fn primitives_become_text_elements() {
        let flat = flatten_children(vec![Child::from(42u8)]);
        assert_eq!(flat.len(), 1);
        assert!(matches!(flat[0].element_type(), ElementType::Text));
        assert_eq!(flat[0].element_type().name(), TEXT_ELEMENT);
        assert!(flat[0].props().children().is_empty());
    }

    #[test]
    fn true_renders_as_text() {
        let flat = flatten_children(vec![Child::from(true)]);
        assert_eq!(flat[0].props().get_str("nodeValue"), Some("true"));
    }
}
