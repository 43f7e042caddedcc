//! Tree abstraction the evaluator walks.

use std::borrow::Cow;

use serde_json::Value;

/// Children of a node, in document order.
pub enum Children<'a, N> {
    Members(Vec<(&'a str, &'a N)>),
    Elements(Vec<&'a N>),
    Leaf,
}

/// A JSON-like tree node that can be queried.
///
/// Implemented for [`serde_json::Value`]; other document representations
/// (for instance ones carrying internal marker variants) implement it to be
/// queried without first being converted.
pub trait QueryNode: Sized {
    /// Object member by name. `None` for non-objects and missing members.
    fn member(&self, name: &str) -> Option<&Self>;

    /// Array element by position. `None` for non-arrays and out of range.
    fn element(&self, index: usize) -> Option<&Self>;

    /// Element count for arrays, `None` otherwise.
    fn array_len(&self) -> Option<usize>;

    fn children(&self) -> Children<'_, Self>;

    /// JSON view used by filter comparisons. `None` means the node compares
    /// like an absent value.
    fn comparable(&self) -> Option<Cow<'_, Value>>;
}

impl QueryNode for Value {
    fn member(&self, name: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    fn element(&self, index: usize) -> Option<&Self> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    fn array_len(&self) -> Option<usize> {
        match self {
            Value::Array(arr) => Some(arr.len()),
            _ => None,
        }
    }

    fn children(&self) -> Children<'_, Self> {
        match self {
            Value::Object(map) => Children::Members(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Value::Array(arr) => Children::Elements(arr.iter().collect()),
            _ => Children::Leaf,
        }
    }

    fn comparable(&self) -> Option<Cow<'_, Value>> {
        Some(Cow::Borrowed(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_member_and_element_lookup() {
        let doc = json!({"a": [10, 20]});
        let arr = doc.member("a").unwrap();
        assert_eq!(arr.array_len(), Some(2));
        assert_eq!(arr.element(1), Some(&json!(20)));
        assert!(arr.element(2).is_none());
        assert!(doc.member("b").is_none());
        assert!(doc.element(0).is_none());
    }

    #[test]
    fn value_children_keep_document_order() {
        let doc = json!({"z": 1, "a": 2});
        match doc.children() {
            Children::Members(members) => {
                let keys: Vec<&str> = members.iter().map(|(k, _)| *k).collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            _ => panic!("expected members"),
        }
        assert!(matches!(json!(3).children(), Children::Leaf));
    }
}
