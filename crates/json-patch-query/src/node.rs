//! Working copy of the document while a patch is applied.
//!
//! [`Node`] mirrors [`serde_json::Value`] and adds two marker variants the
//! engine needs mid-operation: `Tombstone` (array slot pending removal) and
//! `Placeholder` (member created so a query can see it before its value is
//! written). Converting back with [`Node::into_value`] drops both.

use std::borrow::Cow;

use indexmap::IndexMap;
use json_patch_query_path::{json_equal, Children, PathComponent, QueryNode};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(IndexMap<String, Node>),
    Tombstone,
    Placeholder,
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect()),
        }
    }
}

impl Node {
    pub(crate) fn is_marker(&self) -> bool {
        matches!(self, Node::Tombstone | Node::Placeholder)
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    /// Convert to a plain JSON value. Markers inside containers are dropped;
    /// a marker at the top becomes `null`.
    pub(crate) fn into_value(self) -> Value {
        match self {
            Node::Null | Node::Tombstone | Node::Placeholder => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Number(n) => Value::Number(n),
            Node::String(s) => Value::String(s),
            Node::Array(items) => {
                Value::Array(items.into_iter().filter(|n| !n.is_marker()).map(Node::into_value).collect())
            }
            Node::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    if !child.is_marker() {
                        out.insert(key, child.into_value());
                    }
                }
                Value::Object(out)
            }
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    // ── Path navigation ───────────────────────────────────────────────────

    fn child(&self, step: &PathComponent) -> Option<&Node> {
        match self {
            Node::Object(map) => map.get(member_key(step).as_ref()),
            Node::Array(items) => position(step).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn child_mut(&mut self, step: &PathComponent) -> Option<&mut Node> {
        match self {
            Node::Object(map) => map.get_mut(member_key(step).as_ref()),
            Node::Array(items) => position(step).and_then(|i| items.get_mut(i)),
            _ => None,
        }
    }

    pub(crate) fn get(&self, path: &[PathComponent]) -> Option<&Node> {
        path.iter().try_fold(self, |node, step| node.child(step))
    }

    pub(crate) fn get_mut(&mut self, path: &[PathComponent]) -> Option<&mut Node> {
        path.iter().try_fold(self, |node, step| node.child_mut(step))
    }

    /// Write `value` at `path`, creating missing containers on the way. An
    /// index step creates an array (padded with `null`), a key step an
    /// object; scalars in the way are overwritten.
    pub(crate) fn set(&mut self, path: &[PathComponent], value: Node) {
        let mut node = self;
        for step in path {
            node = node.slot(step);
        }
        *node = value;
    }

    fn slot(&mut self, step: &PathComponent) -> &mut Node {
        let fits = match self {
            Node::Object(_) => true,
            Node::Array(_) => position(step).is_some(),
            _ => false,
        };
        if !fits {
            *self = match step {
                PathComponent::Index(_) => Node::Array(Vec::new()),
                PathComponent::Key(_) => Node::Object(IndexMap::new()),
            };
        }
        match self {
            Node::Array(items) => {
                let idx = position(step).unwrap_or(items.len());
                if idx >= items.len() {
                    items.resize(idx + 1, Node::Null);
                }
                &mut items[idx]
            }
            Node::Object(map) => map.entry(member_key(step).into_owned()).or_insert(Node::Null),
            scalar => scalar,
        }
    }

    /// Delete an object member. Array elements are left alone; the engine
    /// removes those through tombstones.
    pub(crate) fn unset(&mut self, path: &[PathComponent]) -> Option<Node> {
        let (last, parent) = path.split_last()?;
        match self.get_mut(parent)? {
            Node::Object(map) => map.shift_remove(member_key(last).as_ref()),
            _ => None,
        }
    }

    /// Drop tombstoned elements from the array at `path`. Returns how many
    /// were dropped.
    pub(crate) fn retain_live(&mut self, path: &[PathComponent]) -> usize {
        match self.get_mut(path) {
            Some(Node::Array(items)) => {
                let before = items.len();
                items.retain(|n| !matches!(n, Node::Tombstone));
                before - items.len()
            }
            _ => 0,
        }
    }

    /// Structural equality against a plain value, numbers compared by value.
    pub(crate) fn deep_equal(&self, other: &Value) -> bool {
        !self.is_marker() && json_equal(&self.to_value(), other)
    }
}

/// Object member name for a path step.
fn member_key(step: &PathComponent) -> Cow<'_, str> {
    match step {
        PathComponent::Key(key) => Cow::Borrowed(key),
        PathComponent::Index(idx) => Cow::Owned(idx.to_string()),
    }
}

/// Array position for a path step. Keys that spell a non-negative integer
/// address elements too.
fn position(step: &PathComponent) -> Option<usize> {
    match step {
        PathComponent::Index(idx) => Some(*idx),
        PathComponent::Key(key) => key.parse().ok(),
    }
}

impl QueryNode for Node {
    fn member(&self, name: &str) -> Option<&Self> {
        match self {
            Node::Object(map) => map.get(name),
            _ => None,
        }
    }

    fn element(&self, index: usize) -> Option<&Self> {
        match self {
            Node::Array(items) => items.get(index),
            _ => None,
        }
    }

    fn array_len(&self) -> Option<usize> {
        match self {
            Node::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    fn children(&self) -> Children<'_, Self> {
        match self {
            Node::Object(map) => Children::Members(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Node::Array(items) => Children::Elements(items.iter().collect()),
            _ => Children::Leaf,
        }
    }

    fn comparable(&self) -> Option<Cow<'_, Value>> {
        if self.is_marker() {
            None
        } else {
            Some(Cow::Owned(self.to_value()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> PathComponent {
        PathComponent::Key(k.to_string())
    }

    #[test]
    fn markers_never_survive_conversion() {
        let mut node = Node::from(json!({"a": [1, 2, 3], "b": {}}));
        node.set(&[key("a"), PathComponent::Index(1)], Node::Tombstone);
        node.set(&[key("b"), key("c")], Node::Placeholder);
        assert_eq!(node.into_value(), json!({"a": [1, 3], "b": {}}));
        assert_eq!(Node::Tombstone.into_value(), Value::Null);
    }

    #[test]
    fn set_creates_intermediate_containers() {
        let mut node = Node::from(json!({}));
        node.set(&[key("a"), PathComponent::Index(2), key("b")], Node::from(json!(true)));
        assert_eq!(node.into_value(), json!({"a": [null, null, {"b": true}]}));

        let mut node = Node::from(json!({"a": "scalar"}));
        node.set(&[key("a"), key("b")], Node::from(json!(1)));
        assert_eq!(node.into_value(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn set_replaces_what_cannot_hold_the_step() {
        let mut node = Node::from(json!({"a": 1, "list": [1, 2], "obj": {}}));
        node.set(&[key("a"), key("b")], Node::from(json!(2)));
        node.set(&[key("list"), key("x")], Node::from(json!(3)));
        node.set(&[key("obj"), PathComponent::Index(0)], Node::from(json!(4)));
        assert_eq!(node.into_value(), json!({"a": {"b": 2}, "list": {"x": 3}, "obj": {"0": 4}}));
    }

    #[test]
    fn set_on_empty_path_replaces_root() {
        let mut node = Node::from(json!({"a": 1}));
        node.set(&[], Node::from(json!([1])));
        assert_eq!(node.into_value(), json!([1]));
    }

    #[test]
    fn get_accepts_numeric_keys_on_arrays() {
        let node = Node::from(json!({"a": [{"b": 1}, {"b": 2}]}));
        assert_eq!(node.get(&[key("a"), key("1"), key("b")]).map(Node::to_value), Some(json!(2)));
        assert!(node.get(&[key("a"), key("x")]).is_none());
    }

    #[test]
    fn unset_removes_members_only() {
        let mut node = Node::from(json!({"a": {"x": 1, "y": 2}, "list": [1, 2]}));
        assert_eq!(node.unset(&[key("a"), key("x")]), Some(Node::from(json!(1))));
        assert!(node.unset(&[key("list"), PathComponent::Index(0)]).is_none());
        assert!(node.unset(&[]).is_none());
        assert_eq!(node.into_value(), json!({"a": {"y": 2}, "list": [1, 2]}));
    }

    #[test]
    fn retain_live_compacts_one_array() {
        let mut node = Node::from(json!([[1, 2], 3, 4]));
        node.set(&[PathComponent::Index(0), PathComponent::Index(0)], Node::Tombstone);
        node.set(&[PathComponent::Index(2)], Node::Tombstone);
        assert_eq!(node.retain_live(&[PathComponent::Index(0)]), 1);
        assert_eq!(node.get(&[PathComponent::Index(0)]).map(Node::to_value), Some(json!([2])));
        assert_eq!(node.retain_live(&[]), 1);
        assert_eq!(node, Node::from(json!([[2], 3])));
    }

    #[test]
    fn deep_equal_compares_numbers_by_value() {
        assert!(Node::from(json!({"a": [1]})).deep_equal(&json!({"a": [1.0]})));
        assert!(!Node::from(json!(1)).deep_equal(&json!("1")));
        assert!(!Node::Placeholder.deep_equal(&Value::Null));
    }

    #[test]
    fn markers_are_opaque_to_filters() {
        let node = Node::Object(IndexMap::from([("a".to_string(), Node::Placeholder)]));
        assert!(node.member("a").is_some());
        assert!(node.member("a").and_then(|n| n.comparable()).is_none());
        assert!(matches!(Node::Tombstone.children(), Children::Leaf));
    }
}
