//! Core types: operations, options and errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use json_patch_query_path::{NormalizedPath as Path, PathComponent};

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchQueryError {
    #[error("Provided JSON Path did not resolve any nodes, path: {path}")]
    PathNotFound { path: String },
    #[error("Provided JSON Path resolved to more than one node, path: {path}")]
    AmbiguousPath { path: String },
    #[error("Test operation failed at path: {path}, expected: {expected}, actual: {}", describe(.actual))]
    TestFailed {
        path: String,
        expected: Value,
        actual: Option<Value>,
    },
    #[error("Invalid path expression '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

fn describe(actual: &Option<Value>) -> String {
    match actual {
        Some(v) => v.to_string(),
        None => String::from("undefined"),
    }
}

// ── Operations ────────────────────────────────────────────────────────────

/// One patch operation. `path` and `from` are query expressions that may
/// resolve to any number of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl Operation {
    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Replace { .. } => "replace",
            Operation::Move { .. } => "move",
            Operation::Copy { .. } => "copy",
            Operation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. }
            | Operation::Move { path, .. }
            | Operation::Copy { path, .. }
            | Operation::Test { path, .. } => path,
        }
    }

    /// Source expression of `move` and `copy`.
    pub fn from(&self) -> Option<&str> {
        match self {
            Operation::Move { from, .. } | Operation::Copy { from, .. } => Some(from),
            _ => None,
        }
    }
}

/// What a resolved path is going to be used for. Resolvers use it to decide
/// whether a not-yet-existing target is acceptable and how finely to split
/// array matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Add,
    Remove,
    Replace,
    Test,
    Get,
}

impl OpKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Test => "test",
            OpKind::Get => "_get",
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Addressing syntax of operation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// JSONPath filter expressions: `note[?(@.author=="John Doe")].text`
    #[default]
    Query,
    /// TMF dot path with query string: `/note/text?note.author=John Doe`
    Legacy,
}

/// Options for [`apply_patch`](crate::apply_patch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    pub syntax: Syntax,
    /// Restore the original document when any operation fails. Without it,
    /// operations applied before the failing one stay applied.
    pub atomic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_wire_shape() {
        let op: Operation = serde_json::from_value(json!({"op": "move", "from": "a", "path": "b"})).unwrap();
        assert_eq!(op, Operation::Move { from: "a".into(), path: "b".into() });
        assert_eq!(op.op_name(), "move");
        assert_eq!(op.from(), Some("a"));

        let add = Operation::Add { path: "x".into(), value: json!(1) };
        assert_eq!(serde_json::to_value(&add).unwrap(), json!({"op": "add", "path": "x", "value": 1}));
    }

    #[test]
    fn unknown_op_and_missing_fields_are_rejected() {
        assert!(serde_json::from_value::<Operation>(json!({"op": "flip", "path": "a"})).is_err());
        assert!(serde_json::from_value::<Operation>(json!({"op": "copy", "path": "a"})).is_err());
        assert!(serde_json::from_value::<Operation>(json!({"path": "a"})).is_err());
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = PatchQueryError::PathNotFound { path: "a.b".into() };
        assert_eq!(err.to_string(), "Provided JSON Path did not resolve any nodes, path: a.b");

        let err = PatchQueryError::TestFailed { path: "$.id".into(), expected: json!(2), actual: Some(json!(342)) };
        assert_eq!(err.to_string(), "Test operation failed at path: $.id, expected: 2, actual: 342");

        let err = PatchQueryError::TestFailed { path: "$.id".into(), expected: json!(2), actual: None };
        assert!(err.to_string().ends_with("actual: undefined"));
    }

    #[test]
    fn options_default_and_deserialize() {
        assert_eq!(ApplyOptions::default(), ApplyOptions { syntax: Syntax::Query, atomic: false });
        let opts: ApplyOptions = serde_json::from_value(json!({"syntax": "legacy"})).unwrap();
        assert_eq!(opts, ApplyOptions { syntax: Syntax::Legacy, atomic: false });
    }
}
