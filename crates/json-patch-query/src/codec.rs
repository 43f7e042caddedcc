//! JSON codec for patch operations.
//!
//! Wire shape: `{"op": "add", "path": "...", "value": ...}`, one object per
//! operation, a patch being an array of them.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{Operation, PatchQueryError};

/// Decode one operation.
pub fn from_json(value: &Value) -> Result<Operation, PatchQueryError> {
    if !value.is_object() {
        return Err(PatchQueryError::InvalidOp("OP_INVALID: operation must be an object".to_string()));
    }
    match value.get("op") {
        Some(Value::String(_)) => {}
        Some(_) => return Err(PatchQueryError::InvalidOp("OP_INVALID: \"op\" must be a string".to_string())),
        None => return Err(PatchQueryError::InvalidOp("OP_MISSING: missing \"op\" field".to_string())),
    }
    Operation::deserialize(value).map_err(|e| PatchQueryError::InvalidOp(format!("OP_INVALID: {e}")))
}

/// Decode a patch (a JSON array of operations).
pub fn from_json_patch(value: &Value) -> Result<Vec<Operation>, PatchQueryError> {
    let items = value
        .as_array()
        .ok_or_else(|| PatchQueryError::InvalidOp("PATCH_INVALID: patch must be an array".to_string()))?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            from_json(item).map_err(|err| match err {
                PatchQueryError::InvalidOp(msg) => PatchQueryError::InvalidOp(format!("{msg} (operation {idx})")),
                other => other,
            })
        })
        .collect()
}

pub fn to_json(op: &Operation) -> Value {
    match op {
        Operation::Add { path, value } => json!({"op": "add", "path": path, "value": value}),
        Operation::Remove { path } => json!({"op": "remove", "path": path}),
        Operation::Replace { path, value } => json!({"op": "replace", "path": path, "value": value}),
        Operation::Move { from, path } => json!({"op": "move", "path": path, "from": from}),
        Operation::Copy { from, path } => json!({"op": "copy", "path": path, "from": from}),
        Operation::Test { path, value } => json!({"op": "test", "path": path, "value": value}),
    }
}

pub fn to_json_patch(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_operation_kind() {
        let patch = json!([
            {"op": "add", "path": "note[?(@.author==\"John Doe\")]", "value": {"text": "Informed"}},
            {"op": "remove", "path": "a"},
            {"op": "replace", "path": "b", "value": 1},
            {"op": "move", "from": "c", "path": "d"},
            {"op": "copy", "from": "e", "path": "f"},
            {"op": "test", "path": "$.id", "value": 2}
        ]);
        let ops = from_json_patch(&patch).unwrap();
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[0], Operation::Add { path: "note[?(@.author==\"John Doe\")]".into(), value: json!({"text": "Informed"}) });
        assert_eq!(ops[3], Operation::Move { from: "c".into(), path: "d".into() });
        assert_eq!(to_json_patch(&ops), patch);
    }

    #[test]
    fn rejects_malformed_operations() {
        assert!(matches!(from_json(&json!("add")), Err(PatchQueryError::InvalidOp(_))));
        assert!(matches!(from_json(&json!({"path": "a"})), Err(PatchQueryError::InvalidOp(m)) if m.starts_with("OP_MISSING")));
        assert!(matches!(from_json(&json!({"op": 1, "path": "a"})), Err(PatchQueryError::InvalidOp(_))));
        assert!(matches!(from_json(&json!({"op": "flip", "path": "a"})), Err(PatchQueryError::InvalidOp(_))));
        assert!(matches!(from_json(&json!({"op": "add", "path": "a"})), Err(PatchQueryError::InvalidOp(_))));
        assert!(matches!(from_json(&json!({"op": "move", "path": "a"})), Err(PatchQueryError::InvalidOp(_))));
    }

    #[test]
    fn patch_must_be_an_array_and_errors_name_the_index() {
        assert!(matches!(from_json_patch(&json!({"op": "remove", "path": "a"})), Err(PatchQueryError::InvalidOp(_))));
        let err = from_json_patch(&json!([{"op": "remove", "path": "a"}, {"op": "remove"}])).unwrap_err();
        assert!(err.to_string().contains("(operation 1)"));
    }
}
