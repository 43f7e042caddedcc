#![allow(dead_code)]

pub mod fixtures;

use json_patch_query::{from_json_patch, Operation};
use serde_json::Value;

/// Decode a patch literal, panicking on malformed input.
pub fn patch(ops: Value) -> Vec<Operation> {
    from_json_patch(&ops).unwrap_or_else(|e| panic!("bad patch literal: {e}"))
}
