//! Patch application.
//!
//! Every operation is resolved to zero or more concrete paths and then
//! applied to each of them in resolution order. Array elements removed by
//! one operation are first tombstoned and compacted once the operation has
//! visited all of its targets, so sibling indices stay valid meanwhile.

use indexmap::IndexSet;
use json_patch_query_path::format_normalized_path;
use serde_json::Value;
use tracing::{debug, trace};

use crate::node::Node;
use crate::resolve::{LegacyResolver, QueryResolver, Resolver};
use crate::types::{ApplyOptions, OpKind, Operation, PatchQueryError, Path, Syntax};

// ── Public entry points ───────────────────────────────────────────────────

/// Apply `ops` to `doc` using JSONPath filter expressions.
///
/// Stops at the first failing operation. Operations before it stay applied.
pub fn apply(doc: &mut Value, ops: &[Operation]) -> Result<(), PatchQueryError> {
    apply_with(doc, ops, &QueryResolver)
}

/// Apply `ops` to `doc` using TMF dot paths with query-string filters.
pub fn apply_legacy(doc: &mut Value, ops: &[Operation]) -> Result<(), PatchQueryError> {
    apply_with(doc, ops, &LegacyResolver)
}

/// Apply `ops` with explicit options. With `atomic` set, `doc` is restored
/// to its original content when any operation fails.
pub fn apply_patch(doc: &mut Value, ops: &[Operation], options: &ApplyOptions) -> Result<(), PatchQueryError> {
    let snapshot = options.atomic.then(|| doc.clone());
    let result = match options.syntax {
        Syntax::Query => apply(doc, ops),
        Syntax::Legacy => apply_legacy(doc, ops),
    };
    if let (Err(err), Some(original)) = (&result, snapshot) {
        debug!(error = %err, "restoring document");
        *doc = original;
    }
    result
}

/// Value at a JSONPath expression that must match exactly one node.
pub fn get(doc: &Value, path: &str) -> Result<Value, PatchQueryError> {
    let root = Node::from(doc.clone());
    get_one(&root, path, &QueryResolver).map(Node::into_value)
}

// ── Engine ────────────────────────────────────────────────────────────────

fn apply_with<R: Resolver>(doc: &mut Value, ops: &[Operation], resolver: &R) -> Result<(), PatchQueryError> {
    let mut root = Node::from(std::mem::take(doc));
    let result = ops.iter().try_for_each(|op| apply_op(&mut root, op, resolver));
    root.retain_live(&[]);
    *doc = root.into_value();
    result
}

fn apply_op<R: Resolver>(root: &mut Node, op: &Operation, resolver: &R) -> Result<(), PatchQueryError> {
    debug!(op = op.op_name(), path = op.path(), from = op.from(), "applying operation");
    match op {
        Operation::Add { path, value } => add(root, path, Node::from(value.clone()), resolver),
        Operation::Remove { path } => remove(root, path, resolver),
        Operation::Replace { path, value } => replace(root, path, Node::from(value.clone()), resolver),
        Operation::Test { path, value } => test(root, path, value, resolver),
        Operation::Copy { from, path } => {
            let value = get_one(root, from, resolver)?;
            add(root, path, value, resolver)
        }
        Operation::Move { from, path } => {
            let value = get_one(root, from, resolver)?;
            remove(root, from, resolver)?;
            add(root, path, value, resolver)
        }
    }
}

/// Resolve `expr` for a mutating operation. Nothing found is an error,
/// except that an `add` first gets a chance to create its target.
fn targets<R: Resolver>(root: &mut Node, expr: &str, kind: OpKind, resolver: &R) -> Result<Vec<Path>, PatchQueryError> {
    let mut paths = resolver.resolve(expr, root, kind)?;
    if paths.is_empty() && kind == OpKind::Add {
        paths = resolver.vivify(expr, root)?;
    }
    debug!(op = kind.as_str(), path = expr, resolved = paths.len(), "resolved");
    if paths.is_empty() {
        return Err(PatchQueryError::PathNotFound { path: expr.to_string() });
    }
    Ok(paths)
}

fn get_one<R: Resolver>(root: &Node, expr: &str, resolver: &R) -> Result<Node, PatchQueryError> {
    let paths = resolver.resolve(expr, root, OpKind::Get)?;
    match paths.as_slice() {
        [path] => root
            .get(path)
            .cloned()
            .ok_or_else(|| PatchQueryError::PathNotFound { path: expr.to_string() }),
        [] => Err(PatchQueryError::PathNotFound { path: expr.to_string() }),
        _ => Err(PatchQueryError::AmbiguousPath { path: expr.to_string() }),
    }
}

/// Arrays get `value` appended, objects get an object `value` merged in,
/// anything else (including a missing target) is overwritten.
fn add<R: Resolver>(root: &mut Node, expr: &str, value: Node, resolver: &R) -> Result<(), PatchQueryError> {
    for path in targets(root, expr, OpKind::Add, resolver)? {
        match (root.get_mut(&path), &value) {
            (Some(Node::Array(items)), _) => items.push(value.clone()),
            (Some(Node::Object(target)), Node::Object(incoming)) => {
                for (key, member) in incoming {
                    target.insert(key.clone(), member.clone());
                }
            }
            _ => root.set(&path, value.clone()),
        }
    }
    Ok(())
}

fn remove<R: Resolver>(root: &mut Node, expr: &str, resolver: &R) -> Result<(), PatchQueryError> {
    let mut modified: IndexSet<Path> = IndexSet::new();
    for path in targets(root, expr, OpKind::Remove, resolver)? {
        let Some((last, parent)) = path.split_last() else {
            trace!("removing the document root is a no-op");
            continue;
        };
        match root.get_mut(parent) {
            Some(Node::Array(items)) => {
                let slot = last.as_index().or_else(|| last.to_string().parse().ok());
                if let Some(item) = slot.and_then(|i| items.get_mut(i)) {
                    *item = Node::Tombstone;
                    modified.insert(parent.to_vec());
                }
            }
            _ => {
                root.unset(&path);
            }
        }
    }
    compact(root, modified);
    Ok(())
}

/// Drop tombstones from every array touched by one `remove`, innermost
/// first so outer paths stay valid.
fn compact(root: &mut Node, modified: IndexSet<Path>) {
    let mut arrays: Vec<Path> = modified.into_iter().collect();
    arrays.sort_by(|a, b| b.len().cmp(&a.len()));
    for array in &arrays {
        let dropped = root.retain_live(array);
        trace!(array = %format_normalized_path(array), dropped, "compacted");
    }
}

fn replace<R: Resolver>(root: &mut Node, expr: &str, value: Node, resolver: &R) -> Result<(), PatchQueryError> {
    for path in targets(root, expr, OpKind::Replace, resolver)? {
        root.set(&path, value.clone());
    }
    Ok(())
}

fn test<R: Resolver>(root: &mut Node, expr: &str, expected: &Value, resolver: &R) -> Result<(), PatchQueryError> {
    for path in targets(root, expr, OpKind::Test, resolver)? {
        let actual = root.get(&path);
        if !actual.is_some_and(|node| node.deep_equal(expected)) {
            return Err(PatchQueryError::TestFailed {
                path: expr.to_string(),
                expected: expected.clone(),
                actual: actual.map(Node::to_value),
            });
        }
    }
    Ok(())
}
