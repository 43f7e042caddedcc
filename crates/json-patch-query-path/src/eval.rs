//! JSONPath evaluator.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

use crate::node::{Children, QueryNode};
use crate::types::*;

/// JSONPath evaluator.
pub struct JsonPathEval;

/// A matched node together with its location.
type Match<'a, N> = (NormalizedPath, &'a N);

impl JsonPathEval {
    /// Evaluate a JSONPath against a document, returning matching nodes in
    /// document order.
    pub fn eval<'a, N: QueryNode>(path: &JSONPath, doc: &'a N) -> Vec<&'a N> {
        Self::select(path, doc, doc).into_iter().map(|(_, node)| node).collect()
    }

    /// Evaluate a JSONPath and return only the normalized paths of the matches.
    pub fn paths<N: QueryNode>(path: &JSONPath, doc: &N) -> Vec<NormalizedPath> {
        Self::select(path, doc, doc).into_iter().map(|(p, _)| p).collect()
    }

    /// Evaluate a JSONPath returning both nodes and their paths.
    pub fn query<'a, N: QueryNode>(path: &JSONPath, doc: &'a N) -> QueryResult<'a, N> {
        let (paths, values): (Vec<NormalizedPath>, Vec<&'a N>) = Self::select(path, doc, doc).into_iter().unzip();
        QueryResult { values, paths }
    }

    /// Run `path` starting at `start`; `root` is what `$` refers to inside filters.
    fn select<'a, N: QueryNode>(path: &JSONPath, start: &'a N, root: &'a N) -> Vec<Match<'a, N>> {
        let mut current: Vec<Match<'a, N>> = vec![(Vec::new(), start)];

        for segment in &path.segments {
            let mut next = Vec::new();
            for &(ref location, node) in &current {
                if segment.recursive {
                    Self::select_descendants(node, &segment.selectors, location, root, &mut next);
                } else {
                    for selector in &segment.selectors {
                        Self::select_children(node, selector, location, root, &mut next);
                    }
                }
            }
            current = next;
        }

        current
    }

    fn select_descendants<'a, N: QueryNode>(
        node: &'a N,
        selectors: &[Selector],
        location: &[PathComponent],
        root: &'a N,
        out: &mut Vec<Match<'a, N>>,
    ) {
        for selector in selectors {
            Self::select_children(node, selector, location, root, out);
        }

        match node.children() {
            Children::Members(members) => {
                for (key, child) in members {
                    let child_location = extend(location, PathComponent::Key(key.to_string()));
                    Self::select_descendants(child, selectors, &child_location, root, out);
                }
            }
            Children::Elements(elements) => {
                for (idx, child) in elements.into_iter().enumerate() {
                    let child_location = extend(location, PathComponent::Index(idx));
                    Self::select_descendants(child, selectors, &child_location, root, out);
                }
            }
            Children::Leaf => {}
        }
    }

    fn select_children<'a, N: QueryNode>(
        node: &'a N,
        selector: &Selector,
        location: &[PathComponent],
        root: &'a N,
        out: &mut Vec<Match<'a, N>>,
    ) {
        match selector {
            Selector::Name(name) => {
                if let Some(child) = node.member(name) {
                    out.push((extend(location, PathComponent::Key(name.clone())), child));
                }
            }
            Selector::Index(index) => {
                let Some(len) = node.array_len() else { return };
                let Some(idx) = resolve_index(*index, len) else { return };
                if let Some(child) = node.element(idx) {
                    out.push((extend(location, PathComponent::Index(idx)), child));
                }
            }
            Selector::Slice { start, end, step } => {
                let Some(len) = node.array_len() else { return };
                for idx in slice_indices(*start, *end, *step, len) {
                    if let Some(child) = node.element(idx) {
                        out.push((extend(location, PathComponent::Index(idx)), child));
                    }
                }
            }
            Selector::Wildcard => Self::push_children(node, location, out, |_| true),
            Selector::Filter(expr) => {
                Self::push_children(node, location, out, |child| Self::test_filter(expr, child, root))
            }
        }
    }

    fn push_children<'a, N: QueryNode>(
        node: &'a N,
        location: &[PathComponent],
        out: &mut Vec<Match<'a, N>>,
        keep: impl Fn(&'a N) -> bool,
    ) {
        match node.children() {
            Children::Members(members) => {
                for (key, child) in members {
                    if keep(child) {
                        out.push((extend(location, PathComponent::Key(key.to_string())), child));
                    }
                }
            }
            Children::Elements(elements) => {
                for (idx, child) in elements.into_iter().enumerate() {
                    if keep(child) {
                        out.push((extend(location, PathComponent::Index(idx)), child));
                    }
                }
            }
            Children::Leaf => {}
        }
    }

    fn test_filter<N: QueryNode>(expr: &FilterExpression, current: &N, root: &N) -> bool {
        match expr {
            FilterExpression::Existence { anchor, path } => {
                let start = match anchor {
                    Anchor::Current => current,
                    Anchor::Root => root,
                };
                !Self::select(path, start, root).is_empty()
            }
            FilterExpression::Comparison { operator, left, right } => {
                let left = Self::operand(left, current, root);
                let right = Self::operand(right, current, root);
                compare(*operator, left.as_deref(), right.as_deref())
            }
            FilterExpression::Logical { operator, left, right } => match operator {
                LogicalOperator::And => Self::test_filter(left, current, root) && Self::test_filter(right, current, root),
                LogicalOperator::Or => Self::test_filter(left, current, root) || Self::test_filter(right, current, root),
            },
            FilterExpression::Negation(inner) => !Self::test_filter(inner, current, root),
            FilterExpression::Paren(inner) => Self::test_filter(inner, current, root),
        }
    }

    /// Comparison operand. A query yielding anything but exactly one node is
    /// absent (`None`).
    fn operand<'a, N: QueryNode>(expr: &'a ValueExpression, current: &'a N, root: &'a N) -> Option<Cow<'a, Value>> {
        match expr {
            ValueExpression::Literal(value) => Some(Cow::Borrowed(value)),
            ValueExpression::Query { anchor, path } => {
                let start = match anchor {
                    Anchor::Current => current,
                    Anchor::Root => root,
                };
                let mut found = Self::select(path, start, root);
                if found.len() != 1 {
                    return None;
                }
                found.pop().and_then(|(_, node)| node.comparable())
            }
        }
    }
}

fn extend(location: &[PathComponent], step: PathComponent) -> NormalizedPath {
    let mut next = Vec::with_capacity(location.len() + 1);
    next.extend_from_slice(location);
    next.push(step);
    next
}

fn resolve_index(index: isize, len: usize) -> Option<usize> {
    let idx = if index < 0 { len as isize + index } else { index };
    if idx < 0 || idx as usize >= len {
        None
    } else {
        Some(idx as usize)
    }
}

/// Indices selected by `[start:end:step]` per RFC 9535 §2.3.4.2.2.
fn slice_indices(start: Option<isize>, end: Option<isize>, step: Option<isize>, len: usize) -> Vec<usize> {
    let len = len as isize;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }
    let normalize = |i: isize| if i >= 0 { i } else { len + i };

    let mut out = Vec::new();
    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            out.push(i as usize);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    } else {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = end.map(normalize).unwrap_or(-len - 1).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            out.push(i as usize);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    }
    out
}

fn compare(operator: ComparisonOperator, left: Option<&Value>, right: Option<&Value>) -> bool {
    match operator {
        ComparisonOperator::Equal => values_equal(left, right),
        ComparisonOperator::NotEqual => !values_equal(left, right),
        ComparisonOperator::Less => order(left, right) == Some(Ordering::Less),
        ComparisonOperator::LessEqual => {
            matches!(order(left, right), Some(Ordering::Less | Ordering::Equal))
        }
        ComparisonOperator::Greater => order(left, right) == Some(Ordering::Greater),
        ComparisonOperator::GreaterEqual => {
            matches!(order(left, right), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => json_equal(l, r),
        _ => false,
    }
}

/// Structural equality with numbers compared by value, so `1` equals `1.0`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        _ => a == b,
    }
}

fn order(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    match (left?, right?) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
