//! TMF dot-path syntax with query-string filters:
//! `/serviceCharacteristic/value?serviceCharacteristic.name=suspensionReason`.
//!
//! The path part walks members positionally, fanning out over every array it
//! crosses. Each `key=value` query pair is expanded the same way and keeps the
//! locations whose scalar value reads as `value`. A candidate survives when,
//! for every pair, some match shares its enclosing array element (one scope
//! is a prefix of the other). Matches in unrelated sibling arrays are not
//! correlated with each other, so two pairs may be satisfied by different
//! elements of the same array.

use std::borrow::Cow;

use indexmap::IndexSet;
use json_patch_query_path::{format_normalized_path, PathComponent};
use percent_encoding::percent_decode_str;
use serde_json::Number;
use tracing::trace;
use url::Url;

use super::Resolver;
use crate::node::Node;
use crate::types::{OpKind, PatchQueryError, Path};

const BASE_URL: &str = "http://localhost/";

pub(crate) struct LegacyResolver;

/// A parsed TMF path.
#[derive(Debug, PartialEq)]
struct TmfPath {
    segments: Vec<String>,
    matchers: Vec<(String, String)>,
}

impl TmfPath {
    fn parse(expr: &str) -> Result<Self, PatchQueryError> {
        let invalid = |e: url::ParseError| PatchQueryError::InvalidPath {
            path: expr.to_string(),
            reason: e.to_string(),
        };
        let url = Url::parse(BASE_URL).and_then(|base| base.join(expr)).map_err(invalid)?;

        let segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
            .flat_map(|segment| dot_segments(&segment))
            .collect();
        let matchers = url
            .query_pairs()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Ok(TmfPath { segments, matchers })
    }
}

fn dot_segments(s: &str) -> Vec<String> {
    s.split('.').filter(|part| !part.is_empty()).map(str::to_string).collect()
}

impl Resolver for LegacyResolver {
    fn resolve(&self, expr: &str, doc: &Node, kind: OpKind) -> Result<Vec<Path>, PatchQueryError> {
        let tmf = TmfPath::parse(expr)?;
        if tmf.matchers.is_empty() {
            return Ok(direct(doc, &tmf.segments, kind));
        }

        let matched: Vec<Vec<Path>> =
            tmf.matchers.iter().map(|(key, value)| find_matches(doc, key, value)).collect();
        for ((key, value), found) in tmf.matchers.iter().zip(&matched) {
            trace!(key = %key, value = %value, matches = found.len(), "query pair expanded");
        }

        let resolved = candidates(doc, &tmf.segments, kind, &matched)
            .into_iter()
            .filter(|candidate| {
                let scope = array_scope(candidate);
                matched.iter().all(|found| found.iter().any(|m| compatible(scope, array_scope(m))))
            })
            .collect::<Vec<_>>();
        for path in &resolved {
            trace!(path = %format_normalized_path(path), "candidate kept");
        }
        Ok(resolved)
    }
}

/// Path without a query string. Numeric segments index arrays; only `add`
/// may address something that does not exist yet.
fn direct(doc: &Node, segments: &[String], kind: OpKind) -> Vec<Path> {
    let mut path = Vec::with_capacity(segments.len());
    let mut node = Some(doc);
    for segment in segments {
        let step = match (node, segment.parse::<usize>()) {
            (Some(Node::Array(_)), Ok(idx)) => PathComponent::Index(idx),
            _ => PathComponent::Key(segment.clone()),
        };
        node = node.and_then(|n| n.get(std::slice::from_ref(&step)));
        path.push(step);
    }
    match (node, kind) {
        (Some(_), _) | (None, OpKind::Add) => vec![path],
        _ => Vec::new(),
    }
}

/// A location reached by positional expansion. `None` marks a final member
/// that does not exist yet.
type Reached<'a> = (Path, Option<&'a Node>);

fn expand<'a>(doc: &'a Node, segments: &[String], missing_tail: bool) -> Vec<Reached<'a>> {
    let mut out = Vec::new();
    walk(doc, Vec::new(), segments, missing_tail, &mut out);
    out
}

fn walk<'a>(node: &'a Node, path: Path, segments: &[String], missing_tail: bool, out: &mut Vec<Reached<'a>>) {
    let Some((segment, rest)) = segments.split_first() else {
        out.push((path, Some(node)));
        return;
    };
    match node {
        Node::Array(items) => match segment.parse::<usize>() {
            Ok(idx) => {
                if let Some(item) = items.get(idx) {
                    walk(item, extend(&path, PathComponent::Index(idx)), rest, missing_tail, out);
                }
            }
            Err(_) => {
                for (idx, item) in items.iter().enumerate() {
                    walk(item, extend(&path, PathComponent::Index(idx)), segments, missing_tail, out);
                }
            }
        },
        Node::Object(map) => match map.get(segment.as_str()) {
            Some(child) if !child.is_marker() => {
                walk(child, extend(&path, PathComponent::Key(segment.clone())), rest, missing_tail, out)
            }
            _ if rest.is_empty() && missing_tail => out.push((extend(&path, PathComponent::Key(segment.clone())), None)),
            _ => {}
        },
        _ => {}
    }
}

/// Locations the path part addresses. A final array is split into its
/// elements when a query match lies inside it: container elements always,
/// scalar elements only for `remove`, so a single string can be dropped from
/// a string array.
fn candidates(doc: &Node, segments: &[String], kind: OpKind, matched: &[Vec<Path>]) -> IndexSet<Path> {
    let inside = |path: &Path| matched.iter().flatten().any(|m| m.len() > path.len() && m.starts_with(path));

    let mut out = IndexSet::new();
    for (path, node) in expand(doc, segments, kind == OpKind::Add) {
        match node {
            Some(Node::Array(items)) if inside(&path) => {
                for (idx, item) in items.iter().enumerate() {
                    if item.is_container() || kind == OpKind::Remove {
                        out.insert(extend(&path, PathComponent::Index(idx)));
                    } else {
                        out.insert(path.clone());
                    }
                }
            }
            _ => {
                out.insert(path);
            }
        }
    }
    out
}

/// Locations of `key` whose value reads as `value`. An array value matches
/// through its members, and the member's own index is recorded.
fn find_matches(doc: &Node, key: &str, value: &str) -> Vec<Path> {
    let mut out = Vec::new();
    for (path, node) in expand(doc, &dot_segments(key), false) {
        match node {
            Some(Node::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    if textual(item).as_deref() == Some(value) {
                        out.push(extend(&path, PathComponent::Index(idx)));
                    }
                }
            }
            Some(other) if textual(other).as_deref() == Some(value) => out.push(path),
            _ => {}
        }
    }
    out
}

/// How a scalar reads in a query string.
fn textual(node: &Node) -> Option<Cow<'_, str>> {
    match node {
        Node::String(s) => Some(Cow::Borrowed(s)),
        Node::Number(n) => Some(Cow::Owned(number_text(n))),
        Node::Bool(b) => Some(Cow::Owned(b.to_string())),
        Node::Null => Some(Cow::Borrowed("null")),
        _ => None,
    }
}

/// Integral floats read without a fraction, so `1.0` matches `1`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

/// Prefix of `path` up to and including its last array index; empty when
/// the path crosses no array.
fn array_scope(path: &[PathComponent]) -> &[PathComponent] {
    match path.iter().rposition(|step| matches!(step, PathComponent::Index(_))) {
        Some(i) => &path[..=i],
        None => &[],
    }
}

fn compatible(a: &[PathComponent], b: &[PathComponent]) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn extend(path: &[PathComponent], step: PathComponent) -> Path {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(step);
    next
}
