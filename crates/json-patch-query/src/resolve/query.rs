//! JSONPath filter-expression syntax: `note[?(@.author=="John Doe")].text`.

use json_patch_query_path::{
    format_normalized_path, is_static_member, member_name, split_trailing_member, JSONPath, JsonPathEval,
    JsonPathParser, PathComponent,
};
use tracing::trace;

use super::Resolver;
use crate::node::Node;
use crate::types::{OpKind, PatchQueryError, Path};

pub(crate) struct QueryResolver;

impl QueryResolver {
    fn parse(expr: &str) -> Result<JSONPath, PatchQueryError> {
        JsonPathParser::parse_relaxed(expr).map_err(|e| PatchQueryError::InvalidPath {
            path: expr.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Resolver for QueryResolver {
    fn resolve(&self, expr: &str, doc: &Node, _kind: OpKind) -> Result<Vec<Path>, PatchQueryError> {
        let path = Self::parse(expr)?;
        Ok(JsonPathEval::paths(&path, doc))
    }

    /// Auto-vivification: when the last dot segment of `expr` is a static
    /// member name, insert a placeholder for it under every object the rest of
    /// the expression resolves to and query again.
    fn vivify(&self, expr: &str, doc: &mut Node) -> Result<Vec<Path>, PatchQueryError> {
        let Some((parent_expr, member)) = split_trailing_member(expr) else {
            return Ok(Vec::new());
        };
        if !is_static_member(member) {
            return Ok(Vec::new());
        }
        let name = member_name(member);

        let parents = match parent_expr {
            "" | "$" => vec![Vec::new()],
            _ => self.resolve(parent_expr, doc, OpKind::Get)?,
        };

        let mut inserted: Vec<Path> = Vec::new();
        for parent in parents {
            if let Some(Node::Object(map)) = doc.get_mut(&parent) {
                if !map.contains_key(name) {
                    map.insert(name.to_string(), Node::Placeholder);
                    let mut location = parent;
                    location.push(PathComponent::Key(name.to_string()));
                    trace!(path = %format_normalized_path(&location), "placeholder inserted");
                    inserted.push(location);
                }
            }
        }
        if inserted.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.resolve(expr, doc, OpKind::Add)?;
        if found.is_empty() {
            for location in &inserted {
                doc.unset(location);
            }
        }
        Ok(found)
    }
}
