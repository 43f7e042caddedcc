//! Turning a path expression into concrete locations.
//!
//! Both addressing syntaxes produce the same [`Path`] list, so the mutation
//! logic in [`crate::apply`] is shared between them.

mod legacy;
mod query;

pub(crate) use legacy::LegacyResolver;
pub(crate) use query::QueryResolver;

use crate::node::Node;
use crate::types::{OpKind, PatchQueryError, Path};

pub(crate) trait Resolver {
    /// Every concrete path `expr` addresses in `doc`, in document order.
    fn resolve(&self, expr: &str, doc: &Node, kind: OpKind) -> Result<Vec<Path>, PatchQueryError>;

    /// Called when an `add` resolved nothing. May create the missing target
    /// (as a placeholder) and return its location.
    fn vivify(&self, _expr: &str, _doc: &mut Node) -> Result<Vec<Path>, PatchQueryError> {
        Ok(Vec::new())
    }
}
