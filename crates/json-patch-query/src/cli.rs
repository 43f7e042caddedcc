//! Core of the `json-patch-query` command-line tool.

use serde_json::Value;
use thiserror::Error;

use crate::apply::apply_patch;
use crate::codec::from_json_patch;
use crate::types::{ApplyOptions, PatchQueryError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Patch(#[from] PatchQueryError),
}

/// Apply a patch to a document, both given as JSON text.
///
/// Returns the patched document serialized as JSON, pretty-printed when
/// `pretty` is set.
pub fn apply_json_patch(
    doc_json: &str,
    patch_json: &str,
    options: &ApplyOptions,
    pretty: bool,
) -> Result<String, CliError> {
    let mut doc: Value = serde_json::from_str(doc_json)?;
    let raw: Value = serde_json::from_str(patch_json)?;
    let ops = from_json_patch(&raw)?;
    apply_patch(&mut doc, &ops, options)?;
    let out = if pretty { serde_json::to_string_pretty(&doc)? } else { serde_json::to_string(&doc)? };
    Ok(out)
}
