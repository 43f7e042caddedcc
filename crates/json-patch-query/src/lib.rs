//! JSON Patch whose paths are queries.
//!
//! Each operation's `path` (and `from`) may match any number of nodes: the
//! operation is applied to all of them. Two addressing syntaxes are
//! supported:
//!
//! - [`apply`]: JSONPath filter expressions, e.g.
//!   `serviceCharacteristic[?(@.name=="suspensionReason")].value`
//! - [`apply_legacy`]: TMF dot paths with query-string filters, e.g.
//!   `/serviceCharacteristic/value?serviceCharacteristic.name=suspensionReason`
//!
//! ```
//! use json_patch_query::{apply, Operation};
//! use serde_json::json;
//!
//! let mut doc = json!({
//!     "id": "1",
//!     "note": [{"author": "Arthur Evans"}, {"author": "John Doe"}]
//! });
//! let ops = [Operation::Add {
//!     path: r#"note[?(@.author=="John Doe")]"#.into(),
//!     value: json!({"text": "Informed"}),
//! }];
//! apply(&mut doc, &ops).unwrap();
//! assert_eq!(doc["note"][1], json!({"author": "John Doe", "text": "Informed"}));
//! ```

pub mod types;
pub use types::{ApplyOptions, Operation, PatchQueryError, Path, PathComponent, Syntax};

mod node;
mod resolve;

pub mod apply;
pub use apply::{apply, apply_legacy, apply_patch, get};

pub mod codec;
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};

pub mod cli;
