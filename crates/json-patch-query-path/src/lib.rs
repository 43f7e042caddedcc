//! JSONPath parsing and evaluation with normalized path output.
//!
//! Expressions follow [RFC 9535](https://www.rfc-editor.org/rfc/rfc9535.html)
//! and additionally accept the bracketed filter form `[?(...)]`, an implied
//! root (`note[?(@.author=="x")]`) and backtick-escaped member names.
//! Evaluation is generic over [`QueryNode`], so any JSON-like tree can be
//! queried; [`serde_json::Value`] works out of the box.
//!
//! # Example
//!
//! ```
//! use json_patch_query_path::{JsonPathEval, JsonPathParser, PathComponent};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "note": [
//!         {"author": "Arthur Evans"},
//!         {"author": "John Doe"}
//!     ]
//! });
//!
//! let path = JsonPathParser::parse_relaxed(r#"note[?(@.author=="John Doe")]"#).unwrap();
//! let paths = JsonPathEval::paths(&path, &doc);
//! assert_eq!(paths, vec![vec![PathComponent::Key("note".into()), PathComponent::Index(1)]]);
//! ```

mod types;
pub use types::*;

mod node;
pub use node::{Children, QueryNode};

mod parser;
pub use parser::{JsonPathParser, ParseError};

mod eval;
pub use eval::{json_equal, JsonPathEval};

mod util;
pub use util::{
    format_normalized_path, is_static_member, json_path_to_string, member_name, split_trailing_member,
};
