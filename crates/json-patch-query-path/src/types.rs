//! JSONPath query types.

use std::fmt;

use serde_json::Value;

/// One selector inside a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Named selector for property access: `.name`, `` .`@name ``, `['key']`
    Name(String),
    /// Array position, negative from the end: `[0]`, `[-1]`
    Index(isize),
    /// `[start:end:step]`
    Slice { start: Option<isize>, end: Option<isize>, step: Option<isize> },
    /// Wildcard selector for selecting all children: `.*`, `[*]`
    Wildcard,
    /// Filter selector: `[?(@.price < 10)]` or `[?@.price < 10]`
    Filter(FilterExpression),
}

/// `.name`, `[a, b]` or `..name`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub selectors: Vec<Selector>,
    /// Descendant segment (`..`).
    pub recursive: bool,
}

impl PathSegment {
    pub fn new(selectors: Vec<Selector>, recursive: bool) -> Self {
        Self { selectors, recursive }
    }
}

/// Complete JSONPath expression. The root marker is implicit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JSONPath {
    pub segments: Vec<PathSegment>,
}

impl JSONPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

/// Node a query inside a filter starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `@`
    Current,
    /// `$`
    Root,
}

/// Body of a `[?...]` selector.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// `@.price < 10`
    Comparison {
        operator: ComparisonOperator,
        left: ValueExpression,
        right: ValueExpression,
    },
    /// `@.a && @.b`
    Logical {
        operator: LogicalOperator,
        left: Box<FilterExpression>,
        right: Box<FilterExpression>,
    },
    /// Existence test: `@.name`, `@.items[?(@.done == true)]`
    Existence { anchor: Anchor, path: JSONPath },
    /// `(@.a || @.b)`
    Paren(Box<FilterExpression>),
    /// `!@.flag`
    Negation(Box<FilterExpression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And, // &&
    Or,  // ||
}

/// Operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpression {
    /// `"string"`, `42`, `true`, `null`
    Literal(Value),
    /// Singular query: `@`, `@.name`, `$.config.limit`
    Query { anchor: Anchor, path: JSONPath },
}

/// One step of a normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathComponent {
    Key(String),
    Index(usize),
}

impl PathComponent {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathComponent::Index(i) => Some(*i),
            PathComponent::Key(_) => None,
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathComponent::Key(key) => f.write_str(key),
            PathComponent::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathComponent {
    fn from(key: &str) -> Self {
        PathComponent::Key(key.to_string())
    }
}

impl From<usize> for PathComponent {
    fn from(idx: usize) -> Self {
        PathComponent::Index(idx)
    }
}

/// Concrete location of one node, root marker stripped.
pub type NormalizedPath = Vec<PathComponent>;

/// Matched nodes with their locations.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a, N> {
    /// The matched nodes.
    pub values: Vec<&'a N>,
    /// Normalized paths to the matched nodes, parallel to `values`.
    pub paths: Vec<NormalizedPath>,
}
