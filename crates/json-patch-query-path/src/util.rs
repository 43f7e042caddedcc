//! JSONPath printing and expression-splitting helpers.

use std::sync::OnceLock;

use crate::types::*;

/// Convert a JSONPath AST back to its string form.
pub fn json_path_to_string(path: &JSONPath) -> String {
    let mut out = String::from("$");
    push_segments(&mut out, path);
    out
}

/// Format a normalized path as `$['a'][0]['b']`.
pub fn format_normalized_path(path: &[PathComponent]) -> String {
    let mut out = String::from("$");
    for step in path {
        match step {
            PathComponent::Key(key) => {
                out.push_str("['");
                out.push_str(&escape_single_quoted(key));
                out.push_str("']");
            }
            PathComponent::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Split an expression into everything before its final top-level dot
/// segment and that segment itself.
///
/// Dots inside brackets, parentheses and quoted strings are ignored, as is a
/// trailing recursive-descent segment. An expression without any top-level
/// dot and without a root marker is a single member of the root:
///
/// ```
/// use json_patch_query_path::split_trailing_member;
///
/// assert_eq!(
///     split_trailing_member("$.items[?(@.id=='a.b')].owner"),
///     Some(("$.items[?(@.id=='a.b')]", "owner")),
/// );
/// assert_eq!(split_trailing_member("status"), Some(("", "status")));
/// assert_eq!(split_trailing_member("$..name"), None);
/// assert_eq!(split_trailing_member("$"), None);
/// ```
pub fn split_trailing_member(expr: &str) -> Option<(&str, &str)> {
    let expr = expr.trim();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut last_dot: Option<usize> = None;
    let mut prev: Option<char> = None;

    for (i, c) in expr.char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                '.' if depth == 0 => last_dot = Some(i),
                _ => {}
            },
        }
        prev = Some(c);
    }

    match last_dot {
        Some(i) => {
            if i > 0 && expr[..i].ends_with('.') {
                return None;
            }
            let member = &expr[i + 1..];
            if member.is_empty() {
                None
            } else {
                Some((&expr[..i], member))
            }
        }
        None if !expr.starts_with('$') && !expr.is_empty() && !expr.contains('[') => Some(("", expr)),
        None => None,
    }
}

fn static_member_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^(?:[\w-]+|`[^.\[\]()\s]+)$").unwrap())
}

/// Whether a dot segment names one fixed member: a plain identifier, or any
/// name escaped with a leading backtick.
pub fn is_static_member(segment: &str) -> bool {
    static_member_regex().is_match(segment)
}

/// The member name a static dot segment addresses (backtick removed).
pub fn member_name(segment: &str) -> &str {
    segment.strip_prefix('`').unwrap_or(segment)
}

fn push_segments(out: &mut String, path: &JSONPath) {
    for segment in &path.segments {
        if segment.recursive {
            out.push_str("..");
        }
        if let [selector] = segment.selectors.as_slice() {
            push_single_selector(out, selector, segment.recursive);
        } else {
            out.push('[');
            let parts: Vec<String> = segment.selectors.iter().map(bracket_selector).collect();
            out.push_str(&parts.join(","));
            out.push(']');
        }
    }
}

fn push_single_selector(out: &mut String, selector: &Selector, recursive: bool) {
    match selector {
        Selector::Name(name) if is_identifier(name) => {
            if !recursive {
                out.push('.');
            }
            out.push_str(name);
        }
        Selector::Wildcard => {
            if !recursive {
                out.push('.');
            }
            out.push('*');
        }
        other => {
            out.push('[');
            out.push_str(&bracket_selector(other));
            out.push(']');
        }
    }
}

fn bracket_selector(selector: &Selector) -> String {
    match selector {
        Selector::Name(name) => format!("'{}'", escape_single_quoted(name)),
        Selector::Index(index) => index.to_string(),
        Selector::Slice { start, end, step } => {
            let mut s = String::new();
            if let Some(v) = start {
                s.push_str(&v.to_string());
            }
            s.push(':');
            if let Some(v) = end {
                s.push_str(&v.to_string());
            }
            if let Some(v) = step {
                s.push(':');
                s.push_str(&v.to_string());
            }
            s
        }
        Selector::Wildcard => String::from("*"),
        Selector::Filter(expr) => format!("?{}", filter_to_string(expr)),
    }
}

fn filter_to_string(expr: &FilterExpression) -> String {
    match expr {
        FilterExpression::Comparison { operator, left, right } => {
            format!("{} {} {}", operand_to_string(left), operator.as_str(), operand_to_string(right))
        }
        FilterExpression::Logical { operator, left, right } => {
            let op = match operator {
                LogicalOperator::And => "&&",
                LogicalOperator::Or => "||",
            };
            format!("{} {} {}", filter_to_string(left), op, filter_to_string(right))
        }
        FilterExpression::Existence { anchor, path } => query_to_string(*anchor, path),
        FilterExpression::Paren(inner) => format!("({})", filter_to_string(inner)),
        FilterExpression::Negation(inner) => format!("!{}", filter_to_string(inner)),
    }
}

fn operand_to_string(expr: &ValueExpression) -> String {
    match expr {
        ValueExpression::Literal(serde_json::Value::String(s)) => format!("'{}'", escape_single_quoted(s)),
        ValueExpression::Literal(v) => v.to_string(),
        ValueExpression::Query { anchor, path } => query_to_string(*anchor, path),
    }
}

fn query_to_string(anchor: Anchor, path: &JSONPath) -> String {
    let mut out = String::from(match anchor {
        Anchor::Current => "@",
        Anchor::Root => "$",
    });
    push_segments(&mut out, path);
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonPathParser;

    fn roundtrip(s: &str) -> String {
        json_path_to_string(&JsonPathParser::parse(s).unwrap())
    }

    #[test]
    fn stringify_basic_and_recursive_paths() {
        assert_eq!(roundtrip("$.store.*..title"), "$.store.*..title");
        assert_eq!(roundtrip("$['a b'][0][1:3]"), "$['a b'][0][1:3]");
        assert_eq!(roundtrip("$.`@href"), "$['@href']");
    }

    #[test]
    fn stringify_filters() {
        assert_eq!(
            roundtrip(r#"$.note[?(@.author=="John Doe" && @.n > 2)]"#),
            "$.note[?(@.author == 'John Doe' && @.n > 2)]"
        );
        assert_eq!(roundtrip("$[?(!@.nested[?(@.x)])]"), "$[?(!@.nested[?(@.x)])]");
    }

    #[test]
    fn normalized_path_format() {
        let path = vec![PathComponent::Key("note".into()), PathComponent::Index(1), PathComponent::Key("it's".into())];
        assert_eq!(format_normalized_path(&path), "$['note'][1]['it\\'s']");
        assert_eq!(format_normalized_path(&[]), "$");
    }

    #[test]
    fn trailing_member_split_respects_nesting() {
        assert_eq!(
            split_trailing_member("$.a[?(@.b.c == 'x.y')].d.`@e"),
            Some(("$.a[?(@.b.c == 'x.y')].d", "`@e"))
        );
        assert_eq!(split_trailing_member("$.a[0]"), Some(("$", "a[0]")));
        assert_eq!(split_trailing_member("a[?(@.b)]"), None);
        assert_eq!(split_trailing_member("$.a."), None);
    }

    #[test]
    fn static_members() {
        assert!(is_static_member("serviceRelationship"));
        assert!(is_static_member("`@href"));
        assert!(is_static_member("valid-name_2"));
        assert!(!is_static_member("a[0]"));
        assert!(!is_static_member("*"));
        assert!(!is_static_member("@href"));
        assert!(!is_static_member("items[?(@.id=='x')]"));
        assert_eq!(member_name("`@href"), "@href");
        assert_eq!(member_name("plain"), "plain");
    }
}
