//! JSONPath parser.
//!
//! Accepts RFC 9535 syntax plus the bracketed filter form `[?(...)]` and
//! backtick-escaped member names (`` $.`@href ``).

use serde_json::{Number, Value};
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected root identifier '$' at start")]
    ExpectedRoot,
    #[error("Unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid selector at offset {0}")]
    InvalidSelector(usize),
}

struct ComparisonToken {
    operator: ComparisonOperator,
    len: usize,
}

/// JSONPath parser.
pub struct JsonPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> JsonPathParser<'a> {
    /// Parse a JSONPath expression that starts with `$`.
    pub fn parse(input: &'a str) -> Result<JSONPath, ParseError> {
        Self { input, pos: 0 }.parse_path()
    }

    /// Parse an expression whose leading `$` may be omitted.
    ///
    /// `note[?(@.a == 1)]` reads as `$.note[?(@.a == 1)]`, `[0]` as `$[0]`
    /// and the empty string as `$`.
    pub fn parse_relaxed(input: &str) -> Result<JSONPath, ParseError> {
        let trimmed = input.trim();
        if trimmed.starts_with('$') {
            return JsonPathParser::parse(trimmed);
        }
        if trimmed.is_empty() {
            return Ok(JSONPath::default());
        }
        let absolute = if trimmed.starts_with('[') || trimmed.starts_with('.') {
            format!("${trimmed}")
        } else {
            format!("$.{trimmed}")
        };
        JsonPathParser::parse(&absolute)
    }

    fn parse_path(&mut self) -> Result<JSONPath, ParseError> {
        if !self.eat('$') {
            return Err(ParseError::ExpectedRoot);
        }
        let segments = self.segments(false)?;
        self.skip_whitespace();
        match self.peek() {
            Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
            None => Ok(JSONPath::new(segments)),
        }
    }

    /// `.name`, `..name`, `.*` and `[...]` segments, as many as follow.
    /// Inside a filter the run also ends at an operator or closing bracket.
    fn segments(&mut self, in_filter: bool) -> Result<Vec<PathSegment>, ParseError> {
        let mut out = Vec::new();
        loop {
            if in_filter {
                self.skip_whitespace();
                if self.is_filter_path_terminator() {
                    return Ok(out);
                }
            }
            let segment = if self.eat('.') {
                if self.eat('.') {
                    PathSegment::new(self.descendant_selectors()?, true)
                } else if self.eat('*') {
                    PathSegment::new(vec![Selector::Wildcard], false)
                } else {
                    PathSegment::new(vec![Selector::Name(self.member_name()?)], false)
                }
            } else if self.peek() == Some('[') {
                PathSegment::new(self.bracketed()?, false)
            } else {
                return Ok(out);
            };
            out.push(segment);
        }
    }

    fn descendant_selectors(&mut self) -> Result<Vec<Selector>, ParseError> {
        if self.eat('*') {
            return Ok(vec![Selector::Wildcard]);
        }
        if self.peek() == Some('[') {
            return self.bracketed();
        }
        Ok(vec![Selector::Name(self.member_name()?)])
    }

    /// `[sel, sel, ...]`
    fn bracketed(&mut self) -> Result<Vec<Selector>, ParseError> {
        self.expect('[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.selector()?);
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(selectors);
            }
            self.expect(',')?;
        }
    }

    fn selector(&mut self) -> Result<Selector, ParseError> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('\'' | '"') => self.quoted().map(Selector::Name),
            Some('*') => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            Some('?') => {
                self.advance();
                self.filter().map(Selector::Filter)
            }
            Some(':' | '-' | '0'..='9') => self.index_or_slice(),
            Some(_) => Err(ParseError::InvalidSelector(self.pos)),
        }
    }

    fn index_or_slice(&mut self) -> Result<Selector, ParseError> {
        let start = self.integer()?;
        if !self.eat(':') {
            return start.map(Selector::Index).ok_or(ParseError::InvalidNumber);
        }
        let end = self.integer()?;
        let step = if self.eat(':') { self.integer()? } else { None };
        Ok(Selector::Slice { start, end, step })
    }

    /// Optional signed integer, surrounding whitespace skipped.
    fn integer(&mut self) -> Result<Option<isize>, ParseError> {
        self.skip_whitespace();
        if !matches!(self.peek(), Some('-' | '0'..='9')) {
            return Ok(None);
        }
        let start = self.pos;
        self.eat('-');
        self.digits();
        let value = self.input[start..self.pos].parse().map_err(|_| ParseError::InvalidNumber)?;
        self.skip_whitespace();
        Ok(Some(value))
    }

    /// Member name after a dot. A leading backtick takes the rest of the
    /// segment literally, so names like `@href` or `$ref` can be addressed.
    fn member_name(&mut self) -> Result<String, ParseError> {
        let escaped = self.eat('`');
        let start = self.pos;
        while let Some(c) = self.peek() {
            let part_of_name = if escaped {
                !(c.is_whitespace() || ".[]()=!<>&|,".contains(c))
            } else {
                c.is_alphanumeric() || c == '_' || c == '-'
            };
            if !part_of_name {
                break;
            }
            self.advance();
        }
        if self.pos > start {
            return Ok(self.input[start..self.pos].to_string());
        }
        match self.peek() {
            Some(c) if !escaped => Err(ParseError::UnexpectedChar(c, self.pos)),
            _ => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Single- or double-quoted string literal.
    fn quoted(&mut self) -> Result<String, ParseError> {
        let quote = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        self.advance();
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or(ParseError::UnclosedString)?;
            self.advance();
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = self.peek().and_then(unescape).ok_or(ParseError::InvalidEscape)?;
            out.push(escaped);
            self.advance();
        }
    }

    // ── Filters ───────────────────────────────────────────────────────────
    // Precedence, loosest first: `||`, `&&`, `!` / parentheses, comparison.

    fn filter(&mut self) -> Result<FilterExpression, ParseError> {
        self.logical("||", LogicalOperator::Or, Self::conjunction)
    }

    fn conjunction(&mut self) -> Result<FilterExpression, ParseError> {
        self.logical("&&", LogicalOperator::And, Self::unary)
    }

    /// Left-associative chain of `operand (token operand)*`.
    fn logical(
        &mut self,
        token: &str,
        operator: LogicalOperator,
        operand: fn(&mut Self) -> Result<FilterExpression, ParseError>,
    ) -> Result<FilterExpression, ParseError> {
        let mut expr = operand(self)?;
        self.skip_whitespace();
        while self.eat_str(token) {
            let right = operand(self)?;
            expr = FilterExpression::Logical { operator, left: Box::new(expr), right: Box::new(right) };
            self.skip_whitespace();
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<FilterExpression, ParseError> {
        self.skip_whitespace();
        if !self.peek_str("!=") && self.eat('!') {
            return Ok(FilterExpression::Negation(Box::new(self.unary()?)));
        }
        if self.eat('(') {
            let inner = self.filter()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(FilterExpression::Paren(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<FilterExpression, ParseError> {
        let left = self.operand()?;
        self.skip_whitespace();
        if let Some(op) = self.peek_comparison_operator() {
            self.advance_by(op.len);
            let right = self.operand()?;
            return Ok(FilterExpression::Comparison { operator: op.operator, left, right });
        }
        // A bare query tests for existence.
        match left {
            ValueExpression::Query { anchor, path } => Ok(FilterExpression::Existence { anchor, path }),
            ValueExpression::Literal(_) => Err(ParseError::InvalidSelector(self.pos)),
        }
    }

    fn operand(&mut self) -> Result<ValueExpression, ParseError> {
        self.skip_whitespace();
        let anchor = match self.peek() {
            None => return Err(ParseError::UnexpectedEnd),
            Some('@') => Anchor::Current,
            Some('$') => Anchor::Root,
            Some('\'' | '"') => return Ok(ValueExpression::Literal(Value::String(self.quoted()?))),
            Some('-' | '0'..='9') => return self.number().map(ValueExpression::Literal),
            Some(_) => {
                let keyword = [("true", Value::Bool(true)), ("false", Value::Bool(false)), ("null", Value::Null)]
                    .into_iter()
                    .find(|(word, _)| self.peek_str(word));
                return match keyword {
                    Some((word, value)) => {
                        self.advance_by(word.len());
                        Ok(ValueExpression::Literal(value))
                    }
                    None => Err(ParseError::InvalidSelector(self.pos)),
                };
            }
        };
        self.advance();
        let path = JSONPath::new(self.segments(true)?);
        Ok(ValueExpression::Query { anchor, path })
    }

    /// Integers stay integers so that equality with integral document values
    /// is exact; anything with a fraction or exponent becomes `f64`.
    fn number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        self.eat('-');
        if self.digits() == 0 {
            return Err(ParseError::InvalidNumber);
        }
        let mut fractional = false;
        if self.eat('.') {
            fractional = true;
            if self.digits() == 0 {
                return Err(ParseError::InvalidNumber);
            }
        }
        if self.eat('e') || self.eat('E') {
            fractional = true;
            let _ = self.eat('+') || self.eat('-');
            if self.digits() == 0 {
                return Err(ParseError::InvalidNumber);
            }
        }

        let text = &self.input[start..self.pos];
        let number = if fractional {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else {
            text.parse::<i64>().ok().map(Number::from)
        };
        number.map(Value::Number).ok_or(ParseError::InvalidNumber)
    }

    fn is_filter_path_terminator(&self) -> bool {
        match self.peek() {
            None => true,
            Some(')') | Some(',') | Some(']') => true,
            Some('&') => self.peek_str("&&"),
            Some('|') => self.peek_str("||"),
            Some('=') => self.peek_str("=="),
            Some('!') => self.peek_str("!="),
            Some('<') | Some('>') => true,
            _ => false,
        }
    }

    fn peek_comparison_operator(&self) -> Option<ComparisonToken> {
        let operators = [
            ("==", ComparisonOperator::Equal),
            ("!=", ComparisonOperator::NotEqual),
            ("<=", ComparisonOperator::LessEqual),
            (">=", ComparisonOperator::GreaterEqual),
            ("<", ComparisonOperator::Less),
            (">", ComparisonOperator::Greater),
        ];
        operators
            .iter()
            .find(|(token, _)| self.peek_str(token))
            .map(|(token, operator)| ComparisonToken { operator: *operator, len: token.len() })
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eat(&mut self, expected: char) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.advance();
        }
        found
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let found = self.peek_str(expected);
        if found {
            self.pos += expected.len();
        }
        found
    }

    /// Consume ASCII digits, returning how many.
    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        self.pos - start
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(self.peek().map_or(ParseError::UnexpectedEnd, |c| ParseError::UnexpectedChar(c, self.pos)))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }
}

fn unescape(c: char) -> Option<char> {
    Some(match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '/' | '\\' | '\'' | '"' => c,
        _ => return None,
    })
}
