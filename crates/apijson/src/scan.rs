//! JSON scanner producing a borrowed tree that remembers the source text of
//! every node.
//!
//! Number literals stay as text so integer targets can be parsed without a
//! detour through `f64`, and opaque JSON-text targets can keep the exact
//! substring they were decoded from.

use std::borrow::Cow;

use crate::error::SyntaxError;

/// A parsed JSON value plus the slice of input it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    raw: &'a str,
    value: NodeValue<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue<'a> {
    Null,
    Bool(bool),
    /// Literal text of the number, already validated against the JSON grammar.
    Number(&'a str),
    String(Cow<'a, str>),
    Array(Vec<Node<'a>>),
    /// Members in source order, duplicates included.
    Object(Vec<(Cow<'a, str>, Node<'a>)>),
}

impl<'a> Node<'a> {
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn value(&self) -> &NodeValue<'a> {
        &self.value
    }

    pub fn kind(&self) -> &'static str {
        match self.value {
            NodeValue::Null => "null",
            NodeValue::Bool(_) => "boolean",
            NodeValue::Number(_) => "number",
            NodeValue::String(_) => "string",
            NodeValue::Array(_) => "array",
            NodeValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, NodeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up an object member. The last occurrence of a duplicated key wins,
    /// matching the order in which members are decoded.
    pub fn member(&self, key: &str) -> Option<&Node<'a>> {
        match &self.value {
            NodeValue::Object(members) => members
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, node)| node),
            _ => None,
        }
    }
}

/// Parses `text` into a tree. Empty or whitespace-only input yields `None`.
pub fn parse(text: &str, max_depth: usize) -> Result<Option<Node<'_>>, SyntaxError> {
    let mut scanner = Scanner::new(text, max_depth);
    scanner.skip_whitespace();
    if scanner.at_end() {
        return Ok(None);
    }
    let node = scanner.read_any()?;
    scanner.skip_whitespace();
    if !scanner.at_end() {
        return Err(scanner.error("trailing characters after value"));
    }
    Ok(Some(node))
}

struct Scanner<'a> {
    text: &'a str,
    data: &'a [u8],
    x: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, max_depth: usize) -> Self {
        Self {
            text,
            data: text.as_bytes(),
            x: 0,
            depth: 0,
            max_depth,
        }
    }

    fn error(&self, reason: &'static str) -> SyntaxError {
        SyntaxError {
            offset: self.x,
            reason,
        }
    }

    fn at_end(&self) -> bool {
        self.x >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.x).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.x += 1;
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.x += 1;
        }
    }

    fn read_any(&mut self) -> Result<Node<'a>, SyntaxError> {
        self.skip_whitespace();
        let start = self.x;
        let value = match self.peek() {
            None => return Err(self.error("unexpected end of input")),
            Some(b'"') => NodeValue::String(self.read_str()?),
            Some(b'[') => NodeValue::Array(self.read_arr()?),
            Some(b'{') => NodeValue::Object(self.read_obj()?),
            Some(b't') => {
                self.read_literal("true")?;
                NodeValue::Bool(true)
            }
            Some(b'f') => {
                self.read_literal("false")?;
                NodeValue::Bool(false)
            }
            Some(b'n') => {
                self.read_literal("null")?;
                NodeValue::Null
            }
            Some(b'-' | b'0'..=b'9') => NodeValue::Number(self.read_num()?),
            Some(_) => return Err(self.error("unexpected character")),
        };
        Ok(Node {
            raw: &self.text[start..self.x],
            value,
        })
    }

    fn read_literal(&mut self, literal: &'static str) -> Result<(), SyntaxError> {
        if self.data[self.x..].starts_with(literal.as_bytes()) {
            self.x += literal.len();
            Ok(())
        } else {
            Err(self.error("invalid literal"))
        }
    }

    fn read_num(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.x;
        if self.peek() == Some(b'-') {
            self.x += 1;
        }
        match self.peek() {
            Some(b'0') => self.x += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error("expected digit")),
        }
        if self.peek() == Some(b'.') {
            self.x += 1;
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected digit after decimal point"));
            }
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.x += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.x += 1;
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected digit in exponent"));
            }
            self.skip_digits();
        }
        Ok(&self.text[start..self.x])
    }

    fn read_str(&mut self) -> Result<Cow<'a, str>, SyntaxError> {
        self.x += 1; // opening quote
        let start = self.x;
        let mut escaped = false;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    self.x += 2;
                }
                Some(c) if c < 0x20 => return Err(self.error("control character in string")),
                Some(_) => self.x += 1,
            }
        }
        let body = &self.text[start..self.x];
        self.x += 1; // closing quote
        if !escaped {
            return Ok(Cow::Borrowed(body));
        }
        // Escapes are rare; let serde_json handle the unescaping rules.
        serde_json::from_str::<String>(&self.text[start - 1..self.x])
            .map(Cow::Owned)
            .map_err(|_| SyntaxError {
                offset: start,
                reason: "invalid escape sequence",
            })
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    fn read_arr(&mut self) -> Result<Vec<Node<'a>>, SyntaxError> {
        self.enter()?;
        self.x += 1; // '['
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.x += 1;
            self.depth -= 1;
            return Ok(items);
        }
        loop {
            items.push(self.read_any()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b']') => {
                    self.x += 1;
                    break;
                }
                _ => return Err(self.error("expected `,` or `]`")),
            }
        }
        self.depth -= 1;
        Ok(items)
    }

    fn read_obj(&mut self) -> Result<Vec<(Cow<'a, str>, Node<'a>)>, SyntaxError> {
        self.enter()?;
        self.x += 1; // '{'
        let mut members = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.x += 1;
            self.depth -= 1;
            return Ok(members);
        }
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.error("expected object key"));
            }
            let key = self.read_str()?;
            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(self.error("expected `:`"));
            }
            self.x += 1;
            let value = self.read_any()?;
            members.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b'}') => {
                    self.x += 1;
                    break;
                }
                _ => return Err(self.error("expected `,` or `}`")),
            }
        }
        self.depth -= 1;
        Ok(members)
    }
}
