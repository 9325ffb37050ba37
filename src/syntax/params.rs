//! Parameter parser for the `(key: value, ...)` list of a macro invocation.
//!
//! Parsing never fails: malformed input degrades to an empty or partial map.
//! Strictness (known keys, value types) is enforced by macro validation.

use std::collections::BTreeMap;

use serde::Serialize;

/// Key under which a sole positional string is stored.
pub const POSITIONAL_KEY: &str = "$positional";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl ParamValue {
    /// Humanized type name used in author-facing messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Text(_) => "text",
            ParamValue::Number(_) => "number",
            ParamValue::Bool(_) => "boolean",
        }
    }

    pub fn same_type(&self, other: &ParamValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerces an unquoted value: booleans, then numbers, else text.
    fn from_bare(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => ParamValue::Number(n),
                _ => ParamValue::Text(raw.to_string()),
            },
        }
    }
}

pub type ParamMap = BTreeMap<String, ParamValue>;

/// Parses a parameter list (without the surrounding parentheses).
pub fn parse_params(source: &str) -> ParamMap {
    let mut params = ParamMap::new();
    let mut cursor = Cursor::new(source);

    cursor.skip_separators();
    if let Some(positional) = cursor.positional() {
        params.insert(POSITIONAL_KEY.to_string(), ParamValue::Text(positional));
        return params;
    }

    while !cursor.at_end() {
        let key = cursor.key();
        cursor.skip_whitespace();
        if key.is_empty() {
            // Nothing usable here; skip to the next separator.
            cursor.bare_value();
            cursor.skip_separators();
            continue;
        }
        if !cursor.eat(':') {
            params.insert(key, ParamValue::Bool(true));
            cursor.skip_separators();
            continue;
        }
        cursor.skip_whitespace();
        let value = match cursor.peek() {
            Some(quote @ ('"' | '\'')) => cursor.quoted(quote).map(ParamValue::Text),
            Some(_) => Some(ParamValue::from_bare(&cursor.bare_value())),
            None => None,
        };
        if let Some(value) = value {
            params.insert(key, value);
        }
        cursor.skip_separators();
    }
    params
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Whether `text` opens with `key:`.
fn starts_assignment(text: &str) -> bool {
    let key_len = text.len() - text.trim_start_matches(is_key_char).len();
    key_len > 0 && text[key_len..].trim_start().starts_with(':')
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            return true;
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(|c| c == ',' || c.is_whitespace()) {
            self.bump();
        }
    }

    fn key(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_key_char) {
            self.bump();
        }
        self.source[start..self.pos].to_string()
    }

    /// Reads an unquoted value up to the next comma, or up to whitespace
    /// that is followed by another `key:` assignment.
    fn bare_value(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || (c.is_whitespace() && starts_assignment(self.rest().trim_start())) {
                break;
            }
            self.bump();
        }
        self.source[start..self.pos].trim_end().to_string()
    }

    /// Reads a quoted string; only `\\` and the active quote are escapes.
    /// An unterminated string yields `None` and consumes the rest.
    fn quoted(&mut self, quote: char) -> Option<String> {
        self.bump();
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                return Some(out);
            }
            if c == '\\' {
                match self.peek() {
                    Some(next) if next == quote || next == '\\' => {
                        out.push(next);
                        self.bump();
                    }
                    _ => out.push(c),
                }
                continue;
            }
            out.push(c);
        }
        None
    }

    /// A sole quoted string with nothing but separators after it.
    fn positional(&mut self) -> Option<String> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return None,
        };
        let start = self.pos;
        let value = self.quoted(quote);
        let trailing = self.rest();
        if let Some(value) = value {
            if trailing.chars().all(|c| c == ',' || c.is_whitespace()) {
                self.pos = self.source.len();
                return Some(value);
            }
        }
        self.pos = start;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }

    #[test]
    fn parses_typed_assignments() {
        let params = parse_params("a: 'y', b: 2, c: true, d: plain words");
        assert_eq!(params.get("a"), Some(&text("y")));
        assert_eq!(params.get("b"), Some(&ParamValue::Number(2.0)));
        assert_eq!(params.get("c"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("d"), Some(&text("plain words")));
    }

    #[test]
    fn whitespace_also_separates_assignments() {
        let params = parse_params("mode: \"mcq\"   icon: 'warning'");
        assert_eq!(params.get("mode"), Some(&text("mcq")));
        assert_eq!(params.get("icon"), Some(&text("warning")));
    }

    #[test]
    fn whitespace_separates_unquoted_assignments() {
        let params = parse_params("a: 1 b: 2");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&ParamValue::Number(1.0)));
        assert_eq!(params.get("b"), Some(&ParamValue::Number(2.0)));

        let params = parse_params("mode: mcq\n  multiple: true");
        assert_eq!(params.get("mode"), Some(&text("mcq")));
        assert_eq!(params.get("multiple"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn quoted_strings_unescape_only_backslash_and_active_quote() {
        let params = parse_params(r#"a: "say \"hi\" \\ \n", b: 'it\'s "x"'"#);
        assert_eq!(params.get("a"), Some(&text(r#"say "hi" \ \n"#)));
        assert_eq!(params.get("b"), Some(&text(r#"it's "x""#)));
    }

    #[test]
    fn sole_quoted_string_is_positional() {
        let params = parse_params(r#"  "images/cat.png"  "#);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(POSITIONAL_KEY), Some(&text("images/cat.png")));
    }

    #[test]
    fn quoted_string_followed_by_more_is_not_positional() {
        let params = parse_params(r#""a" b: 1"#);
        assert!(params.get(POSITIONAL_KEY).is_none());
    }

    #[test]
    fn bare_key_is_a_flag() {
        let params = parse_params("multiple, x: 1");
        assert_eq!(params.get("multiple"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("x"), Some(&ParamValue::Number(1.0)));
    }

    #[test]
    fn malformed_input_degrades_gracefully() {
        assert!(parse_params("").is_empty());
        assert!(parse_params(",,, ").is_empty());
        let params = parse_params("a: 'unterminated");
        assert!(params.is_empty());
        let params = parse_params(":: x: 3");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("x"), Some(&ParamValue::Number(3.0)));
    }

    #[test]
    fn numbers_must_parse_fully() {
        let params = parse_params("a: 12px, b: -1.5, c: 1e3");
        assert_eq!(params.get("a"), Some(&text("12px")));
        assert_eq!(params.get("b"), Some(&ParamValue::Number(-1.5)));
        assert_eq!(params.get("c"), Some(&ParamValue::Number(1000.0)));
    }
}
