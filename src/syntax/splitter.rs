//! Macro block splitter.
//!
//! Scans a buffer left to right and cuts it into plain text and
//! `#name(params)[content]` invocations. Brackets are matched with an explicit
//! depth counter rather than a pattern, so nesting is unbounded and scanning
//! stays linear.

use crate::errors::ParseError;

/// An invocation as written, nothing parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMacroBlock {
    pub name: String,
    pub params: Option<String>,
    pub content: Option<String>,
}

impl RawMacroBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            content: None,
        }
    }

    /// True when a parameter list was written and is not blank.
    pub fn has_params(&self) -> bool {
        self.params.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Macro(RawMacroBlock),
}

/// Splits `text` into trimmed, non-empty text runs and macro blocks.
pub fn split(text: &str) -> Result<Vec<Segment>, ParseError> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;
    let bytes = text.as_bytes();

    while pos < bytes.len() {
        if bytes[pos] != b'#' || (pos > 0 && bytes[pos - 1] == b'\\') {
            pos += 1;
            continue;
        }
        let Some(found) = scan_macro(text, pos)? else {
            pos += 1;
            continue;
        };
        push_text(&mut segments, &text[text_start..pos]);
        segments.push(Segment::Macro(found.block));
        pos = found.end;
        text_start = pos;
    }
    push_text(&mut segments, &text[text_start..]);
    Ok(segments)
}

/// Reads the macro that `text` starts with, returning it with the byte index
/// just past its closing bracket.
pub fn leading_macro(text: &str) -> Result<Option<(RawMacroBlock, usize)>, ParseError> {
    if !text.starts_with('#') {
        return Ok(None);
    }
    Ok(scan_macro(text, 0)?.map(|found| (found.block, found.end)))
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(Segment::Text(trimmed.to_string()));
    }
}

struct ScannedMacro {
    block: RawMacroBlock,
    end: usize,
}

/// Tries to read a macro starting at the `#` at `start`.
///
/// Returns `Ok(None)` when the `#` does not introduce a macro (no name, or
/// neither `(` nor `[` right after the name).
fn scan_macro(text: &str, start: usize) -> Result<Option<ScannedMacro>, ParseError> {
    let bytes = text.as_bytes();
    let name_start = start + 1;
    let mut pos = name_start;
    if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return Ok(None);
    }
    while bytes
        .get(pos)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
    {
        pos += 1;
    }
    let name = &text[name_start..pos];
    if !matches!(bytes.get(pos), Some(b'(') | Some(b'[')) {
        return Ok(None);
    }

    let unclosed = || ParseError::UnclosedMacro {
        name: name.to_string(),
        index: start,
    };

    let mut block = RawMacroBlock::new(name);
    if bytes.get(pos) == Some(&b'(') {
        let close = find_params_end(text, pos + 1).ok_or_else(unclosed)?;
        block.params = Some(text[pos + 1..close].to_string());
        pos = close + 1;
    }
    if bytes.get(pos) == Some(&b'[') {
        let close = find_content_end(text, pos + 1).ok_or_else(unclosed)?;
        block.content = Some(dedent(&text[pos + 1..close]));
        pos = close + 1;
    }
    Ok(Some(ScannedMacro { block, end: pos }))
}

/// Index of the `)` closing a parameter list whose body starts at `from`.
/// Parentheses inside quoted strings do not count.
fn find_params_end(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, c) in text[from..].char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `]` closing a content body that starts at `from`.
/// `\[` and `\]` are literal and do not change the depth.
fn find_content_end(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut escaped = false;
    for (offset, c) in text[from..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips, from every line, as many leading spaces as the first line holding
/// non-whitespace has.
fn dedent(body: &str) -> String {
    let indent = body
        .split('\n')
        .find(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .unwrap_or(0);
    if indent == 0 {
        return body.to_string();
    }
    body.split('\n')
        .map(|line| {
            let leading = line.len() - line.trim_start_matches(' ').len();
            &line[leading.min(indent)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}
