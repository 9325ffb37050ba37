//! Code-fence guard.
//!
//! Fenced blocks and inline code spans are swapped for opaque placeholder
//! tokens before any other text transform runs, so that macro splitting, gap
//! scanning and dedenting never touch code. The blocks live in a per-document
//! arena; the text refers to them only by index.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::ParseError;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}CODE([0-9]+)\u{E001}").expect("placeholder pattern is valid"));

/// A code span removed from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBlock {
    pub language: Option<String>,
    pub text: String,
    /// Set when the block came from a ``` fence rather than an inline span.
    pub fence: Option<Fence>,
}

/// How a fenced block was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Length of the backtick run.
    pub ticks: usize,
    /// Everything after the backticks on the opening line.
    pub info: String,
    /// Source lines the block spanned, both fence lines included.
    pub lines: usize,
}

impl ProtectedBlock {
    pub fn is_fenced(&self) -> bool {
        self.fence.is_some()
    }
}

/// Text with its code replaced by placeholders, plus the removed code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Guarded {
    pub text: String,
    pub blocks: Vec<ProtectedBlock>,
}

/// The placeholder token for the block at `index`.
pub fn placeholder(index: usize) -> String {
    format!("{}CODE{}{}", OPEN, index, CLOSE)
}

pub fn contains_placeholder(text: &str) -> bool {
    text.contains(OPEN)
}

/// Replaces fenced blocks, then inline spans, with placeholder tokens.
pub fn protect(text: &str) -> Guarded {
    let mut blocks = Vec::new();
    let fenced = protect_fences(text, &mut blocks);
    let text = protect_inline(&fenced, &mut blocks);
    Guarded { text, blocks }
}

/// Puts the protected code back, as a fence or an inline span.
pub fn restore(text: &str, blocks: &[ProtectedBlock]) -> String {
    if !contains_placeholder(text) {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| blocks.get(index))
                .map(render_block)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// The blocks whose placeholders appear in `text`, in order.
pub fn referenced_blocks<'a>(
    text: &'a str,
    blocks: &'a [ProtectedBlock],
) -> impl Iterator<Item = &'a ProtectedBlock> + 'a {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(move |caps| caps[1].parse::<usize>().ok().and_then(|index| blocks.get(index)))
}

/// Finds the fenced block referenced from `raw`.
///
/// Used by macros that embed code as an inline sub-macro. `inline` names that
/// sub-macro for the error message.
pub fn extract_code_block<'a>(
    raw: &str,
    blocks: &'a [ProtectedBlock],
    macro_name: &str,
    inline: Option<&str>,
    require_language: bool,
) -> Result<&'a ProtectedBlock, ParseError> {
    let missing = || ParseError::MissingCodeBlock {
        macro_name: macro_name.to_string(),
        inline: inline.map(str::to_string),
    };
    let caps = PLACEHOLDER.captures(raw).ok_or_else(missing)?;
    let block = caps[1]
        .parse::<usize>()
        .ok()
        .and_then(|index| blocks.get(index))
        .filter(|block| block.is_fenced())
        .ok_or_else(missing)?;
    if require_language && block.language.is_none() {
        return Err(ParseError::MissingCodeLanguage {
            macro_name: macro_name.to_string(),
            inline: inline.map(str::to_string),
        });
    }
    Ok(block)
}

fn render_block(block: &ProtectedBlock) -> String {
    if let Some(fence) = &block.fence {
        let ticks = "`".repeat(fence.ticks);
        if fence.lines <= 2 {
            return format!("{ticks}{}\n{ticks}", fence.info);
        }
        return format!("{ticks}{}\n{}\n{ticks}", fence.info, block.text);
    }
    let longest = longest_backtick_run(&block.text);
    let ticks = "`".repeat(longest + 1);
    if block.text.starts_with('`') || block.text.ends_with('`') {
        return format!("{ticks} {} {ticks}", block.text);
    }
    format!("{ticks}{}{ticks}", block.text)
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// An opening fence line: indent, backtick count, info string.
fn fence_open(line: &str) -> Option<(usize, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    let ticks = rest.len() - rest.trim_start_matches('`').len();
    if ticks < 3 {
        return None;
    }
    let info = rest[ticks..].trim();
    if info.contains('`') {
        return None;
    }
    Some((indent, ticks, info))
}

fn is_fence_close(line: &str, indent: usize, ticks: usize) -> bool {
    let line = line.trim_end();
    let leading = line.len() - line.trim_start_matches(' ').len();
    leading == indent && line[leading..].len() == ticks && line[leading..].bytes().all(|b| b == b'`')
}

fn protect_fences(text: &str, blocks: &mut Vec<ProtectedBlock>) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let Some((indent, ticks, info)) = fence_open(lines[i]) else {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        };
        let close = (i + 1..lines.len()).find(|&j| is_fence_close(lines[j], indent, ticks));
        let Some(close) = close else {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        };
        let body = dedent_lines(&lines[i + 1..close]);
        out.push(format!("{}{}", " ".repeat(indent), placeholder(blocks.len())));
        blocks.push(ProtectedBlock {
            language: info.split_whitespace().next().map(str::to_string),
            text: body,
            fence: Some(Fence {
                ticks,
                info: info.to_string(),
                lines: close - i + 1,
            }),
        });
        i = close + 1;
    }
    out.join("\n")
}

/// Removes the indentation shared by all non-blank lines.
fn dedent_lines(lines: &[&str]) -> String {
    let shared = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            let leading = l.len() - l.trim_start_matches(' ').len();
            &l[leading.min(shared)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn protect_inline(text: &str, blocks: &mut Vec<ProtectedBlock>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let after_open = &rest[start..];
        let ticks = after_open.len() - after_open.trim_start_matches('`').len();
        let body_start = &after_open[ticks..];
        match find_closing_run(body_start, ticks) {
            Some(end) if !contains_placeholder(&body_start[..end]) => {
                out.push_str(&placeholder(blocks.len()));
                blocks.push(ProtectedBlock {
                    language: None,
                    text: body_start[..end].to_string(),
                    fence: None,
                });
                rest = &body_start[end + ticks..];
            }
            _ => {
                out.push_str(&after_open[..ticks]);
                rest = body_start;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte offset of the next run of exactly `ticks` backticks on the same line.
fn find_closing_run(text: &str, ticks: usize) -> Option<usize> {
    let line_end = text.find('\n').unwrap_or(text.len());
    let line = &text[..line_end];
    let mut offset = 0;
    while let Some(pos) = line[offset..].find('`') {
        let start = offset + pos;
        let run = line[start..].len() - line[start..].trim_start_matches('`').len();
        if run == ticks && start > 0 {
            return Some(start);
        }
        offset = start + run;
    }
    None
}
