//! Document assembler.
//!
//! A page source looks like
//!
//! ```text
//! #title[Intro]
//! = Section One
//! Some **text** before.
//! == A subheader
//! #note[Remember this.]
//! ```
//!
//! The title directive comes first, then sections introduced by `= ` lines.
//! Inside a section, plain text becomes markdown and subheader nodes, `#group`
//! blocks gather an intro and member macros, and every other macro goes through
//! the registry.

use std::path::Path;

use log::debug;

use crate::assets::{ImageAssets, NoImageAssets};
use crate::ast::{MacroGroup, Node, Page, PageSummary, Section};
use crate::errors::ParseError;
use crate::macros::{default_registry, MacroRegistry, ParseContext};
use crate::syntax::guard::{protect, referenced_blocks, Guarded};
use crate::syntax::inline::extract;
use crate::syntax::params::{parse_params, POSITIONAL_KEY};
use crate::syntax::splitter::{leading_macro, split, RawMacroBlock, Segment};

const SECTION_PREFIX: &str = "= ";
const SUBHEADER_PREFIX: &str = "== ";
const GROUP: &str = "group";
const TITLE: &str = "title";

static NO_IMAGE_ASSETS: NoImageAssets = NoImageAssets;

/// Parses the title only, without looking at the content.
pub fn parse_title(text: &str) -> Result<String, ParseError> {
    read_title(text).map(|title| title.text)
}

/// The fields an index builder needs.
pub fn summarize(text: &str) -> Result<PageSummary, ParseError> {
    Ok(PageSummary {
        title: parse_title(text)?,
    })
}

/// Parses a page with the default registry and no image support.
pub fn parse_page(text: &str) -> Result<Page, ParseError> {
    DocumentParser::new().parse_page(text)
}

/// Page parser bound to a registry and its collaborators.
#[derive(Clone, Copy)]
pub struct DocumentParser<'a> {
    registry: &'a MacroRegistry,
    assets: &'a dyn ImageAssets,
    source_path: Option<&'a Path>,
}

impl Default for DocumentParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DocumentParser<'a> {
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
            assets: &NO_IMAGE_ASSETS,
            source_path: None,
        }
    }

    pub fn with_registry(mut self, registry: &'a MacroRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_assets(mut self, assets: &'a dyn ImageAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_source_path(mut self, path: &'a Path) -> Self {
        self.source_path = Some(path);
        self
    }

    pub fn parse_page(&self, text: &str) -> Result<Page, ParseError> {
        let guarded = protect(text);
        let mut ctx = ParseContext::new(&guarded.blocks).with_assets(self.assets);
        if let Some(path) = self.source_path {
            ctx = ctx.with_source_path(path);
        }

        let title = read_title(&guarded.text)?;
        let source_lines = source_line_numbers(&guarded);
        let line_of = |index: usize| source_lines.get(index).copied().unwrap_or(index + 1);

        if !title.trailing.is_empty() {
            return Err(ParseError::ContentBeforeSection {
                line: line_of(title.last_line),
            });
        }

        let mut sections = Vec::new();
        for span in section_spans(&guarded.text, title.last_line + 1, &line_of)? {
            let content = self
                .parse_section(&span.body, &ctx)
                .map_err(|e| e.in_section(span.header.clone(), span.line))?;
            sections.push(Section {
                header: ctx.markdown(&span.header).0,
                content,
            });
        }

        debug!(
            "parsed page '{}' with {} section(s)",
            title.text,
            sections.len()
        );
        Ok(Page {
            title: ctx.markdown(&title.text).0,
            content: sections,
        })
    }

    fn parse_section(&self, body: &str, ctx: &ParseContext<'_>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        for segment in split(body)? {
            match segment {
                Segment::Text(text) => nodes.extend(text_nodes(&text, ctx)),
                Segment::Macro(block) if block.name == GROUP => {
                    nodes.push(Node::Group(self.parse_group(&block, ctx)?));
                }
                Segment::Macro(block) => {
                    nodes.push(Node::Macro(self.registry.dispatch(&block, ctx)?));
                }
            }
        }
        Ok(nodes)
    }

    fn parse_group(
        &self,
        block: &RawMacroBlock,
        ctx: &ParseContext<'_>,
    ) -> Result<MacroGroup, ParseError> {
        if let Some(params) = block.params.as_deref().filter(|_| block.has_params()) {
            let key = parse_params(params)
                .into_keys()
                .next()
                .map(|key| if key == POSITIONAL_KEY { "(positional)".to_string() } else { key })
                .unwrap_or_else(|| params.trim().to_string());
            return Err(ParseError::InvalidParamKey {
                macro_name: GROUP.to_string(),
                key,
                allowed: Vec::new(),
            });
        }

        let extracted = extract(GROUP, block.content.as_deref().unwrap_or(""))?;
        let macros = extracted
            .blocks
            .iter()
            .map(|member| self.registry.dispatch(member, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MacroGroup {
            intro: extracted.main.as_deref().map(|intro| ctx.markdown(intro)),
            macros,
        })
    }
}

struct Title {
    text: String,
    /// Index of the line the directive closes on.
    last_line: usize,
    /// Anything written after the directive on that line.
    trailing: String,
}

fn read_title(text: &str) -> Result<Title, ParseError> {
    let start = text.len() - text.trim_start().len();
    let (block, length) = match leading_macro(&text[start..]) {
        Ok(Some(found)) => found,
        _ => return Err(ParseError::MissingTitle),
    };
    if block.name != TITLE || block.has_params() {
        return Err(ParseError::MissingTitle);
    }
    let title = block.content.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(ParseError::MissingTitle);
    }

    let end = start + length;
    let line_end = text[end..]
        .find('\n')
        .map(|offset| end + offset)
        .unwrap_or(text.len());
    Ok(Title {
        text: title.split_whitespace().collect::<Vec<_>>().join(" "),
        last_line: text[..end].matches('\n').count(),
        trailing: text[end..line_end].trim().to_string(),
    })
}

struct SectionSpan {
    header: String,
    /// 1-based line of the header in the original source.
    line: usize,
    body: String,
}

/// Cuts the lines from `first_line` onwards into header spans.
fn section_spans(
    text: &str,
    first_line: usize,
    line_of: &dyn Fn(usize) -> usize,
) -> Result<Vec<SectionSpan>, ParseError> {
    let mut spans: Vec<SectionSpan> = Vec::new();
    for (index, line) in text.split('\n').enumerate().skip(first_line) {
        if let Some(header) = line.strip_prefix(SECTION_PREFIX) {
            spans.push(SectionSpan {
                header: header.trim().to_string(),
                line: line_of(index),
                body: String::new(),
            });
            continue;
        }
        match spans.last_mut() {
            Some(span) => {
                span.body.push_str(line);
                span.body.push('\n');
            }
            None if line.trim().is_empty() => {}
            None => {
                return Err(ParseError::ContentBeforeSection {
                    line: line_of(index),
                })
            }
        }
    }
    Ok(spans)
}

/// Breaks plain text on `== ` lines into markdown and subheader nodes.
fn text_nodes(text: &str, ctx: &ParseContext<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    for line in text.lines() {
        match line.trim_start().strip_prefix(SUBHEADER_PREFIX) {
            Some(subheader) => {
                flush_markdown(&mut pending, &mut nodes, ctx);
                nodes.push(Node::Subheader(ctx.markdown(subheader)));
            }
            None => pending.push(line),
        }
    }
    flush_markdown(&mut pending, &mut nodes, ctx);
    nodes
}

fn flush_markdown(pending: &mut Vec<&str>, nodes: &mut Vec<Node>, ctx: &ParseContext<'_>) {
    let joined = pending.join("\n");
    if !joined.trim().is_empty() {
        nodes.push(Node::Markdown(ctx.markdown(&joined)));
    }
    pending.clear();
}

/// Source line number of every line of the guarded text. A fenced block
/// collapsed into one placeholder line hides its body and both fence lines.
fn source_line_numbers(guarded: &Guarded) -> Vec<usize> {
    let mut numbers = Vec::new();
    let mut current = 1;
    for line in guarded.text.split('\n') {
        numbers.push(current);
        let hidden: usize = referenced_blocks(line, &guarded.blocks)
            .filter_map(|block| block.fence.as_ref())
            .map(|fence| fence.lines - 1)
            .sum();
        current += 1 + hidden;
    }
    numbers
}
