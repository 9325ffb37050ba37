//! # Macro system
//!
//! A macro is an author-written `#name(params)[content]` directive. Every macro
//! type is described once by a [`MacroDefinition`]: which inline sub-macros it
//! accepts, which parameters it takes (with typed defaults), and the semantic
//! parser that turns a validated invocation into a [`MacroNode`].
//!
//! Dispatch happens in one place, [`MacroRegistry::dispatch`]:
//!
//! 1. look the name up (unknown names fail),
//! 2. split the body into main content and inline sub-macros,
//! 3. check the inline schema and the parameter schema,
//! 4. call the semantic parser with a [`ValidatedMacro`].
//!
//! Semantic parsers never split text themselves except by delegating back to
//! the guard, splitter and extractor in [`crate::syntax`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::assets::{ImageAssets, NoImageAssets};
use crate::ast::{Markdown, MacroNode};
use crate::errors::ParseError;
use crate::syntax::guard::{restore, ProtectedBlock};
use crate::syntax::params::{ParamMap, ParamValue};

pub mod builtin;
pub mod registry;
pub mod validation;

pub use registry::{default_registry, DuplicateMacro, MacroRegistry};

/// Whether an inline sub-macro must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRule {
    Required,
    Optional,
}

/// The semantic parser of one macro type.
pub type MacroParser = fn(&ValidatedMacro, &ParseContext<'_>) -> Result<MacroNode, ParseError>;

/// Static description of one macro type.
#[derive(Debug, Clone)]
pub struct MacroDefinition {
    pub name: &'static str,
    pub inline: Vec<(&'static str, InlineRule)>,
    /// Default per recognized key. The default's type is the expected type.
    pub defaults: ParamMap,
    pub parser: MacroParser,
}

impl MacroDefinition {
    pub fn new(name: &'static str, parser: MacroParser) -> Self {
        Self {
            name,
            inline: Vec::new(),
            defaults: ParamMap::new(),
            parser,
        }
    }

    pub fn inline(mut self, name: &'static str, rule: InlineRule) -> Self {
        self.inline.push((name, rule));
        self
    }

    pub fn param(mut self, key: &str, default: ParamValue) -> Self {
        self.defaults.insert(key.to_string(), default);
        self
    }

    pub fn inline_rule(&self, name: &str) -> Option<InlineRule> {
        self.inline
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rule)| *rule)
    }
}

/// A macro invocation that passed schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMacro {
    pub name: String,
    /// Leading text of the body, before any inline sub-macro.
    pub content: Option<String>,
    pub inline: BTreeMap<String, String>,
    /// Every declared key, filled from defaults where not given.
    pub params: ParamMap,
}

impl ValidatedMacro {
    pub fn require_content(&self) -> Result<&str, ParseError> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ParseError::MissingContent {
                macro_name: self.name.clone(),
            })
    }

    pub fn inline(&self, name: &str) -> Option<&str> {
        self.inline.get(name).map(String::as_str)
    }

    pub fn required_inline(&self, name: &str) -> Result<&str, ParseError> {
        self.inline(name)
            .ok_or_else(|| ParseError::InlineMacroMismatch {
                macro_name: self.name.clone(),
                invalid: Vec::new(),
                missing: vec![name.to_string()],
            })
    }

    pub fn text_param(&self, key: &str) -> &str {
        self.params
            .get(key)
            .and_then(ParamValue::as_text)
            .unwrap_or("")
    }

    pub fn bool_param(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(ParamValue::as_bool)
            .unwrap_or(false)
    }
}

static NO_IMAGE_ASSETS: NoImageAssets = NoImageAssets;

/// Per-document state the semantic parsers may read.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub blocks: &'a [ProtectedBlock],
    pub assets: &'a dyn ImageAssets,
    /// The file being parsed; image references resolve relative to it.
    pub source_path: Option<&'a Path>,
}

impl<'a> ParseContext<'a> {
    pub fn new(blocks: &'a [ProtectedBlock]) -> Self {
        Self {
            blocks,
            assets: &NO_IMAGE_ASSETS,
            source_path: None,
        }
    }

    pub fn with_assets(mut self, assets: &'a dyn ImageAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_source_path(mut self, path: &'a Path) -> Self {
        self.source_path = Some(path);
        self
    }

    /// A markdown leaf with protected code put back.
    pub fn markdown(&self, text: &str) -> Markdown {
        Markdown(restore(text.trim(), self.blocks))
    }
}

impl std::fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("blocks", &self.blocks.len())
            .field("source_path", &self.source_path)
            .finish()
    }
}
