//! Inline-macro extraction.
//!
//! A macro body is re-split: leading text is the main content, everything after
//! it must be macro blocks. The same extraction serves task macros (main
//! content plus `#hint[...]`, `#solution[...]`, ...) and groups (intro text plus
//! member macros).

use std::collections::BTreeMap;

use crate::errors::ParseError;
use crate::syntax::splitter::{split, RawMacroBlock, Segment};

/// A macro body separated into its main content and trailing blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub main: Option<String>,
    pub blocks: Vec<RawMacroBlock>,
}

/// Splits the body of `macro_name` into main content and macro blocks.
pub fn extract(macro_name: &str, content: &str) -> Result<Extracted, ParseError> {
    let mut main = None;
    let mut blocks = Vec::new();
    for (index, segment) in split(content)?.into_iter().enumerate() {
        match segment {
            Segment::Text(text) if index == 0 => main = Some(text),
            Segment::Text(_) => {
                return Err(ParseError::TextAfterMacro {
                    macro_name: macro_name.to_string(),
                })
            }
            Segment::Macro(block) => blocks.push(block),
        }
    }
    Ok(Extracted { main, blocks })
}

impl Extracted {
    /// Inline sub-macros by name. Inline macros take no parameters and may
    /// appear once each; a block without brackets counts as empty content.
    pub fn inline_map(&self, macro_name: &str) -> Result<BTreeMap<String, String>, ParseError> {
        let mut inline = BTreeMap::new();
        for block in &self.blocks {
            if block.has_params() {
                return Err(ParseError::InlineMacroParams {
                    macro_name: macro_name.to_string(),
                    inline: block.name.clone(),
                });
            }
            let content = block.content.clone().unwrap_or_default();
            if inline.insert(block.name.clone(), content).is_some() {
                return Err(ParseError::DuplicateInlineMacro {
                    macro_name: macro_name.to_string(),
                    inline: block.name.clone(),
                });
            }
        }
        Ok(inline)
    }
}
