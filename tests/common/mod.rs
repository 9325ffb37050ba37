//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use coursemark::ast::{MacroNode, Node, Page};
use coursemark::{DocumentParser, ParseError};

/// 1x1 transparent PNG.
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Wraps `body` in a titled page with a single section.
pub fn page_with(body: &str) -> String {
    format!("#title[Test]\n= Section\n{}\n", body)
}

/// Parses `body` as the only content of a page and returns its single macro.
pub fn parse_macro_with(parser: DocumentParser<'_>, body: &str) -> Result<MacroNode, ParseError> {
    let page = parser.parse_page(&page_with(body))?;
    Ok(single_macro(&page))
}

pub fn parse_macro(body: &str) -> Result<MacroNode, ParseError> {
    parse_macro_with(DocumentParser::new(), body)
}

pub fn single_macro(page: &Page) -> MacroNode {
    match page.content[0].content.as_slice() {
        [Node::Macro(node)] => node.clone(),
        other => panic!("expected exactly one macro node, got {:?}", other),
    }
}

/// Writes `files` (relative path, contents) below `root`.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}
