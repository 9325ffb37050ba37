pub use crate::document::{parse_page, parse_title, summarize, DocumentParser};
pub use crate::errors::ParseError;
pub use crate::ast::{Node, Page, Section};

pub mod assets;
pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod document;
pub mod errors;
pub mod macros;
pub mod pipeline;
pub mod syntax;
