//! `#table[...]`: one row per line, cells separated by commas.
//!
//! `\,` is a literal comma and `\\` a literal backslash inside a cell. Code
//! spans are protected before this runs, so commas in code never split.

use crate::ast::{Markdown, MacroNode, TableNode};
use crate::errors::ParseError;
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};

pub fn table() -> MacroDefinition {
    MacroDefinition::new("table", parse_table)
}

fn parse_table(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<MacroNode, ParseError> {
    let content = validated.content.as_deref().unwrap_or("");
    let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
    let header_line = lines.next().ok_or(ParseError::EmptyTable)?;
    let header = row_cells(header_line, ctx);

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let cells = row_cells(line, ctx);
        if cells.len() != header.len() {
            return Err(ParseError::TableRowMismatch {
                row: index + 2,
                expected: header.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }
    Ok(MacroNode::Table(TableNode { header, rows }))
}

fn row_cells(line: &str, ctx: &ParseContext<'_>) -> Vec<Markdown> {
    split_cells(line)
        .iter()
        .map(|cell| ctx.markdown(cell))
        .collect()
}

fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some(',') | Some('\\')) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ',' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}
