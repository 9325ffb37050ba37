//! `#note[...]` and `#highlight(icon: ...)[...]`.

use crate::ast::{HighlightIcon, HighlightNode, MacroNode, NoteNode};
use crate::errors::ParseError;
use crate::macros::builtin::choose;
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::params::ParamValue;

pub fn note() -> MacroDefinition {
    MacroDefinition::new("note", parse_note)
}

pub fn highlight() -> MacroDefinition {
    MacroDefinition::new("highlight", parse_highlight).param("icon", ParamValue::Text("info".into()))
}

fn parse_note(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<MacroNode, ParseError> {
    Ok(MacroNode::Note(NoteNode {
        content: ctx.markdown(validated.require_content()?),
    }))
}

fn parse_highlight(
    validated: &ValidatedMacro,
    ctx: &ParseContext<'_>,
) -> Result<MacroNode, ParseError> {
    let icon = choose(
        validated,
        "icon",
        &[("info", HighlightIcon::Info), ("warning", HighlightIcon::Warning)],
    )?;
    Ok(MacroNode::Highlight(HighlightNode {
        content: ctx.markdown(validated.require_content()?),
        icon,
    }))
}
