//! `#code-runner[...]` and `#code-task[...]`.
//!
//! Both read their code from fenced blocks the guard protected earlier; the
//! fence's language tag must be one of [`CodeLanguage::ALL`].

use crate::ast::{CodeLanguage, CodeRunnerNode, CodeTaskNode, MacroNode};
use crate::errors::ParseError;
use crate::macros::{InlineRule, MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::guard::{extract_code_block, ProtectedBlock};

pub fn code_runner() -> MacroDefinition {
    MacroDefinition::new("code-runner", parse_code_runner)
}

pub fn code_task() -> MacroDefinition {
    MacroDefinition::new("code-task", parse_code_task)
        .inline("hint", InlineRule::Required)
        .inline("solution", InlineRule::Required)
        .inline("starter", InlineRule::Required)
        .inline("validation", InlineRule::Optional)
}

fn parse_code_runner(
    validated: &ValidatedMacro,
    ctx: &ParseContext<'_>,
) -> Result<MacroNode, ParseError> {
    let raw = validated.content.as_deref().unwrap_or("");
    let block = extract_code_block(raw, ctx.blocks, &validated.name, None, true)?;
    Ok(MacroNode::CodeRunner(CodeRunnerNode {
        language: language_of(block, &validated.name)?,
        code: block.text.clone(),
    }))
}

fn parse_code_task(
    validated: &ValidatedMacro,
    ctx: &ParseContext<'_>,
) -> Result<MacroNode, ParseError> {
    let instruction = ctx.markdown(validated.require_content()?);
    let hint = ctx.markdown(validated.required_inline("hint")?);
    let solution = ctx.markdown(validated.required_inline("solution")?);

    let starter = extract_code_block(
        validated.required_inline("starter")?,
        ctx.blocks,
        &validated.name,
        Some("starter"),
        true,
    )?;
    let language = language_of(starter, &validated.name)?;

    let validation = validated
        .inline("validation")
        .map(|raw| {
            extract_code_block(raw, ctx.blocks, &validated.name, Some("validation"), false)
                .map(|block| block.text.clone())
        })
        .transpose()?;

    Ok(MacroNode::CodeTask(CodeTaskNode {
        instruction,
        hint,
        solution,
        starter: starter.text.clone(),
        validation,
        language,
    }))
}

fn language_of(block: &ProtectedBlock, macro_name: &str) -> Result<CodeLanguage, ParseError> {
    let tag = block.language.as_deref().unwrap_or("");
    CodeLanguage::from_tag(tag).ok_or_else(|| ParseError::UnsupportedLanguage {
        macro_name: macro_name.to_string(),
        language: tag.to_string(),
    })
}
