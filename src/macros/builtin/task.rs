//! `#math-task[...]` and `#text-task[...]`: instruction, hint and solution.

use crate::ast::{MacroNode, TaskNode};
use crate::errors::ParseError;
use crate::macros::{InlineRule, MacroDefinition, ParseContext, ValidatedMacro};

pub fn math_task() -> MacroDefinition {
    with_hint_and_solution(MacroDefinition::new("math-task", |validated, ctx| {
        parse_task(validated, ctx).map(MacroNode::MathTask)
    }))
}

pub fn text_task() -> MacroDefinition {
    with_hint_and_solution(MacroDefinition::new("text-task", |validated, ctx| {
        parse_task(validated, ctx).map(MacroNode::TextTask)
    }))
}

fn with_hint_and_solution(definition: MacroDefinition) -> MacroDefinition {
    definition
        .inline("hint", InlineRule::Required)
        .inline("solution", InlineRule::Required)
}

fn parse_task(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<TaskNode, ParseError> {
    Ok(TaskNode {
        instruction: ctx.markdown(validated.require_content()?),
        hint: ctx.markdown(validated.required_inline("hint")?),
        solution: ctx.markdown(validated.required_inline("solution")?),
    })
}
