//! `#mcq(multiple: false)[...]`: a question followed by checkbox options.
//!
//! ```text
//! #mcq[
//!   Which of these are prime?
//!   - [x] 2
//!   - [ ] 4
//! ]
//! ```

use crate::ast::{MacroNode, McqNode, McqOption};
use crate::errors::ParseError;
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::params::ParamValue;

pub fn mcq() -> MacroDefinition {
    MacroDefinition::new("mcq", parse_mcq).param("multiple", ParamValue::Bool(false))
}

fn parse_mcq(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<MacroNode, ParseError> {
    let content = validated.require_content()?;
    let multiple = validated.bool_param("multiple");

    let mut question: Vec<&str> = Vec::new();
    let mut options = Vec::new();
    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some((correct, text)) = option_line(line) {
            options.push(McqOption {
                text: ctx.markdown(text),
                correct,
            });
        } else if options.is_empty() {
            question.push(line);
        } else {
            return Err(invalid("text is only allowed before the options"));
        }
    }

    if question.is_empty() {
        return Err(invalid("the question text is missing"));
    }
    if options.len() < 2 {
        return Err(invalid("at least two options are required"));
    }
    let correct = options.iter().filter(|option| option.correct).count();
    if correct == 0 {
        return Err(invalid("no option is marked as correct"));
    }
    if !multiple && correct > 1 {
        return Err(invalid(
            "single-choice questions need exactly one correct option; set 'multiple: true' to allow more",
        ));
    }

    Ok(MacroNode::Mcq(McqNode {
        question: ctx.markdown(&question.join("\n")),
        options,
        multiple,
    }))
}

fn option_line(line: &str) -> Option<(bool, &str)> {
    let rest = line.strip_prefix("- [")?;
    let (mark, text) = rest.split_once(']')?;
    let correct = match mark {
        "x" | "X" => true,
        " " | "" => false,
        _ => return None,
    };
    Some((correct, text.trim()))
}

fn invalid(reason: &str) -> ParseError {
    ParseError::InvalidMcq {
        reason: reason.to_string(),
    }
}
