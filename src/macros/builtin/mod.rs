//! Semantic parsers of the built-in macros.
//!
//! Each submodule exposes the [`MacroDefinition`]s for one family of macros.
//! The parsers are pure: a validated invocation in, a typed node out.

use crate::errors::ParseError;
use crate::macros::{MacroDefinition, MacroRegistry, ValidatedMacro};

pub mod code;
pub mod content;
pub mod gap;
pub mod image;
pub mod mcq;
pub mod table;
pub mod task;

/// Every built-in definition.
pub fn definitions() -> Vec<MacroDefinition> {
    vec![
        content::note(),
        content::highlight(),
        table::table(),
        image::image(),
        code::code_runner(),
        code::code_task(),
        task::math_task(),
        task::text_task(),
        gap::gap(),
        mcq::mcq(),
    ]
}

pub fn register_builtin_macros(registry: &mut MacroRegistry) {
    for definition in definitions() {
        registry.register(definition);
    }
}

/// Maps a text parameter onto one of a closed set of choices.
fn choose<T: Copy>(
    validated: &ValidatedMacro,
    key: &str,
    choices: &[(&str, T)],
) -> Result<T, ParseError> {
    let value = validated.text_param(key);
    choices
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| ParseError::InvalidParamValue {
            macro_name: validated.name.clone(),
            key: key.to_string(),
            value: value.to_string(),
            allowed: choices.iter().map(|(name, _)| name.to_string()).collect(),
        })
}
