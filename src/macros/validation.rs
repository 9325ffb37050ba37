//! Schema checks run before a macro's semantic parser.

use std::collections::BTreeMap;

use crate::errors::ParseError;
use crate::macros::{InlineRule, MacroDefinition};
use crate::syntax::params::{ParamMap, POSITIONAL_KEY};

/// Rejects inline sub-macros the definition does not declare and reports
/// required ones that are absent. Both sets are reported in one error.
pub fn validate_inline(
    definition: &MacroDefinition,
    present: &BTreeMap<String, String>,
) -> Result<(), ParseError> {
    let invalid: Vec<String> = present
        .keys()
        .filter(|name| definition.inline_rule(name).is_none())
        .cloned()
        .collect();
    let mut missing: Vec<String> = definition
        .inline
        .iter()
        .filter(|(name, rule)| *rule == InlineRule::Required && !present.contains_key(*name))
        .map(|(name, _)| name.to_string())
        .collect();
    missing.sort();

    if invalid.is_empty() && missing.is_empty() {
        return Ok(());
    }
    Err(ParseError::InlineMacroMismatch {
        macro_name: definition.name.to_string(),
        invalid,
        missing,
    })
}

/// Checks parsed parameters against the definition's typed defaults and
/// returns the complete parameter map.
pub fn validate_params(
    definition: &MacroDefinition,
    mut params: ParamMap,
) -> Result<ParamMap, ParseError> {
    if let Some(positional) = params.remove(POSITIONAL_KEY) {
        let mut keys = definition.defaults.keys();
        match (keys.next(), keys.next()) {
            (Some(sole), None) => {
                params.entry(sole.clone()).or_insert(positional);
            }
            _ => return Err(invalid_key(definition, "(positional)")),
        }
    }

    let mut resolved = definition.defaults.clone();
    for (key, value) in params {
        let Some(default) = definition.defaults.get(&key) else {
            return Err(invalid_key(definition, &key));
        };
        if !value.same_type(default) {
            return Err(ParseError::InvalidParamType {
                macro_name: definition.name.to_string(),
                key,
                expected: default.type_name(),
                actual: value.type_name(),
            });
        }
        resolved.insert(key, value);
    }
    Ok(resolved)
}

fn invalid_key(definition: &MacroDefinition, key: &str) -> ParseError {
    ParseError::InvalidParamKey {
        macro_name: definition.name.to_string(),
        key: key.to_string(),
        allowed: definition.defaults.keys().cloned().collect(),
    }
}
