//! `#gap(mode: "text" | "mcq")[...]`: fill-in-the-gap tasks.
//!
//! Every `((a|b|c))` placeholder becomes a `{{gap:N}}` sentinel in the stored
//! markdown and a [`GapField`] at index `N`.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::ast::{GapField, GapMode, GapNode, MacroNode};
use crate::errors::ParseError;
use crate::macros::builtin::choose;
use crate::macros::{MacroDefinition, ParseContext, ValidatedMacro};
use crate::syntax::params::ParamValue;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\(([^()]*)\)\)").expect("gap pattern is valid"));

pub fn gap() -> MacroDefinition {
    MacroDefinition::new("gap", parse_gap).param("mode", ParamValue::Text("text".into()))
}

fn parse_gap(validated: &ValidatedMacro, ctx: &ParseContext<'_>) -> Result<MacroNode, ParseError> {
    let content = validated.require_content()?;
    let mode = choose(validated, "mode", &[("text", GapMode::Text), ("mcq", GapMode::Mcq)])?;

    let fields = PLACEHOLDER
        .captures_iter(content)
        .enumerate()
        .map(|(index, caps)| gap_field(&caps[1], mode, index))
        .collect::<Result<Vec<GapField>, ParseError>>()?;
    if fields.is_empty() {
        return Err(ParseError::MissingGaps);
    }

    let mut next = 0usize;
    let replaced = PLACEHOLDER.replace_all(content, |_: &Captures| {
        let sentinel = format!("{{{{gap:{}}}}}", next);
        next += 1;
        sentinel
    });

    Ok(MacroNode::Gap(GapNode {
        content: ctx.markdown(&replaced),
        mode,
        fields,
    }))
}

fn gap_field(raw: &str, mode: GapMode, index: usize) -> Result<GapField, ParseError> {
    let alternatives: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|alternative| !alternative.is_empty())
        .map(str::to_string)
        .collect();
    let Some(first) = alternatives.first().cloned() else {
        return Err(ParseError::EmptyGap { index });
    };
    Ok(match mode {
        GapMode::Text => GapField {
            correct: alternatives.iter().map(|a| a.to_lowercase()).collect(),
            options: None,
        },
        GapMode::Mcq => GapField {
            correct: vec![first],
            options: Some(shuffled(alternatives, raw)),
        },
    })
}

/// Fisher-Yates over a Xoshiro256** seeded with the SHA-256 of the raw
/// placeholder text, so equal placeholders always shuffle alike.
fn shuffled(mut options: Vec<String>, raw: &str) -> Vec<String> {
    let digest = Sha256::digest(raw.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    let mut rng = Xoshiro256StarStar::from_seed(seed);
    options.shuffle(&mut rng);
    options
}
