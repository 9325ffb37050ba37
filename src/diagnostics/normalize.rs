//! Conversion of heterogeneous failures into [`ContentIssue`]s.
//!
//! Structured input passes through. Parse errors carry their own code. Schema
//! violations are flattened and phrased for authors. Bare messages are matched
//! against the known message shapes, falling back to `content.invalid` with
//! whatever line and column the text mentions.

use std::io;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{ContentIssue, Failure, PathSegment};
use crate::errors::{codes, ParseError};

pub fn normalize(failure: Failure) -> Vec<ContentIssue> {
    match failure {
        Failure::Issue(issue) => vec![issue],
        Failure::Issues(issues) => issues,
        Failure::Parse(error) => from_parse_error(&error),
        Failure::Schema(violations) => flatten(violations).iter().map(from_violation).collect(),
        Failure::Yaml(error) => vec![from_yaml_error(&error)],
        Failure::Io(error) => vec![from_io_error(&error)],
        Failure::Message(message) => vec![classify(&message)],
    }
}

/// Issues for one parse failure. Section wrappers become the issue's path and
/// line; an inline mismatch yields one issue per non-empty set.
pub fn from_parse_error(error: &ParseError) -> Vec<ContentIssue> {
    match error {
        ParseError::InSection {
            header,
            line,
            error,
        } => from_parse_error(error)
            .into_iter()
            .map(|mut issue| {
                if issue.line.is_none() {
                    issue.line = Some(*line);
                }
                let mut path = vec![PathSegment::from("section"), PathSegment::from(header.as_str())];
                path.append(&mut issue.path);
                issue.path = path;
                issue
            })
            .collect(),
        ParseError::InlineMacroMismatch {
            macro_name,
            invalid,
            missing,
        } if !invalid.is_empty() && !missing.is_empty() => {
            let only_invalid = ParseError::InlineMacroMismatch {
                macro_name: macro_name.clone(),
                invalid: invalid.clone(),
                missing: Vec::new(),
            };
            let only_missing = ParseError::InlineMacroMismatch {
                macro_name: macro_name.clone(),
                invalid: Vec::new(),
                missing: missing.clone(),
            };
            vec![single_issue(&only_invalid), single_issue(&only_missing)]
        }
        other => vec![single_issue(other)],
    }
}

fn single_issue(error: &ParseError) -> ContentIssue {
    let mut issue = ContentIssue::new(error.code(), error.to_string());
    issue.hint = error.hint();
    if let ParseError::ContentBeforeSection { line } = error {
        issue.line = Some(*line);
    }
    issue
}

/// Kind of a schema violation, named after the value types involved.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    InvalidType { expected: String, received: String },
    InvalidValue { received: String, allowed: Vec<String> },
    /// None of the alternatives matched; each branch lists its own violations.
    Union { branches: Vec<Vec<SchemaViolation>> },
    Custom { message: String },
}

/// One failed check of a configuration or metadata document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub path: Vec<PathSegment>,
    pub kind: ViolationKind,
}

impl SchemaViolation {
    pub fn new<S: Into<PathSegment>>(path: impl IntoIterator<Item = S>, kind: ViolationKind) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            kind,
        }
    }
}

/// Promotes union branches to top-level violations, prefixing their paths
/// with the union's own path.
pub fn flatten(violations: Vec<SchemaViolation>) -> Vec<SchemaViolation> {
    let mut flat = Vec::new();
    for violation in violations {
        match violation.kind {
            ViolationKind::Union { branches } => {
                for nested in flatten(branches.into_iter().flatten().collect()) {
                    let mut path = violation.path.clone();
                    path.extend(nested.path);
                    flat.push(SchemaViolation {
                        path,
                        kind: nested.kind,
                    });
                }
            }
            kind => flat.push(SchemaViolation {
                path: violation.path,
                kind,
            }),
        }
    }
    flat
}

/// Author-facing name of a value type.
pub fn humanize_type(name: &str) -> &str {
    match name {
        "string" | "str" => "text",
        "array" | "sequence" | "seq" => "list",
        "object" | "map" | "mapping" => "group of settings",
        "boolean" | "bool" => "true/false",
        "undefined" | "null" | "unit" | "unit value" => "nothing",
        "integer" | "float" | "u8" | "u16" | "u32" | "u64" | "usize" | "i32" | "i64" | "f32"
        | "f64" => "number",
        other => other,
    }
}

fn from_violation(violation: &SchemaViolation) -> ContentIssue {
    let issue = match &violation.kind {
        ViolationKind::InvalidType { expected, received } if humanize_type(received) == "nothing" => {
            ContentIssue::new(
                codes::CONFIG_MISSING_FIELD,
                format!("Missing required field (expected {})", humanize_type(expected)),
            )
        }
        ViolationKind::InvalidType { expected, received } => ContentIssue::new(
            codes::CONFIG_INVALID_TYPE,
            format!(
                "Expected {}, got {}",
                humanize_type(expected),
                humanize_type(received)
            ),
        ),
        ViolationKind::InvalidValue { received, allowed } => ContentIssue::new(
            codes::CONFIG_INVALID_VALUE,
            format!("Invalid value '{}'", received),
        )
        .with_hint(format!("Use one of: {}.", allowed.join(", "))),
        ViolationKind::Custom { message } => ContentIssue::new(codes::CONFIG_INVALID, message.clone()),
        ViolationKind::Union { .. } => {
            ContentIssue::new(codes::CONFIG_INVALID, "No allowed form matches this value")
        }
    };
    ContentIssue {
        path: violation.path.clone(),
        ..issue
    }
}

fn from_yaml_error(error: &serde_yaml::Error) -> ContentIssue {
    let location = error.location();
    ContentIssue::new(codes::CONFIG_INVALID, humanize_yaml_message(&error.to_string()))
        .at(
            location.as_ref().map(|l| l.line()),
            location.as_ref().map(|l| l.column()),
        )
        .with_cause(error.to_string())
}

static SERDE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"invalid type: ([a-z ]+?)(?: `[^`]*`| \S+)?, expected (?:a |an )?([a-z0-9]+)")
        .expect("serde type pattern is valid")
});

/// Rephrases serde's "invalid type" messages with author-facing type names.
fn humanize_yaml_message(message: &str) -> String {
    let Some(caps) = SERDE_TYPE.captures(message) else {
        return message.to_string();
    };
    let received = caps[1].trim().trim_start_matches("a ").trim_start_matches("an ");
    let expected = caps[2].trim();
    format!(
        "Expected {}, got {}",
        humanize_type(expected),
        humanize_type(received)
    )
}

fn from_io_error(error: &io::Error) -> ContentIssue {
    ContentIssue::new(codes::READ_FAILED, format!("Could not read file: {}", error))
        .with_hint("Check that the file exists and is readable.")
}

struct Shape {
    code: &'static str,
    pattern: Regex,
    hint: Option<&'static str>,
}

fn shape(code: &'static str, pattern: &str, hint: Option<&'static str>) -> Shape {
    Shape {
        code,
        pattern: Regex::new(pattern).expect("message shape pattern is valid"),
        hint,
    }
}

static SHAPES: Lazy<Vec<Shape>> = Lazy::new(|| {
    vec![
        shape(
            codes::MISSING_TITLE,
            r"(?i)missing title",
            Some("Start the file with #title[Your title]."),
        ),
        shape(
            codes::UNKNOWN_MACRO,
            r"(?i)unknown macro '#?[A-Za-z][\w-]*'",
            Some("Check the macro name for typos."),
        ),
        shape(codes::INVALID_PARAM_KEY, r"(?i)invalid key '[^']+' for macro", None),
        shape(codes::INVALID_PARAM_TYPE, r"(?i)invalid type for '[^']+' in", None),
        shape(codes::INVALID_INLINE_MACROS, r"(?i)invalid inline macro\(s\)", None),
        shape(codes::MISSING_INLINE_MACROS, r"(?i)missing required inline macro\(s\)", None),
        shape(
            codes::UNCLOSED_MACRO,
            r"(?i)unclosed macro block",
            Some("Every '[' after a macro name needs a matching ']'."),
        ),
        shape(
            codes::DUPLICATE_CHAPTER_FOLDER,
            r"(?i)duplicate chapter folder",
            Some("Give every chapter its own folder."),
        ),
        shape(
            codes::MISSING_CHAPTER_FOLDER,
            r"(?i)(missing chapter folder|no folder (found )?for chapter)",
            Some("Create the chapter folder or fix the chapter id."),
        ),
    ]
});

static LINE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)line (\d+)\D{0,20}?col(?:umn)? (\d+)").expect("line/column pattern is valid")
});
static PAREN_POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+):(\d+)\)").expect("position pattern is valid"));

/// Best-effort classification of a free-text failure message.
pub fn classify(message: &str) -> ContentIssue {
    let (line, col) = position(message);
    let issue = match SHAPES.iter().find(|shape| shape.pattern.is_match(message)) {
        Some(shape) => {
            let issue = ContentIssue::new(shape.code, message);
            match shape.hint {
                Some(hint) => issue.with_hint(hint),
                None => issue,
            }
        }
        None => ContentIssue::new(codes::INVALID, message),
    };
    issue.at(line, col)
}

fn position(message: &str) -> (Option<usize>, Option<usize>) {
    LINE_COLUMN
        .captures(message)
        .or_else(|| PAREN_POSITION.captures(message))
        .map(|caps| (caps[1].parse().ok(), caps[2].parse().ok()))
        .unwrap_or((None, None))
}
