//! Parse failures for a single document.
//!
//! Every failure the parser can raise is a [`ParseError`] variant. Each variant
//! maps to one machine-readable issue code from [`codes`] and, where useful, a
//! hint for the author. The diagnostics layer turns these into
//! [`ContentIssue`](crate::diagnostics::ContentIssue) values; nothing in the
//! parser ever reports a bare string.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::CodeLanguage;

/// Machine-readable issue codes.
///
/// The set is closed: codes produced by the parser, plus the content-assembly
/// codes raised by collaborators outside this crate that are normalized through
/// the same model.
pub mod codes {
    pub const MISSING_TITLE: &str = "content.missing_title";
    pub const CONTENT_BEFORE_SECTION: &str = "content.content_before_section";
    pub const UNCLOSED_MACRO: &str = "content.unclosed_macro";
    pub const UNKNOWN_MACRO: &str = "content.unknown_macro";
    pub const TEXT_AFTER_MACRO: &str = "content.text_after_macro";
    pub const INLINE_MACRO_PARAMS: &str = "content.inline_macro_params";
    pub const DUPLICATE_INLINE_MACRO: &str = "content.duplicate_inline_macro";
    pub const INVALID_INLINE_MACROS: &str = "content.invalid_inline_macros";
    pub const MISSING_INLINE_MACROS: &str = "content.missing_inline_macros";
    pub const INVALID_PARAM_KEY: &str = "content.invalid_param_key";
    pub const INVALID_PARAM_TYPE: &str = "content.invalid_param_type";
    pub const INVALID_PARAM_VALUE: &str = "content.invalid_param_value";
    pub const MISSING_PARAM: &str = "content.missing_param";
    pub const MISSING_CONTENT: &str = "content.missing_content";
    pub const EMPTY_TABLE: &str = "content.empty_table";
    pub const TABLE_ROW_MISMATCH: &str = "content.table_row_mismatch";
    pub const MISSING_CODE_BLOCK: &str = "content.missing_code_block";
    pub const MISSING_CODE_LANGUAGE: &str = "content.missing_code_language";
    pub const UNSUPPORTED_LANGUAGE: &str = "content.unsupported_language";
    pub const MISSING_GAPS: &str = "content.missing_gaps";
    pub const EMPTY_GAP: &str = "content.empty_gap";
    pub const INVALID_MCQ: &str = "content.invalid_mcq";
    pub const IMAGE_UNAVAILABLE: &str = "content.image_unavailable";
    pub const INVALID: &str = "content.invalid";
    pub const READ_FAILED: &str = "content.read_failed";

    // Content-assembly codes, raised outside the parser.
    pub const MISSING_CHAPTER_FOLDER: &str = "content.missing_chapter_folder";
    pub const DUPLICATE_CHAPTER_FOLDER: &str = "content.duplicate_chapter_folder";
    pub const MISSING_FOLDER: &str = "content.missing_folder";
    pub const EMPTY_PAGE: &str = "content.empty_page";
    pub const INVALID_ICON: &str = "content.invalid_icon";

    // Configuration (schema) failures.
    pub const CONFIG_INVALID: &str = "config.invalid";
    pub const CONFIG_INVALID_TYPE: &str = "config.invalid_type";
    pub const CONFIG_MISSING_FIELD: &str = "config.missing_field";
    pub const CONFIG_INVALID_VALUE: &str = "config.invalid_value";

    /// Codes whose issues are reported together with the affected courses.
    pub const COURSE_RELEVANT: &[&str] = &[
        MISSING_CHAPTER_FOLDER,
        DUPLICATE_CHAPTER_FOLDER,
        MISSING_FOLDER,
        EMPTY_PAGE,
        INVALID_ICON,
    ];

    pub fn is_course_relevant(code: &str) -> bool {
        COURSE_RELEVANT.contains(&code)
    }
}

/// A failure while parsing one document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Missing title: the document must start with #title[...]")]
    MissingTitle,

    #[error("Content found before the first section header on line {line}")]
    ContentBeforeSection { line: usize },

    #[error("Unclosed macro block '#{name}' at index {index}")]
    UnclosedMacro { name: String, index: usize },

    #[error("Unknown macro '#{name}'")]
    UnknownMacro { name: String },

    #[error("Text only allowed before macros in '#{macro_name}'")]
    TextAfterMacro { macro_name: String },

    #[error("Inline macro '#{inline}' in '#{macro_name}' must not have parameters")]
    InlineMacroParams { macro_name: String, inline: String },

    #[error("Duplicate inline macro '#{inline}' in '#{macro_name}'")]
    DuplicateInlineMacro { macro_name: String, inline: String },

    #[error("{}", inline_mismatch_message(.macro_name, .invalid, .missing))]
    InlineMacroMismatch {
        macro_name: String,
        invalid: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Invalid key '{key}' for macro '#{macro_name}'")]
    InvalidParamKey {
        macro_name: String,
        key: String,
        allowed: Vec<String>,
    },

    #[error("Invalid type for '{key}' in '#{macro_name}': expected {expected}, got {actual}")]
    InvalidParamType {
        macro_name: String,
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid value '{value}' for '{key}' in '#{macro_name}'")]
    InvalidParamValue {
        macro_name: String,
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Missing parameter '{key}' for macro '#{macro_name}'")]
    MissingParam { macro_name: String, key: String },

    #[error("Macro '#{macro_name}' requires content")]
    MissingContent { macro_name: String },

    #[error("Table must contain at least one row")]
    EmptyTable,

    #[error("Table row {row} has {found} cells, expected {expected}")]
    TableRowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{} must contain a fenced code block", code_location(.macro_name, .inline))]
    MissingCodeBlock {
        macro_name: String,
        inline: Option<String>,
    },

    #[error("{} must declare a code block language", code_location(.macro_name, .inline))]
    MissingCodeLanguage {
        macro_name: String,
        inline: Option<String>,
    },

    #[error("Unsupported language '{language}' in '#{macro_name}'")]
    UnsupportedLanguage { macro_name: String, language: String },

    #[error("Gap task must contain at least one ((gap)) placeholder")]
    MissingGaps,

    #[error("Gap {index} has no answer")]
    EmptyGap { index: usize },

    #[error("Invalid multiple-choice question: {reason}")]
    InvalidMcq { reason: String },

    #[error("Image '{reference}' could not be used: {reason}")]
    ImageUnavailable { reference: String, reason: String },

    #[error("{error} (in section '{header}')")]
    InSection {
        header: String,
        line: usize,
        error: Box<ParseError>,
    },
}

fn inline_mismatch_message(macro_name: &str, invalid: &[String], missing: &[String]) -> String {
    let mut parts = Vec::new();
    if !invalid.is_empty() {
        parts.push(format!(
            "Invalid inline macro(s) in '#{}': {}",
            macro_name,
            invalid.join(", ")
        ));
    }
    if !missing.is_empty() {
        parts.push(format!(
            "Missing required inline macro(s) in '#{}': {}",
            macro_name,
            missing.join(", ")
        ));
    }
    parts.join("; ")
}

fn code_location(macro_name: &str, inline: &Option<String>) -> String {
    match inline {
        Some(inline) => format!("Inline macro '#{}' of '#{}'", inline, macro_name),
        None => format!("Macro '#{}'", macro_name),
    }
}

impl ParseError {
    /// The issue code for this failure. Section wrappers report their inner code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => codes::MISSING_TITLE,
            Self::ContentBeforeSection { .. } => codes::CONTENT_BEFORE_SECTION,
            Self::UnclosedMacro { .. } => codes::UNCLOSED_MACRO,
            Self::UnknownMacro { .. } => codes::UNKNOWN_MACRO,
            Self::TextAfterMacro { .. } => codes::TEXT_AFTER_MACRO,
            Self::InlineMacroParams { .. } => codes::INLINE_MACRO_PARAMS,
            Self::DuplicateInlineMacro { .. } => codes::DUPLICATE_INLINE_MACRO,
            Self::InlineMacroMismatch { invalid, .. } if !invalid.is_empty() => {
                codes::INVALID_INLINE_MACROS
            }
            Self::InlineMacroMismatch { .. } => codes::MISSING_INLINE_MACROS,
            Self::InvalidParamKey { .. } => codes::INVALID_PARAM_KEY,
            Self::InvalidParamType { .. } => codes::INVALID_PARAM_TYPE,
            Self::InvalidParamValue { .. } => codes::INVALID_PARAM_VALUE,
            Self::MissingParam { .. } => codes::MISSING_PARAM,
            Self::MissingContent { .. } => codes::MISSING_CONTENT,
            Self::EmptyTable => codes::EMPTY_TABLE,
            Self::TableRowMismatch { .. } => codes::TABLE_ROW_MISMATCH,
            Self::MissingCodeBlock { .. } => codes::MISSING_CODE_BLOCK,
            Self::MissingCodeLanguage { .. } => codes::MISSING_CODE_LANGUAGE,
            Self::UnsupportedLanguage { .. } => codes::UNSUPPORTED_LANGUAGE,
            Self::MissingGaps => codes::MISSING_GAPS,
            Self::EmptyGap { .. } => codes::EMPTY_GAP,
            Self::InvalidMcq { .. } => codes::INVALID_MCQ,
            Self::ImageUnavailable { .. } => codes::IMAGE_UNAVAILABLE,
            Self::InSection { error, .. } => error.code(),
        }
    }

    /// A short suggestion for the author, if one applies.
    pub fn hint(&self) -> Option<String> {
        let hint = match self {
            Self::MissingTitle => "Start the file with #title[Your title].".to_string(),
            Self::ContentBeforeSection { .. } => {
                "Open a section with a line like '= Header' before writing content.".to_string()
            }
            Self::UnclosedMacro { .. } => {
                "Every '[' after a macro name needs a matching ']'. Escape literal brackets as \\[ and \\].".to_string()
            }
            Self::UnknownMacro { .. } => "Check the macro name for typos.".to_string(),
            Self::TextAfterMacro { .. } => {
                "Move the text in front of the first inline macro.".to_string()
            }
            Self::InlineMacroParams { .. } => {
                "Inline macros such as #hint[...] take no parameters.".to_string()
            }
            Self::DuplicateInlineMacro { .. } => {
                "Each inline macro may appear only once.".to_string()
            }
            Self::InlineMacroMismatch {
                invalid, missing, ..
            } => {
                if !missing.is_empty() {
                    let blocks: Vec<String> = missing.iter().map(|m| format!("#{}[...]", m)).collect();
                    format!("Add {}.", blocks.join(", "))
                } else {
                    format!("Remove {}.", invalid.join(", "))
                }
            }
            Self::InvalidParamKey { allowed, .. } if allowed.is_empty() => {
                "This macro takes no parameters.".to_string()
            }
            Self::InvalidParamKey { allowed, .. } => {
                format!("Allowed parameters: {}.", allowed.join(", "))
            }
            Self::InvalidParamType { key, expected, .. } => {
                format!("Use a {} value for '{}'.", expected, key)
            }
            Self::InvalidParamValue { allowed, .. } => {
                format!("Use one of: {}.", allowed.join(", "))
            }
            Self::MissingParam { key, .. } => {
                format!("Add {}: \"...\" to the macro parameters.", key)
            }
            Self::MissingContent { macro_name } => {
                format!("Write the text inside the brackets: #{}[...].", macro_name)
            }
            Self::EmptyTable => "Write one row per line, cells separated by commas.".to_string(),
            Self::TableRowMismatch { .. } => {
                "Escape commas inside a cell as \\,.".to_string()
            }
            Self::MissingCodeBlock { .. } => {
                "Put a fenced ``` code block inside the macro.".to_string()
            }
            Self::MissingCodeLanguage { .. } => {
                "Add a language after the opening fence, e.g. ```python.".to_string()
            }
            Self::UnsupportedLanguage { .. } => {
                let supported: Vec<&str> = CodeLanguage::ALL.iter().map(CodeLanguage::as_str).collect();
                format!("Supported languages: {}.", supported.join(", "))
            }
            Self::MissingGaps => {
                "Mark each gap as ((answer)) or ((answer|alternative)).".to_string()
            }
            Self::EmptyGap { .. } => {
                "Write at least one answer between the parentheses, e.g. ((cat)).".to_string()
            }
            Self::InvalidMcq { .. } => {
                "Mark options as '- [x] correct' or '- [ ] wrong'.".to_string()
            }
            Self::ImageUnavailable { .. } => {
                "Image paths are resolved relative to the file that uses them.".to_string()
            }
            Self::InSection { error, .. } => return error.hint(),
        };
        Some(hint)
    }

    /// Strips section wrappers, returning the innermost failure.
    pub fn innermost(&self) -> &ParseError {
        match self {
            Self::InSection { error, .. } => error.innermost(),
            other => other,
        }
    }

    /// Attaches the section the failure happened in.
    pub fn in_section(self, header: impl Into<String>, line: usize) -> Self {
        Self::InSection {
            header: header.into(),
            line,
            error: Box::new(self),
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(ParseError::code(self)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.hint().map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}
