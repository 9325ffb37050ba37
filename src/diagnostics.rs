//! # Content diagnostics
//!
//! Every problem found while building a course ends up as a [`ContentIssue`]:
//! a machine-readable code, a message for the author, an optional hint, and
//! where it happened (file, line, column, structural path, course context).
//!
//! - [`normalize`] turns any [`Failure`] (parse errors, schema violations,
//!   YAML and I/O errors, bare messages) into issues.
//! - [`collector`] accumulates issues across a run without ever failing on add.
//! - [`report`] deduplicates, groups and formats them into one [`IssueReport`].

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

pub mod collector;
pub mod normalize;
pub mod report;

pub use collector::{IssueCollector, IssueScope};
pub use normalize::{normalize, SchemaViolation, ViolationKind};
pub use report::{bundle, format_report, IssueReport};

/// One step of a structural path: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Joins a path as `a.b.0.c`.
pub fn display_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Where in the course an issue belongs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub course_ids: BTreeSet<String>,
}

impl IssueContext {
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_ids.insert(course_id.into());
        self
    }

    /// Fills fields that are absent here from `other`; course ids are unioned.
    pub fn fill_from(&mut self, other: &IssueContext) {
        fill(&mut self.file_path, &other.file_path);
        fill(&mut self.base_path, &other.base_path);
        fill(&mut self.subject_id, &other.subject_id);
        fill(&mut self.topic_id, &other.topic_id);
        fill(&mut self.chapter_id, &other.chapter_id);
        self.course_ids.extend(other.course_ids.iter().cloned());
    }
}

fn fill<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

/// A single problem with the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIssue {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<IssueContext>,
    /// Text of the underlying failure, when the message rephrases it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Fields that make two issues the same issue.
pub type IssueKey = (
    Option<String>,
    Option<usize>,
    Option<usize>,
    String,
    String,
    Option<String>,
    Vec<PathSegment>,
);

impl ContentIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
            file_path: None,
            line: None,
            col: None,
            path: Vec::new(),
            context: None,
            cause: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn at(mut self, line: Option<usize>, col: Option<usize>) -> Self {
        self.line = line;
        self.col = col;
        self
    }

    pub fn with_path<S: Into<PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: IssueContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn key(&self) -> IssueKey {
        (
            self.file_path.clone(),
            self.line,
            self.col,
            self.code.clone(),
            self.message.clone(),
            self.hint.clone(),
            self.path.clone(),
        )
    }

    pub fn course_ids(&self) -> impl Iterator<Item = &String> {
        self.context.iter().flat_map(|context| context.course_ids.iter())
    }
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Anything that can be turned into issues.
#[derive(Debug)]
pub enum Failure {
    Issue(ContentIssue),
    Issues(Vec<ContentIssue>),
    Parse(ParseError),
    Schema(Vec<SchemaViolation>),
    Yaml(serde_yaml::Error),
    Io(io::Error),
    Message(String),
}

impl From<ContentIssue> for Failure {
    fn from(issue: ContentIssue) -> Self {
        Failure::Issue(issue)
    }
}

impl From<Vec<ContentIssue>> for Failure {
    fn from(issues: Vec<ContentIssue>) -> Self {
        Failure::Issues(issues)
    }
}

impl From<ParseError> for Failure {
    fn from(error: ParseError) -> Self {
        Failure::Parse(error)
    }
}

impl From<Vec<SchemaViolation>> for Failure {
    fn from(violations: Vec<SchemaViolation>) -> Self {
        Failure::Schema(violations)
    }
}

impl From<serde_yaml::Error> for Failure {
    fn from(error: serde_yaml::Error) -> Self {
        Failure::Yaml(error)
    }
}

impl From<io::Error> for Failure {
    fn from(error: io::Error) -> Self {
        Failure::Io(error)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Message(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_fill_keeps_own_values_and_unions_courses() {
        let mut own = IssueContext {
            subject_id: Some("math".into()),
            ..IssueContext::default()
        }
        .with_course("a");
        let scope = IssueContext {
            subject_id: Some("physics".into()),
            topic_id: Some("waves".into()),
            ..IssueContext::default()
        }
        .with_course("b");
        own.fill_from(&scope);
        assert_eq!(own.subject_id.as_deref(), Some("math"));
        assert_eq!(own.topic_id.as_deref(), Some("waves"));
        assert_eq!(own.course_ids.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn issues_serialize_in_camel_case() {
        let issue = ContentIssue::new("content.invalid", "Broken")
            .with_file_path("a.typ")
            .with_path(["sections", "Intro"]);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["filePath"], "a.typ");
        assert_eq!(json["path"][1], "Intro");
        assert!(json.get("hint").is_none());
    }
}
