//! Bundling and text rendering of collected issues.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::diagnostics::{display_path, ContentIssue, IssueKey};
use crate::errors::codes;

const UNKNOWN_FILE: &str = "(unknown file)";

/// Keeps the first issue per key, in first-seen order, with the course ids of
/// every duplicate merged into it.
pub fn bundle(issues: &[ContentIssue]) -> Vec<ContentIssue> {
    let mut bundled: Vec<ContentIssue> = Vec::with_capacity(issues.len());
    let mut seen: HashMap<IssueKey, usize> = HashMap::new();
    for issue in issues {
        match seen.get(&issue.key()) {
            Some(&index) => {
                let courses: Vec<String> = issue.course_ids().cloned().collect();
                if !courses.is_empty() {
                    bundled[index]
                        .context
                        .get_or_insert_with(Default::default)
                        .course_ids
                        .extend(courses);
                }
            }
            None => {
                seen.insert(issue.key(), bundled.len());
                bundled.push(issue.clone());
            }
        }
    }
    bundled
}

/// The heading an issue is grouped under.
pub fn issue_label(issue: &ContentIssue) -> String {
    let context = issue.context.as_ref();
    if let Some(file) = issue
        .file_path
        .as_deref()
        .or_else(|| context.and_then(|c| c.file_path.as_deref()))
    {
        return file.to_string();
    }
    let Some(context) = context else {
        return UNKNOWN_FILE.to_string();
    };
    if let Some(base) = &context.base_path {
        return base.clone();
    }
    let ids: Vec<&str> = [&context.subject_id, &context.topic_id, &context.chapter_id]
        .into_iter()
        .filter_map(|id| id.as_deref())
        .collect();
    if ids.is_empty() {
        UNKNOWN_FILE.to_string()
    } else {
        ids.join("/")
    }
}

fn missing_last(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn issue_order(a: &ContentIssue, b: &ContentIssue) -> Ordering {
    missing_last(a.line, b.line)
        .then_with(|| missing_last(a.col, b.col))
        .then_with(|| a.message.cmp(&b.message))
}

fn issue_line(issue: &ContentIssue) -> String {
    let mut parts = Vec::new();
    if let Some(line) = issue.line {
        parts.push(format!("Line {}", line));
    }
    if let Some(col) = issue.col {
        parts.push(format!("Col {}", col));
    }
    let mut prefix = parts.join(", ");
    if !issue.path.is_empty() {
        if !prefix.is_empty() {
            prefix.push_str(": ");
        }
        prefix.push_str(&format!("Field {}", display_path(&issue.path)));
    }
    if prefix.is_empty() {
        issue.message.clone()
    } else {
        format!("{}: {}", prefix, issue.message)
    }
}

/// Renders the bundled issues grouped by label.
pub fn format_report(issues: &[ContentIssue], title: &str) -> String {
    let bundled = bundle(issues);
    let mut groups: BTreeMap<String, Vec<&ContentIssue>> = BTreeMap::new();
    for issue in &bundled {
        groups.entry(issue_label(issue)).or_default().push(issue);
    }

    let mut out = format!(
        "{} ({} issue{})\n",
        title,
        bundled.len(),
        if bundled.len() == 1 { "" } else { "s" }
    );
    for (label, mut group) in groups {
        group.sort_by(|a, b| issue_order(a, b));
        out.push('\n');
        out.push_str(&label);
        out.push('\n');

        let mut courses = BTreeSet::new();
        for issue in group {
            out.push_str("  ");
            out.push_str(&issue_line(issue));
            out.push('\n');
            if let Some(hint) = &issue.hint {
                out.push_str("    Hint: ");
                out.push_str(hint);
                out.push('\n');
            }
            if codes::is_course_relevant(&issue.code) {
                courses.extend(issue.course_ids().cloned());
            }
        }
        if !courses.is_empty() {
            out.push_str("  Courses: ");
            out.push_str(&courses.into_iter().collect::<Vec<_>>().join(", "));
            out.push('\n');
        }
    }
    out
}

/// Everything collected in a run, as one failure.
#[derive(Debug, Clone, Error)]
#[error("{text}")]
pub struct IssueReport {
    title: String,
    issues: Vec<ContentIssue>,
    text: String,
}

impl IssueReport {
    pub fn new(title: impl Into<String>, issues: &[ContentIssue]) -> Self {
        let title = title.into();
        let text = format_report(issues, &title);
        Self {
            title,
            issues: bundle(issues),
            text,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The bundled issues.
    pub fn issues(&self) -> &[ContentIssue] {
        &self.issues
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Diagnostic for IssueReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("coursemark::content_issues"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "Fix the {} issue(s) above and run again.",
            self.issues.len()
        )))
    }
}
