//! Issue accumulation across one run.

use log::debug;

use crate::diagnostics::normalize::normalize;
use crate::diagnostics::report::IssueReport;
use crate::diagnostics::{ContentIssue, Failure, IssueContext, PathSegment};

/// Defaults applied to every issue added in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueScope {
    pub file_path: Option<String>,
    pub path: Vec<PathSegment>,
    pub context: Option<IssueContext>,
}

impl IssueScope {
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }

    pub fn with_path<S: Into<PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: IssueContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Fills what `issue` does not already say.
    fn apply(&self, issue: &mut ContentIssue) {
        if issue.file_path.is_none() {
            issue.file_path.clone_from(&self.file_path);
        }
        if issue.path.is_empty() {
            issue.path.clone_from(&self.path);
        }
        if let Some(scope_context) = &self.context {
            match &mut issue.context {
                Some(context) => context.fill_from(scope_context),
                None => issue.context = Some(scope_context.clone()),
            }
        }
    }
}

/// Growable list of issues. Adding never fails; [`IssueCollector::check`]
/// fails once at the end with everything collected.
///
/// One collector belongs to one document or one batch; merge finished
/// collectors with [`IssueCollector::merge`] instead of sharing one.
#[derive(Debug, Clone, Default)]
pub struct IssueCollector {
    issues: Vec<ContentIssue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, failure: impl Into<Failure>, scope: &IssueScope) {
        for mut issue in normalize(failure.into()) {
            scope.apply(&mut issue);
            debug!(
                "collected {} in {}",
                issue.code,
                issue.file_path.as_deref().unwrap_or("(unknown file)")
            );
            self.issues.push(issue);
        }
    }

    pub fn merge(&mut self, other: IssueCollector) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[ContentIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ContentIssue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fails with the bundled, formatted report when anything was collected.
    pub fn check(&self, title: &str) -> Result<(), IssueReport> {
        if self.issues.is_empty() {
            return Ok(());
        }
        Err(IssueReport::new(title, &self.issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{codes, ParseError};

    #[test]
    fn scope_fills_only_absent_fields() {
        let mut collector = IssueCollector::new();
        let own = ContentIssue::new(codes::EMPTY_PAGE, "Page has no content")
            .with_file_path("own.typ")
            .with_context(IssueContext::default().with_course("a"));
        let scope = IssueScope::for_file("scope.typ")
            .with_path(["chapters", "intro"])
            .with_context(IssueContext::default().with_course("b"));
        collector.add(own, &scope);

        let issue = &collector.issues()[0];
        assert_eq!(issue.file_path.as_deref(), Some("own.typ"));
        assert_eq!(issue.path.len(), 2);
        assert_eq!(issue.course_ids().count(), 2);
    }

    #[test]
    fn check_passes_when_empty_and_fails_with_all_issues() {
        let mut collector = IssueCollector::new();
        assert!(collector.check("Content").is_ok());

        collector.add(ParseError::MissingTitle, &IssueScope::for_file("a.typ"));
        collector.add("Something odd", &IssueScope::for_file("b.typ"));
        let report = collector.check("Content").unwrap_err();
        assert_eq!(report.issues().len(), 2);
        assert!(report.to_string().contains("a.typ"));
        assert!(report.to_string().contains("b.typ"));
    }
}
