//! Golden output of the collected-issues report.

mod common;

use coursemark::diagnostics::{
    bundle, ContentIssue, IssueCollector, IssueContext, IssueScope, SchemaViolation,
    ViolationKind,
};
use coursemark::errors::codes;
use coursemark::{parse_page, ParseError};

use common::page_with;

fn chapter_scope(course: &str) -> IssueScope {
    IssueScope::default().with_context(
        IssueContext {
            subject_id: Some("math".into()),
            chapter_id: Some("intro".into()),
            ..IssueContext::default()
        }
        .with_course(course),
    )
}

#[test]
fn test_report_groups_sorts_and_lists_courses() {
    let mut collector = IssueCollector::new();
    let err = parse_page(&page_with("#quiz[What?]")).unwrap_err();
    collector.add(err, &IssueScope::for_file("a.typ"));
    collector.add("Duplicate chapter folder 'intro'", &chapter_scope("a"));
    collector.add("Duplicate chapter folder 'intro'", &chapter_scope("b"));
    collector.add(ParseError::MissingTitle, &IssueScope::for_file("a.typ"));

    let report = collector.check("Content issues").unwrap_err();
    let expected = "Content issues (3 issues)

a.typ
  Line 2: Field section.Section: Unknown macro '#quiz'
    Hint: Check the macro name for typos.
  Missing title: the document must start with #title[...]
    Hint: Start the file with #title[Your title].

math/intro
  Duplicate chapter folder 'intro'
    Hint: Give every chapter its own folder.
  Courses: a, b
";
    assert_eq!(report.text(), expected);
    assert_eq!(report.issues().len(), 3);
}

#[test]
fn test_bundle_is_idempotent_and_never_grows() {
    let issues = vec![
        ContentIssue::new(codes::EMPTY_PAGE, "Empty")
            .with_file_path("a.typ")
            .with_context(IssueContext::default().with_course("x")),
        ContentIssue::new(codes::EMPTY_PAGE, "Empty")
            .with_file_path("a.typ")
            .with_context(IssueContext::default().with_course("y")),
        ContentIssue::new(codes::EMPTY_PAGE, "Empty").with_file_path("b.typ"),
        ContentIssue::new(codes::INVALID, "Odd").at(Some(1), Some(2)),
        ContentIssue::new(codes::INVALID, "Odd").at(Some(1), None),
    ];
    let once = bundle(&issues);
    assert!(once.len() <= issues.len());
    assert_eq!(once.len(), 4);
    assert_eq!(bundle(&once), once);
    assert_eq!(
        once[0].course_ids().cloned().collect::<Vec<_>>(),
        vec!["x", "y"]
    );
}

#[test]
fn test_missing_position_sorts_last() {
    let mut collector = IssueCollector::new();
    let scope = IssueScope::for_file("page.typ");
    collector.add(ContentIssue::new(codes::INVALID, "b"), &scope);
    collector.add(ContentIssue::new(codes::INVALID, "c").at(Some(9), None), &scope);
    collector.add(ContentIssue::new(codes::INVALID, "a").at(Some(3), Some(4)), &scope);
    let report = collector.check("Report").unwrap_err();
    let lines: Vec<&str> = report.text().lines().skip(3).collect();
    assert_eq!(lines, vec!["  Line 3, Col 4: a", "  Line 9: c", "  b"]);
}

#[test]
fn test_schema_violations_use_author_phrasing() {
    let mut collector = IssueCollector::new();
    collector.add(
        vec![SchemaViolation::new(
            ["chapters", "0", "title"],
            ViolationKind::InvalidType {
                expected: "string".into(),
                received: "number".into(),
            },
        )],
        &IssueScope::for_file("course.yaml"),
    );
    let issue = &collector.issues()[0];
    assert_eq!(issue.code, codes::CONFIG_INVALID_TYPE);
    assert_eq!(issue.message, "Expected text, got number");
    assert_eq!(issue.file_path.as_deref(), Some("course.yaml"));
}

#[test]
fn test_unclassified_failures_fall_back_to_generic_code() {
    let mut collector = IssueCollector::new();
    collector.add(
        "Unexpected token at line 4, column 2".to_string(),
        &IssueScope::for_file("x.typ"),
    );
    let issue = &collector.issues()[0];
    assert_eq!(issue.code, codes::INVALID);
    assert_eq!((issue.line, issue.col), (Some(4), Some(2)));
}
