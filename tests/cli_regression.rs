// Regression tests for the coursemark binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::write_tree;

fn coursemark() -> Command {
    let mut cmd = Command::cargo_bin("coursemark").unwrap();
    cmd.arg("--no-color");
    cmd
}

#[test]
fn check_passes_on_clean_content() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("intro.typ", b"#title[Intro]\n= One\n#note[Hi]")]);

    coursemark()
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("1 document(s) checked, no issues found."));
}

#[test]
fn check_reports_all_issues_and_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("a.typ", b"= Missing title"),
            ("b.typ", b"#title[B]\n= S\n#quiz[?]"),
        ],
    );

    coursemark()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(
            contains("Content issues (2 issues)")
                .and(contains("a.typ"))
                .and(contains("Unknown macro '#quiz'")),
        );
}

#[test]
fn build_writes_json_pages() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");
    let out = dir.path().join("out");
    write_tree(&content, &[("ch/intro.typ", b"#title[Intro]\n= One\nText.")]);

    coursemark()
        .arg("build")
        .arg(&content)
        .arg("--out")
        .arg(&out)
        .arg("--public")
        .arg(dir.path().join("public"))
        .assert()
        .success();
    let json = fs::read_to_string(out.join("ch/intro.json")).unwrap();
    assert!(json.contains("\"title\": \"Intro\""));
}

#[test]
fn title_prints_only_the_title() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.typ");
    fs::write(&page, "#title[Vectors]\n= S\n#broken[").unwrap();

    coursemark()
        .arg("title")
        .arg(&page)
        .assert()
        .success()
        .stdout("Vectors\n");
}

#[test]
fn list_macros_names_every_builtin() {
    coursemark()
        .arg("list-macros")
        .assert()
        .success()
        .stdout(contains("code-task").and(contains("gap")).and(contains("mcq")));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("coursemark.yaml");
    fs::write(&config, "extension: .typ\n").unwrap();

    coursemark()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(2)
        .stdout(contains("must be a bare name"));
}

#[test]
fn unreadable_directory_is_a_miette_diagnostic() {
    coursemark()
        .arg("check")
        .arg("does/not/exist")
        .assert()
        .code(2)
        .stderr(contains("coursemark::discover").or(contains("Failed to scan")));
}
