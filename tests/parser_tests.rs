// tests/parser_tests.rs

mod common;

use coursemark::ast::{Markdown, MacroNode, Node, NoteNode, Page, Section};
use coursemark::errors::codes;
use coursemark::syntax::guard::{protect, restore};
use coursemark::syntax::splitter::{split, Segment};
use coursemark::{parse_page, parse_title, summarize, ParseError};

use common::page_with;

#[test]
fn test_parse_page_with_note() {
    let source = "#title[Intro]\n= Section One\nSome **text** before.\n#note[Remember this.]\n";
    let page = parse_page(source).unwrap();
    assert_eq!(
        page,
        Page {
            title: "Intro".into(),
            content: vec![Section {
                header: "Section One".into(),
                content: vec![
                    Node::Markdown(Markdown::new("Some **text** before.")),
                    Node::Macro(MacroNode::Note(NoteNode {
                        content: Markdown::new("Remember this."),
                    })),
                ],
            }],
        }
    );
}

#[test]
fn test_sections_keep_header_order() {
    let page = parse_page("#title[T]\n= One\na\n= Two\nb\n= Three\n").unwrap();
    let headers: Vec<&str> = page.content.iter().map(|s| s.header.as_str()).collect();
    assert_eq!(headers, vec!["One", "Two", "Three"]);
    assert!(page.content[2].content.is_empty());
}

#[test]
fn test_code_protection_round_trip() {
    let text = "Intro with `#note[x]` inline.\n```python\nprint('#gap[((a))]')\n```\nOutro";
    let guarded = protect(text);
    assert_eq!(guarded.blocks.len(), 2);
    assert!(!guarded.text.contains("#note"));
    assert!(!guarded.text.contains("#gap"));
    assert_eq!(restore(&guarded.text, &guarded.blocks), text);
}

#[test]
fn test_code_is_restored_into_markdown() {
    let page = parse_page(&page_with("Call `f(x)` now.\n```ts\nlet a = [1];\n```")).unwrap();
    assert_eq!(
        page.content[0].content,
        vec![Node::Markdown(Markdown::new(
            "Call `f(x)` now.\n```ts\nlet a = [1];\n```"
        ))]
    );
}

#[test]
fn test_balanced_block_content_is_dedented_interior() {
    let segments = split("#note[\n    Line [one]\n      nested\n]").unwrap();
    let [Segment::Macro(block)] = segments.as_slice() else {
        panic!("expected one macro block, got {:?}", segments);
    };
    assert_eq!(block.name, "note");
    assert_eq!(block.content.as_deref(), Some("\nLine [one]\n  nested\n"));
}

#[test]
fn test_unclosed_block_fails() {
    let err = parse_page(&page_with("#note[never closed")).unwrap_err();
    assert!(matches!(err.innermost(), ParseError::UnclosedMacro { name, .. } if name == "note"));
    assert_eq!(err.code(), codes::UNCLOSED_MACRO);
}

#[test]
fn test_unknown_macro_is_reported_with_section() {
    let err = parse_page(&page_with("#quiz[What?]")).unwrap_err();
    match &err {
        ParseError::InSection { header, line, .. } => {
            assert_eq!(header, "Section");
            assert_eq!(*line, 2);
        }
        other => panic!("expected a section error, got {:?}", other),
    }
    assert_eq!(err.code(), codes::UNKNOWN_MACRO);
}

#[test]
fn test_missing_title_has_its_own_code() {
    let err = parse_page("= Section\ntext").unwrap_err();
    assert_eq!(err, ParseError::MissingTitle);
    assert_eq!(err.code(), codes::MISSING_TITLE);
}

#[test]
fn test_title_only_parse_ignores_content() {
    assert_eq!(parse_title("#title[Limits]\n= S\n#quiz[broken").unwrap(), "Limits");
    assert_eq!(summarize("#title[Limits]\n").unwrap().title, "Limits");
}

#[test]
fn test_stray_text_after_inline_macros() {
    let err = parse_page(&page_with(
        "#text-task[\n  Explain.\n  #hint[Think]\n  trailing\n  #solution[Done]\n]",
    ))
    .unwrap_err();
    assert_eq!(err.code(), codes::TEXT_AFTER_MACRO);
}
