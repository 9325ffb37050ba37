//! Per-macro behavior, driven through full page parses.

mod common;

use std::path::{Path, PathBuf};

use coursemark::assets::{AssetError, ImageAssets, ResolvedImage};
use coursemark::ast::{
    CodeLanguage, GapMode, HighlightIcon, ImageSize, MacroNode, Markdown,
};
use coursemark::errors::codes;
use coursemark::{DocumentParser, ParseError};

use common::{parse_macro, parse_macro_with, PIXEL_PNG};

#[test]
fn test_gap_text_mode_accepts_every_alternative() {
    let MacroNode::Gap(gap) = parse_macro("#gap(mode: 'text')[The ((Cat|dog)) sat]").unwrap() else {
        panic!("expected a gap node");
    };
    assert_eq!(gap.mode, GapMode::Text);
    assert_eq!(gap.content, Markdown::new("The {{gap:0}} sat"));
    assert_eq!(gap.fields.len(), 1);
    assert_eq!(gap.fields[0].correct, vec!["cat", "dog"]);
    assert_eq!(gap.fields[0].options, None);
}

#[test]
fn test_gap_mcq_mode_is_deterministic() {
    let body = "#gap(mode: 'mcq')[The ((cat|dog|bird)) sat on ((the mat|a chair))]";
    let MacroNode::Gap(first) = parse_macro(body).unwrap() else {
        panic!("expected a gap node");
    };
    let MacroNode::Gap(second) = parse_macro(body).unwrap() else {
        panic!("expected a gap node");
    };
    assert_eq!(first, second);
    assert_eq!(first.content, Markdown::new("The {{gap:0}} sat on {{gap:1}}"));

    let field = &first.fields[0];
    assert_eq!(field.correct, vec!["cat"]);
    let mut options = field.options.clone().unwrap();
    options.sort();
    assert_eq!(options, vec!["bird", "cat", "dog"]);
}

#[test]
fn test_gap_without_placeholders_fails() {
    let err = parse_macro("#gap[Nothing to fill]").unwrap_err();
    assert_eq!(err.innermost(), &ParseError::MissingGaps);
}

#[test]
fn test_gap_cat_or_dog_in_both_modes() {
    let MacroNode::Gap(text) = parse_macro("#gap(mode: text)[The ((cat|dog)) sat]").unwrap() else {
        panic!("expected a gap node");
    };
    assert_eq!(text.content, Markdown::new("The {{gap:0}} sat"));
    assert_eq!(text.fields[0].correct, vec!["cat", "dog"]);
    assert_eq!(text.fields[0].options, None);

    let MacroNode::Gap(mcq) = parse_macro("#gap(mode: mcq)[The ((cat|dog)) sat]").unwrap() else {
        panic!("expected a gap node");
    };
    assert_eq!(mcq.mode, GapMode::Mcq);
    assert_eq!(mcq.content, Markdown::new("The {{gap:0}} sat"));
    assert_eq!(mcq.fields[0].correct, vec!["cat"]);
    assert_eq!(
        mcq.fields[0].options,
        Some(vec!["dog".to_string(), "cat".to_string()])
    );
}

#[test]
fn test_gap_with_blank_alternatives_fails() {
    let err = parse_macro("#gap(mode: 'mcq')[The (( )) sat on ((mat))]").unwrap_err();
    assert_eq!(err.innermost(), &ParseError::EmptyGap { index: 0 });
    assert_eq!(err.code(), codes::EMPTY_GAP);
    assert!(err.hint().is_some());

    let err = parse_macro("#gap[The ((cat)) sat on (( | ))]").unwrap_err();
    assert_eq!(err.innermost(), &ParseError::EmptyGap { index: 1 });
}

#[test]
fn test_inline_macro_with_params_is_rejected() {
    let err = parse_macro("#math-task[\n  Solve x + 1 = 2.\n  #hint(level: 1)[Subtract]\n  #solution[1]\n]")
        .unwrap_err();
    assert_eq!(err.code(), codes::INLINE_MACRO_PARAMS);
    assert_eq!(
        err.innermost(),
        &ParseError::InlineMacroParams {
            macro_name: "math-task".into(),
            inline: "hint".into(),
        }
    );
}

#[test]
fn test_table_row_mismatch_names_row_two() {
    let err = parse_macro("#table[\n  a,b\n  1,2,3\n]").unwrap_err();
    assert_eq!(
        err.innermost(),
        &ParseError::TableRowMismatch {
            row: 2,
            expected: 2,
            found: 3,
        }
    );
}

#[test]
fn test_table_cells_honor_escapes() {
    let MacroNode::Table(table) = parse_macro(r"#table[
  Name, Note
  Ada, first\, and best
]")
    .unwrap() else {
        panic!("expected a table node");
    };
    assert_eq!(table.header, vec![Markdown::new("Name"), Markdown::new("Note")]);
    assert_eq!(
        table.rows,
        vec![vec![Markdown::new("Ada"), Markdown::new("first, and best")]]
    );
}

#[test]
fn test_highlight_icon_is_validated() {
    let MacroNode::Highlight(node) = parse_macro("#highlight[Careful]").unwrap() else {
        panic!("expected a highlight node");
    };
    assert_eq!(node.icon, HighlightIcon::Info);

    let err = parse_macro("#highlight(icon: 'danger')[Careful]").unwrap_err();
    assert_eq!(err.code(), codes::INVALID_PARAM_VALUE);
    let err = parse_macro("#highlight(colour: 'red')[Careful]").unwrap_err();
    assert_eq!(err.code(), codes::INVALID_PARAM_KEY);
}

#[test]
fn test_code_task_reads_starter_language() {
    let body = "#code-task[
  Write `add`.
  #hint[Use +]
  #solution[Return a + b]
  #starter[
    ```ts
    function add(a, b) {}
    ```
  ]
  #validation[
    ```
    assert(add(1, 2) === 3)
    ```
  ]
]";
    let MacroNode::CodeTask(task) = parse_macro(body).unwrap() else {
        panic!("expected a code task");
    };
    assert_eq!(task.instruction, Markdown::new("Write `add`."));
    assert_eq!(task.hint, Markdown::new("Use +"));
    assert_eq!(task.language, CodeLanguage::Ts);
    assert_eq!(task.starter, "function add(a, b) {}");
    assert_eq!(task.validation.as_deref(), Some("assert(add(1, 2) === 3)"));
}

#[test]
fn test_code_runner_rejects_unknown_language() {
    let err = parse_macro("#code-runner[\n```rust\nfn main() {}\n```\n]").unwrap_err();
    assert!(matches!(
        err.innermost(),
        ParseError::UnsupportedLanguage { language, .. } if language == "rust"
    ));

    let MacroNode::CodeRunner(runner) =
        parse_macro("#code-runner[\n```python\nprint(1)\n```\n]").unwrap()
    else {
        panic!("expected a code runner");
    };
    assert_eq!(runner.language, CodeLanguage::Python);
    assert_eq!(runner.code, "print(1)");
}

#[test]
fn test_task_reports_missing_inline_macros() {
    let err = parse_macro("#math-task[\n  Solve x + 1 = 2.\n  #hint[Subtract]\n]").unwrap_err();
    assert_eq!(err.code(), codes::MISSING_INLINE_MACROS);
    let err = parse_macro("#math-task[\n  Solve.\n  #hint[a]\n  #solution[b]\n  #tip[c]\n]")
        .unwrap_err();
    assert_eq!(err.code(), codes::INVALID_INLINE_MACROS);
}

#[test]
fn test_mcq_single_and_multiple() {
    let MacroNode::Mcq(mcq) =
        parse_macro("#mcq[\n  Capital of France?\n  - [x] Paris\n  - [ ] Rome\n]").unwrap()
    else {
        panic!("expected an mcq node");
    };
    assert_eq!(mcq.question, Markdown::new("Capital of France?"));
    assert!(!mcq.multiple);
    assert_eq!(
        mcq.options.iter().map(|o| o.correct).collect::<Vec<_>>(),
        vec![true, false]
    );

    let two_correct = "\n  Primes?\n  - [x] 2\n  - [x] 3\n  - [ ] 4\n";
    let err = parse_macro(&format!("#mcq[{}]", two_correct)).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_MCQ);
    assert!(parse_macro(&format!("#mcq(multiple: true)[{}]", two_correct)).is_ok());
}

struct StubAssets;

impl ImageAssets for StubAssets {
    fn resolve(&self, reference: &str, caller: Option<&Path>) -> Result<ResolvedImage, AssetError> {
        if reference == "missing.png" {
            return Err(AssetError::NotFound {
                path: PathBuf::from(reference),
            });
        }
        let caller = caller.and_then(Path::parent).unwrap_or(Path::new(""));
        Ok(ResolvedImage {
            public_url: format!("/assets/{}", reference),
            absolute_path: caller.join(reference),
        })
    }

    fn read(&self, _image: &ResolvedImage) -> Result<Vec<u8>, AssetError> {
        Ok(PIXEL_PNG.to_vec())
    }
}

#[test]
fn test_image_is_resolved_and_measured() {
    let parser = DocumentParser::new()
        .with_assets(&StubAssets)
        .with_source_path(Path::new("content/intro.typ"));
    let MacroNode::Image(image) =
        parse_macro_with(parser, "#image(\"pic.png\")[A *small* pixel]").unwrap()
    else {
        panic!("expected an image node");
    };
    assert_eq!(image.src, "/assets/pic.png");
    assert_eq!((image.width, image.height), (1, 1));
    assert_eq!(image.size, ImageSize::L);
    assert_eq!(image.caption, Some(Markdown::new("A *small* pixel")));

    let err = parse_macro_with(parser, "#image(\"missing.png\")").unwrap_err();
    assert_eq!(err.code(), codes::IMAGE_UNAVAILABLE);
}

#[test]
fn test_quoted_params_unescape_before_reaching_the_macro() {
    let parser = DocumentParser::new().with_assets(&StubAssets);
    let MacroNode::Image(image) =
        parse_macro_with(parser, r#"#image("say \"cheese\".png")"#).unwrap()
    else {
        panic!("expected an image node");
    };
    assert_eq!(image.src, r#"/assets/say "cheese".png"#);

    let MacroNode::Image(image) =
        parse_macro_with(parser, r"#image(source: 'cat\'s (1).png')").unwrap()
    else {
        panic!("expected an image node");
    };
    assert_eq!(image.src, "/assets/cat's (1).png");
}

#[test]
fn test_image_requires_source() {
    let err = parse_macro("#image[Caption only]").unwrap_err();
    assert!(matches!(
        err.innermost(),
        ParseError::MissingParam { key, .. } if key == "source"
    ));
}
