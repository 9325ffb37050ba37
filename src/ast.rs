//! The typed document tree produced by the assembler.
//!
//! A [`Page`] owns its [`Section`]s, a section owns its [`Node`]s. The tree is
//! built bottom-up once per document and never mutated afterwards. All types
//! serialize to JSON for the external page writer.

use serde::Serialize;

/// A leaf holding author markdown, with protected code already restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markdown(pub String);

impl Markdown {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub content: Vec<Section>,
}

/// Content between one `= Header` line and the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub header: String,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Node {
    Markdown(Markdown),
    Subheader(Markdown),
    Group(MacroGroup),
    Macro(MacroNode),
}

/// A `#group[...]`: optional intro text followed by its member macros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroGroup {
    pub intro: Option<Markdown>,
    pub macros: Vec<MacroNode>,
}

/// Every node a registered macro can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MacroNode {
    Note(NoteNode),
    Highlight(HighlightNode),
    Table(TableNode),
    Image(ImageNode),
    CodeRunner(CodeRunnerNode),
    CodeTask(CodeTaskNode),
    MathTask(TaskNode),
    TextTask(TaskNode),
    Gap(GapNode),
    Mcq(McqNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteNode {
    pub content: Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightIcon {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightNode {
    pub content: Markdown,
    pub icon: HighlightIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableNode {
    pub header: Vec<Markdown>,
    pub rows: Vec<Vec<Markdown>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageSize {
    L,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageNode {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub size: ImageSize,
    pub caption: Option<Markdown>,
}

/// Languages the code runner can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Ts,
    Python,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 2] = [CodeLanguage::Ts, CodeLanguage::Python];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ts" => Some(CodeLanguage::Ts),
            "python" => Some(CodeLanguage::Python),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Ts => "ts",
            CodeLanguage::Python => "python",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeRunnerNode {
    pub language: CodeLanguage,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeTaskNode {
    pub instruction: Markdown,
    pub hint: Markdown,
    pub solution: Markdown,
    pub starter: String,
    pub validation: Option<String>,
    pub language: CodeLanguage,
}

/// Shared shape of math and text tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskNode {
    pub instruction: Markdown,
    pub hint: Markdown,
    pub solution: Markdown,
}

/// One `((a|b))` placeholder of a gap task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapField {
    pub correct: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapMode {
    Text,
    Mcq,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapNode {
    /// Markdown with each placeholder replaced by `{{gap:N}}`.
    pub content: Markdown,
    pub mode: GapMode,
    pub fields: Vec<GapField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqOption {
    pub text: Markdown,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqNode {
    pub question: Markdown,
    pub options: Vec<McqOption>,
    pub multiple: bool,
}

/// The fields an index builder needs without parsing the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_nodes_serialize_with_type_tag() {
        let node = Node::Macro(MacroNode::Note(NoteNode {
            content: Markdown::new("Remember this."),
        }));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "macro");
        assert_eq!(json["value"]["type"], "note");
        assert_eq!(json["value"]["content"], "Remember this.");
    }

    #[test]
    fn code_language_tags_are_closed() {
        assert_eq!(CodeLanguage::from_tag("ts"), Some(CodeLanguage::Ts));
        assert_eq!(CodeLanguage::from_tag("python"), Some(CodeLanguage::Python));
        assert_eq!(CodeLanguage::from_tag("rust"), None);
    }
}
