//! Batch driver: read every page source, parse it, collect its issues and
//! optionally write the parsed pages.
//!
//! Each document gets its own [`IssueCollector`]; a failing document never
//! stops its siblings. The per-document lists are merged at the end.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::assets::{ImageAssets, NoImageAssets};
use crate::ast::Page;
use crate::diagnostics::{ContentIssue, IssueCollector, IssueContext, IssueReport, IssueScope};
use crate::document::DocumentParser;
use crate::errors::codes;
use crate::macros::{default_registry, MacroRegistry};

pub trait SourceReader {
    fn read_text(&self, path: &Path) -> io::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

pub trait DocumentWriter {
    /// Persists the page parsed from `source`.
    fn write_page(&self, source: &Path, page: &Page) -> io::Result<()>;
}

/// Writes each page as pretty JSON, mirroring the content tree.
#[derive(Debug, Clone)]
pub struct JsonPageWriter {
    content_root: PathBuf,
    output_dir: PathBuf,
}

impl JsonPageWriter {
    pub fn new(content_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.content_root).unwrap_or(source);
        self.output_dir.join(relative).with_extension("json")
    }
}

impl DocumentWriter for JsonPageWriter {
    fn write_page(&self, source: &Path, page: &Page) -> io::Result<()> {
        let target = self.output_path(source);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(page)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&target, json)?;
        debug!("wrote {}", target.display());
        Ok(())
    }
}

/// What happened to one source file.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub page: Option<Page>,
    pub issues: Vec<ContentIssue>,
}

/// Totals of a batch run plus every issue found.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub documents: usize,
    pub parsed: usize,
    pub written: usize,
    pub issues: IssueCollector,
}

impl RunSummary {
    pub fn check(&self, title: &str) -> Result<(), IssueReport> {
        self.issues.check(title)
    }
}

pub struct Pipeline<'a> {
    content_root: PathBuf,
    reader: &'a dyn SourceReader,
    assets: &'a dyn ImageAssets,
    registry: &'a MacroRegistry,
}

static NO_IMAGE_ASSETS: NoImageAssets = NoImageAssets;
static FS_SOURCE_READER: FsSourceReader = FsSourceReader;

impl<'a> Pipeline<'a> {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            reader: &FS_SOURCE_READER,
            assets: &NO_IMAGE_ASSETS,
            registry: default_registry(),
        }
    }

    pub fn with_reader(mut self, reader: &'a dyn SourceReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_assets(mut self, assets: &'a dyn ImageAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_registry(mut self, registry: &'a MacroRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn scope_for(&self, path: &Path) -> IssueScope {
        let relative = path.strip_prefix(&self.content_root).unwrap_or(path);
        let base_path = relative
            .parent()
            .map(|parent| parent.to_string_lossy().replace('\\', "/"))
            .filter(|parent| !parent.is_empty());
        IssueScope::for_file(relative.to_string_lossy().replace('\\', "/")).with_context(
            IssueContext {
                base_path,
                ..IssueContext::default()
            },
        )
    }

    /// Reads and parses one document, collecting rather than returning its
    /// failures.
    pub fn parse_document(&self, path: &Path) -> DocumentOutcome {
        let mut collector = IssueCollector::new();
        let scope = self.scope_for(path);

        let page = match self.reader.read_text(path) {
            Ok(text) => {
                let parser = DocumentParser::new()
                    .with_registry(self.registry)
                    .with_assets(self.assets)
                    .with_source_path(path);
                match parser.parse_page(&text) {
                    Ok(page) => Some(page),
                    Err(error) => {
                        collector.add(error, &scope);
                        None
                    }
                }
            }
            Err(error) => {
                collector.add(error, &scope);
                None
            }
        };

        if let Some(page) = &page {
            if page.content.iter().all(|section| section.content.is_empty()) {
                collector.add(
                    ContentIssue::new(codes::EMPTY_PAGE, format!("Page '{}' has no content", page.title))
                        .with_hint("Add at least one section with content."),
                    &scope,
                );
            }
        }

        DocumentOutcome {
            path: path.to_path_buf(),
            page,
            issues: collector.into_issues(),
        }
    }

    /// Parses every path and, when a writer is given, writes the pages that
    /// parsed.
    pub fn run(&self, paths: &[PathBuf], writer: Option<&dyn DocumentWriter>) -> RunSummary {
        let mut summary = RunSummary::default();
        for path in paths {
            let outcome = self.parse_document(path);
            summary.documents += 1;
            let mut collector = IssueCollector::new();
            collector.add(outcome.issues, &IssueScope::default());

            if let Some(page) = &outcome.page {
                summary.parsed += 1;
                if let Some(writer) = writer {
                    match writer.write_page(path, page) {
                        Ok(()) => summary.written += 1,
                        Err(error) => collector.add(error, &self.scope_for(path)),
                    }
                }
            }
            summary.issues.merge(collector);
        }
        info!(
            "processed {} document(s): {} parsed, {} written, {} issue(s)",
            summary.documents,
            summary.parsed,
            summary.written,
            summary.issues.len()
        );
        summary
    }
}
