//! The coursemark command-line interface.
//!
//! Exit codes: `0` when everything parsed cleanly, `1` when content issues
//! were reported, `2` when the run itself could not proceed.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::info;
use miette::Diagnostic;
use termcolor::ColorChoice;
use thiserror::Error;

use crate::assets::FsImageAssets;
use crate::cli::args::{Command, CoursemarkArgs};
use crate::config::PipelineConfig;
use crate::diagnostics::{IssueCollector, IssueReport, IssueScope};
use crate::discovery::discover_sources;
use crate::document::parse_title;
use crate::macros::default_registry;
use crate::pipeline::{JsonPageWriter, Pipeline};

pub mod args;
pub mod output;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ISSUES: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to scan {}: {source}", .path.display())]
    Discover {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

impl Diagnostic for CliError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            CliError::Discover { .. } => "coursemark::discover",
            CliError::Read { .. } => "coursemark::read",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("Check that the path exists and is readable."))
    }
}

/// The main entry point for the CLI.
pub fn run() {
    let args = CoursemarkArgs::parse();
    process::exit(execute(&args));
}

/// Runs the parsed command and returns the process exit code.
pub fn execute(args: &CoursemarkArgs) -> i32 {
    let color = output::color_choice(args.no_color);
    let config = match load_config(args) {
        Ok(config) => config,
        Err(report) => {
            output::print_report(&report, color);
            return EXIT_FATAL;
        }
    };

    let result = match &args.command {
        Command::Check { dir } => handle_check(&config, dir.as_deref(), color),
        Command::Build { dir, out, public } => {
            handle_build(&config, dir.as_deref(), out.as_deref(), public.as_deref(), color)
        }
        Command::Title { file } => handle_title(file, color),
        Command::ListMacros => {
            output::print_list(&default_registry().names());
            Ok(true)
        }
    };

    match result {
        Ok(true) => EXIT_OK,
        Ok(false) => EXIT_ISSUES,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            EXIT_FATAL
        }
    }
}

fn load_config(args: &CoursemarkArgs) -> Result<PipelineConfig, IssueReport> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_path(path).map_err(|error| {
            let mut collector = IssueCollector::new();
            collector.add(error, &IssueScope::for_file(path.display().to_string()));
            IssueReport::new("Configuration", collector.issues())
        })?,
        None => PipelineConfig::default(),
    };
    if let Some(extension) = &args.extension {
        config.extension = extension.trim_start_matches('.').to_string();
    }
    Ok(config)
}

fn sources(dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>, CliError> {
    discover_sources(dir, &config.extension).map_err(|source| CliError::Discover {
        path: dir.to_path_buf(),
        source,
    })
}

/// Prints the outcome; `Ok(true)` when there was nothing to report.
fn report_outcome(
    result: Result<(), IssueReport>,
    success: String,
    color: ColorChoice,
) -> Result<bool, CliError> {
    match result {
        Ok(()) => {
            output::print_success(&success, color);
            Ok(true)
        }
        Err(report) => {
            output::print_report(&report, color);
            Ok(false)
        }
    }
}

fn handle_check(
    config: &PipelineConfig,
    dir: Option<&Path>,
    color: ColorChoice,
) -> Result<bool, CliError> {
    let dir = dir.unwrap_or(&config.content_dir);
    let files = sources(dir, config)?;
    let assets =
        FsImageAssets::new(dir, &config.public_dir, &config.public_url_prefix).check_only();
    let summary = Pipeline::new(dir).with_assets(&assets).run(&files, None);
    report_outcome(
        summary.check(&config.report_title),
        format!("{} document(s) checked, no issues found.", summary.documents),
        color,
    )
}

fn handle_build(
    config: &PipelineConfig,
    dir: Option<&Path>,
    out: Option<&Path>,
    public: Option<&Path>,
    color: ColorChoice,
) -> Result<bool, CliError> {
    let dir = dir.unwrap_or(&config.content_dir);
    let out = out.unwrap_or(&config.output_dir);
    let public = public.unwrap_or(&config.public_dir);
    let files = sources(dir, config)?;

    let assets = FsImageAssets::new(dir, public, &config.public_url_prefix);
    let writer = JsonPageWriter::new(dir, out);
    let summary = Pipeline::new(dir)
        .with_assets(&assets)
        .run(&files, Some(&writer));
    info!("pages written to {}", out.display());
    report_outcome(
        summary.check(&config.report_title),
        format!("{} page(s) written to {}.", summary.written, out.display()),
        color,
    )
}

fn handle_title(file: &Path, color: ColorChoice) -> Result<bool, CliError> {
    let text = fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    match parse_title(&text) {
        Ok(title) => {
            println!("{}", title);
            Ok(true)
        }
        Err(error) => {
            let mut collector = IssueCollector::new();
            collector.add(error, &IssueScope::for_file(file.display().to_string()));
            report_outcome(collector.check("Title"), String::new(), color)
        }
    }
}
