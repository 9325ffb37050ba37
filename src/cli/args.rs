//! Defines the command-line arguments and subcommands for the coursemark CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "coursemark",
    version,
    about = "Parses course pages written with #macros and reports every authoring issue at once."
)]
pub struct CoursemarkArgs {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extension of page sources, overriding the configuration.
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Never colour the output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse every page under a directory and report all issues.
    Check {
        /// Content directory; defaults to the configured one.
        dir: Option<PathBuf>,
    },
    /// Like `check`, and also write one JSON file per parsed page.
    Build {
        /// Content directory; defaults to the configured one.
        dir: Option<PathBuf>,
        /// Output directory for the JSON pages.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Directory images are copied into.
        #[arg(long)]
        public: Option<PathBuf>,
    },
    /// Print the title of one page.
    Title {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List all available macros.
    ListMacros,
}
