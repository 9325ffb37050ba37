//! Handles all user-facing output for the CLI.
//!
//! Reports and summaries are written to stdout; colour is used only when
//! stdout is a terminal and `--no-color` was not given.

use std::io::{IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::IssueReport;

pub fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !std::io::stdout().is_terminal() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Prints a report: red header, bold file labels, dimmed hints.
pub fn print_report(report: &IssueReport, choice: ColorChoice) {
    let mut stdout = StandardStream::stdout(choice);
    let mut lines = report.text().lines();
    if let Some(header) = lines.next() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = writeln!(stdout, "{}", header);
        let _ = stdout.reset();
    }
    for line in lines {
        if line.trim_start().starts_with("Hint:") {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        } else if line.starts_with("  Courses:") {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        } else if !line.is_empty() && !line.starts_with(' ') {
            let _ = stdout.set_color(ColorSpec::new().set_bold(true));
        }
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.reset();
    }
}

pub fn print_success(message: &str, choice: ColorChoice) {
    let mut stdout = StandardStream::stdout(choice);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "{}", message);
    let _ = stdout.reset();
}

pub fn print_list(items: &[&str]) {
    for item in items {
        println!("{}", item);
    }
}
