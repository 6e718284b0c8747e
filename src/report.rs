#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Console output for grading runs.

use colored::Colorize;
use itertools::Itertools;
use tabled::{
    Table, Tabled,
    settings::{Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    client::GradeReport,
    config::ConfigWarning,
    error::GradeError,
    types::TestCase,
    value::preview,
};

/// Frame printed around a score.
const RULE: &str = "==================";

/// One row of the test case table.
#[derive(Tabled)]
struct CaseRow {
    /// Position of the test case.
    #[tabled(rename = "#")]
    index:  usize,
    /// Positional arguments.
    #[tabled(rename = "Arguments")]
    args:   String,
    /// Keyword arguments.
    #[tabled(rename = "Keyword arguments")]
    kwargs: String,
    /// Expected result shape.
    #[tabled(rename = "Expected type")]
    shape:  String,
}

impl CaseRow {
    /// Summarizes `case` for display.
    fn new(index: usize, case: &TestCase) -> Self {
        Self {
            index,
            args: case.args.iter().map(preview).join(", "),
            kwargs: case
                .kwargs
                .iter()
                .map(|(name, value)| format!("{name}={}", preview(value)))
                .join(", "),
            shape: case.type_str.clone(),
        }
    }
}

/// Prints each configuration warning to stderr.
pub fn print_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        eprintln!("{} {warning}", "WARNING:".yellow().bold());
    }
}

/// Renders the result of a run that reached the grading service.
pub fn render_report(report: &GradeReport) -> String {
    let mut lines = vec![RULE.to_string()];
    if report.accepted() {
        let score = match report.score.score {
            Some(score) => format!("{score:?}").green().bold().to_string(),
            None => "not scored".yellow().to_string(),
        };
        lines.push(format!("Your score: {score}"));
    } else {
        lines.push("Error!".red().bold().to_string());
    }
    if let Some(message) = &report.score.error_msg {
        lines.push(message.clone());
    }
    lines.push(RULE.to_string());
    lines.join("\n")
}

/// Prints the result of a run that reached the grading service.
pub fn print_report(report: &GradeReport) {
    println!("{}", render_report(report));
}

/// Renders a failed run.
pub fn render_error(error: &GradeError) -> String {
    match error {
        GradeError::Decode { body, .. } => format!(
            "{}\n{error}\n{body}",
            "There was an error. Please send this output to a staff member."
                .red()
                .bold()
        ),
        _ if error.is_user_error() => format!("{} {error}", "Error!".red().bold()),
        _ => format!("{} {error} (while {})", "Error!".red().bold(), error.stage()),
    }
}

/// Prints a failed run to stderr.
pub fn print_error(error: &GradeError) {
    eprintln!("{}", render_error(error));
}

/// Renders the test cases of `question` as a table.
pub fn cases_table(question: &str, cases: &[TestCase]) -> String {
    let rows = cases
        .iter()
        .enumerate()
        .map(|(index, case)| CaseRow::new(index, case))
        .collect::<Vec<_>>();

    Table::new(rows)
        .with(Panel::header(format!("Test cases for {question}")))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
        .with(Style::modern())
        .to_string()
}
