//! # grader
//!
//! A client for a remote grading service. It fetches the test cases for a
//! question, runs a solution on each, checks that every result has the shape
//! the test case asks for, submits the results, and reports the score.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Where test cases come from and where submissions go
pub mod backend;
/// The grading run and the `Solution` capability
pub mod client;
/// Submission and score wire records
pub mod codec;
/// Client configuration from home directory files and the environment
pub mod config;
/// Parsed type descriptors
pub mod descriptor;
/// Errors that end a grading run
pub mod error;
/// For all parsers used
pub mod parsers;
/// Solutions run as external programs
pub mod process;
/// Console output
pub mod report;
/// Test cases and service replies
pub mod types;
/// Checks values against type descriptors
pub mod validate;
/// The dynamic values solutions consume and produce
pub mod value;

pub use backend::{LocalBackend, RemoteBackend, ScoringBackend};
pub use client::{GradeReport, GradingClient, Solution, Stage, fallible};
pub use config::ClientConfig;
pub use descriptor::TypeDescriptor;
pub use error::GradeError;
pub use types::TestCase;
pub use validate::{validate, validate_str};
pub use value::{Map, Value};

/// Grades `solution` on `question` with the configuration found on this
/// machine, printing the outcome.
pub fn score<S>(question: &str, solution: &S) -> Result<GradeReport, GradeError>
where
    S: Solution + ?Sized,
{
    let config = ClientConfig::load();
    score_with(&config, question, solution)
}

/// Grades `solution` on `question` with `config`, printing the outcome.
pub fn score_with<S>(
    config: &ClientConfig,
    question: &str,
    solution: &S,
) -> Result<GradeReport, GradeError>
where
    S: Solution + ?Sized,
{
    report::print_warnings(config.warnings());

    let outcome = backend::from_config(config)
        .and_then(|backend| GradingClient::new(backend).grade_question(question, solution));

    match &outcome {
        Ok(report) => report::print_report(report),
        Err(e) => report::print_error(e),
    }
    outcome
}
