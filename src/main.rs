#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # grader
//! ## Introduction
//!
//! Command line client for the grading service.
//!
//! ## Usage
//!
//! `grader cases <QUESTION>` lists the test cases of a question.
//! `grader check <DESCRIPTOR> <JSON>` checks a JSON value against a type
//! descriptor such as `list(tuple(str,int))`.
//! `grader run <QUESTION> <PROGRAM> [ARG]...` grades a program that reads
//! `{"args": [...], "kwargs": {...}}` on stdin and prints its result as JSON.

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use grader::{
    ClientConfig, GradeError, ScoringBackend, Value,
    backend,
    process::CommandSolution,
    report,
    validate::ValidationError,
    validate_str,
    value::preview,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};
use url::Url;

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Print the test cases of a question
    Cases(String),
    /// Check a JSON value against a type descriptor
    Check(String, String),
    /// Grade an external program
    Run(String, String, Vec<String>),
}

/// Options shared by every command.
#[derive(Debug, Clone)]
struct Options {
    /// Grading service to use instead of the configured one
    base_url: Option<Url>,
    /// Log at debug level
    verbose:  bool,
    /// What to do
    cmd:      Cmd,
}

/// Parse the command line arguments and return the `Options`
fn options() -> Options {
    /// parses the question name
    fn q() -> impl Parser<String> {
        positional("QUESTION").help("Name of the question")
    }

    let cases = construct!(Cmd::Cases(q()))
        .to_options()
        .command("cases")
        .help("Print the test cases of a question");

    let check = {
        let descriptor =
            positional::<String>("DESCRIPTOR").help("Type descriptor, e.g. `list(int)`");
        let json = positional::<String>("JSON").help("JSON value to check");
        construct!(Cmd::Check(descriptor, json))
            .to_options()
            .command("check")
            .help("Check a JSON value against a type descriptor")
    };

    let run = {
        let program =
            positional::<String>("PROGRAM").help("Program computing one result per run");
        let args = positional::<String>("ARG")
            .help("Arguments passed to the program")
            .many();
        construct!(Cmd::Run(q(), program, args))
            .to_options()
            .command("run")
            .help("Grade an external program")
    };

    let base_url = long("base-url")
        .argument::<Url>("URL")
        .help("Grading service to use instead of the configured one")
        .optional();
    let verbose = short('v')
        .long("verbose")
        .help("Print debug logs")
        .switch();
    let cmd = construct!([cases, check, run]);

    construct!(Options {
        base_url,
        verbose,
        cmd
    })
    .to_options()
    .descr("Client for the grading service")
    .run()
}

/// Fetches and prints the test cases of `question`.
fn cases(config: &ClientConfig, question: &str) -> Result<(), GradeError> {
    report::print_warnings(config.warnings());
    let cases = backend::from_config(config)?.fetch_test_cases(question)?;
    println!("{}", report::cases_table(question, &cases));
    Ok(())
}

/// Checks the JSON `literal` against `descriptor`, exiting with status 3 on a
/// mismatch.
fn check(descriptor: &str, literal: &str) -> Result<()> {
    let value: Value = serde_json::from_str(literal)
        .with_context(|| format!("`{literal}` is not valid JSON"))?;

    match validate_str(&value, descriptor) {
        Ok(()) => {
            println!("{} {} matches {descriptor}", "OK".green().bold(), preview(&value));
            Ok(())
        }
        Err(ValidationError::Mismatch(mismatch)) => {
            eprintln!("{} {mismatch}", "Mismatch:".red().bold());
            std::process::exit(3);
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    dotenv().ok();
    let options = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if options.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();

    let mut config = ClientConfig::load();
    if let Some(base_url) = options.base_url {
        config = config.with_base_url(base_url);
    }

    let outcome = match options.cmd {
        Cmd::Cases(question) => {
            let outcome = cases(&config, &question);
            if let Err(e) = &outcome {
                report::print_error(e);
            }
            outcome
        }
        Cmd::Check(descriptor, literal) => return check(&descriptor, &literal),
        Cmd::Run(question, program, args) => {
            let solution = CommandSolution::new(program, args, config.solution_timeout())?;
            grader::score_with(&config, &question, &solution).map(|_| ())
        }
    };

    if let Err(e) = outcome {
        std::process::exit(e.exit_code());
    }
    Ok(())
}
