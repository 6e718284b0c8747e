#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading run: fetch test cases, run the solution on each, check the
//! shape of every result, submit, and read back a score.

use std::fmt::Display;

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    backend::ScoringBackend,
    codec::{self, Score},
    descriptor::TypeDescriptor,
    error::GradeError,
    types::TestCase,
    validate::validate,
    value::{Map, Value},
};

/// Where a grading run is. A failed run stops at the stage its error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Retrieving test cases.
    Fetching,
    /// Running the solution on the test case at `index`.
    Running {
        /// Zero-based test case position.
        index: usize,
    },
    /// Encoding and sending the results.
    Submitting,
    /// Reading the service's reply.
    AwaitingScore,
    /// The score is in.
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetching => f.write_str("fetching"),
            Stage::Running { index } => write!(f, "running test case {index}"),
            Stage::Submitting => f.write_str("submitting"),
            Stage::AwaitingScore => f.write_str("awaiting score"),
            Stage::Done => f.write_str("done"),
        }
    }
}

/// Something that can be called with a test case's arguments.
pub trait Solution {
    /// Computes the result for one test case.
    fn call(&self, args: &[Value], kwargs: &Map<String, Value>) -> Result<Value>;
}

impl<F> Solution for F
where
    F: Fn(&[Value], &Map<String, Value>) -> Value,
{
    fn call(&self, args: &[Value], kwargs: &Map<String, Value>) -> Result<Value> {
        Ok(self(args, kwargs))
    }
}

/// A solution wrapping a closure that can fail.
pub struct Fallible<F>(F);

impl<F> Solution for Fallible<F>
where
    F: Fn(&[Value], &Map<String, Value>) -> Result<Value>,
{
    fn call(&self, args: &[Value], kwargs: &Map<String, Value>) -> Result<Value> {
        (self.0)(args, kwargs)
    }
}

/// Adapts a closure returning `Result` into a [`Solution`].
pub fn fallible<F>(f: F) -> Fallible<F>
where
    F: Fn(&[Value], &Map<String, Value>) -> Result<Value>,
{
    Fallible(f)
}

/// The outcome of a run that reached the grading service.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeReport {
    /// The graded question.
    pub question:  String,
    /// Number of results submitted.
    pub submitted: usize,
    /// Status of the service's reply.
    pub status:    u16,
    /// The decoded verdict.
    pub score:     Score,
}

impl GradeReport {
    /// Whether the service accepted the submission.
    pub fn accepted(&self) -> bool {
        self.status == 200
    }
}

/// Runs solutions against the test cases of a [`ScoringBackend`].
pub struct GradingClient<B> {
    /// Where test cases come from and submissions go.
    backend: B,
}

impl<B: ScoringBackend> GradingClient<B> {
    /// Creates a client over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Grades `solution` on `question` from start to finish.
    ///
    /// The first result with the wrong shape ends the run before anything is
    /// submitted.
    pub fn grade_question<S>(&self, question: &str, solution: &S) -> Result<GradeReport, GradeError>
    where
        S: Solution + ?Sized,
    {
        debug!(stage = %Stage::Fetching, question);
        let cases = self.backend.fetch_test_cases(question)?;

        let results = self.run_test_cases(question, &cases, solution)?;

        debug!(stage = %Stage::Submitting, question);
        let encoded = codec::encode(question, &results).map_err(GradeError::Encode)?;
        let reply = self.backend.submit(&encoded)?;

        debug!(stage = %Stage::AwaitingScore, status = reply.status);
        let score = codec::decode(&reply.body).map_err(|source| GradeError::Decode {
            status: reply.status,
            body: reply.body.clone(),
            source,
        })?;

        debug!(stage = %Stage::Done, score = ?score.score);
        Ok(GradeReport {
            question: question.to_string(),
            submitted: results.len(),
            status: reply.status,
            score,
        })
    }

    /// Runs `solution` on every test case in order and checks each result,
    /// stopping at the first failure.
    pub fn run_test_cases<S>(
        &self,
        question: &str,
        cases: &[TestCase],
        solution: &S,
    ) -> Result<Vec<Value>, GradeError>
    where
        S: Solution + ?Sized,
    {
        let mut results = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            let stage = Stage::Running { index };
            debug!(stage = %stage, total = cases.len());

            let descriptor = TypeDescriptor::parse(&case.type_str)
                .map_err(|source| GradeError::Descriptor { index, source })?;

            let result = solution
                .call(&case.args, &case.kwargs)
                .map_err(|source| GradeError::Solution { index, source })?;

            validate(&result, &descriptor).map_err(|mismatch| GradeError::ResultShape {
                question: question.to_string(),
                index,
                mismatch,
            })?;
            results.push(result);
        }
        info!(question, count = results.len(), "all results have the expected shape");
        Ok(results)
    }
}
