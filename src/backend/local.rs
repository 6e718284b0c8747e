#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ScoringBackend;
use crate::{
    client::Stage,
    codec::{Score, Submission},
    error::GradeError,
    types::{Reply, TestCase},
    value::{Value, preview},
};

/// Floats closer than this, relative to their magnitude, count as equal.
const FLOAT_TOLERANCE: f64 = 1e-6;

/// The contents of one local question file, `<dir>/<question>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalQuestion {
    /// Test cases handed to the solution.
    pub test_cases: Vec<TestCase>,
    /// Reference results, one per test case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers:    Option<Vec<Value>>,
}

/// Scores submissions in-process against reference answers kept on disk.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Directory holding the question files.
    dir: PathBuf,
}

impl LocalBackend {
    /// Creates a backend reading question files from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the question file directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the question file for `question`.
    pub fn load(&self, question: &str) -> Result<LocalQuestion, GradeError> {
        let not_found = || GradeError::QuestionNotFound {
            question: question.to_string(),
            status:   404,
        };
        if question.is_empty() || question.contains(['/', '\\']) || question.starts_with('.') {
            return Err(not_found());
        }

        let path = self.dir.join(format!("{question}.json"));
        debug!(path = %path.display(), "reading local question");
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(GradeError::transport(Stage::Fetching, path.display().to_string(), e));
            }
        };

        serde_json::from_str(&text).map_err(|source| GradeError::TestCases {
            question: question.to_string(),
            source,
        })
    }
}

impl ScoringBackend for LocalBackend {
    fn fetch_test_cases(&self, question: &str) -> Result<Vec<TestCase>, GradeError> {
        let cases = self.load(question)?.test_cases;
        info!(question, count = cases.len(), "loaded local test cases");
        Ok(cases)
    }

    fn submit(&self, submission: &str) -> Result<Reply, GradeError> {
        let (status, score) = match Submission::decode(submission) {
            Ok(submission) => match self.load(&submission.question_name) {
                Ok(question) => score_locally(&submission, &question),
                Err(GradeError::QuestionNotFound { question, status }) => {
                    (status, unscored(format!("No question found: {question}")))
                }
                Err(e) => return Err(e),
            },
            Err(e) => (400, unscored(format!("Could not read the submission: {e}"))),
        };

        let body = score.encode().map_err(GradeError::Encode)?;
        Ok(Reply { status, body })
    }
}

/// A score-less reply carrying only a message.
fn unscored(message: String) -> Score {
    Score {
        score:     None,
        error_msg: Some(message),
    }
}

/// Compares submitted results with the reference answers.
fn score_locally(submission: &Submission, question: &LocalQuestion) -> (u16, Score) {
    let Some(answers) = &question.answers else {
        return (
            200,
            unscored(format!(
                "No reference answers are available locally for `{}`; results were only \
                 checked for shape.",
                submission.question_name
            )),
        );
    };

    let results = &submission.submission;
    if results.len() != answers.len() {
        return (
            400,
            unscored(format!(
                "Expected {} results, received {}.",
                answers.len(),
                results.len()
            )),
        );
    }

    let wrong: Vec<usize> = answers
        .iter()
        .zip(results)
        .enumerate()
        .filter(|(_, (expected, actual))| !values_match(expected, actual))
        .map(|(i, _)| i)
        .collect();

    let total = answers.len();
    let score = if total == 0 {
        1.0
    } else {
        (total - wrong.len()) as f64 / total as f64
    };

    let error_msg = wrong.first().map(|&i| {
        let mut msg = format!(
            "Test case {i}: expected {}, got {}.",
            preview(&answers[i]),
            preview(&results[i])
        );
        if wrong.len() > 1 {
            msg.push_str(&format!(" ({} more incorrect)", wrong.len() - 1));
        }
        msg
    });

    (
        200,
        Score {
            score: Some(score),
            error_msg,
        },
    )
}

/// Structural equality, with numbers compared within [`FLOAT_TOLERANCE`] when
/// either side is a float.
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(e), Value::Number(a)) if e.is_f64() || a.is_f64() => {
            match (e.as_f64(), a.as_f64()) {
                (Some(e), Some(a)) => floats_close(e, a),
                _ => false,
            }
        }
        (Value::Array(e), Value::Array(a)) => {
            e.len() == a.len() && e.iter().zip(a).all(|(e, a)| values_match(e, a))
        }
        (Value::Object(e), Value::Object(a)) => {
            e.len() == a.len()
                && e.iter()
                    .all(|(k, e)| a.get(k).is_some_and(|a| values_match(e, a)))
        }
        _ => expected == actual,
    }
}

/// Relative comparison that degrades to absolute for magnitudes below one.
fn floats_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
