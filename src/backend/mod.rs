#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Scoring backends: where test cases come from and where submissions go.

/// In-process scoring against local test case files.
pub mod local;
/// The remote grading service over HTTP.
pub mod remote;

pub use local::{LocalBackend, LocalQuestion};
pub use remote::RemoteBackend;

use crate::{
    config::{ClientConfig, Mode},
    error::GradeError,
    types::{Reply, TestCase},
};

/// The two operations a grading run needs from a scoring service.
pub trait ScoringBackend {
    /// Returns the test cases for `question`, in order.
    fn fetch_test_cases(&self, question: &str) -> Result<Vec<TestCase>, GradeError>;

    /// Submits an encoded submission and returns the raw reply.
    fn submit(&self, submission: &str) -> Result<Reply, GradeError>;
}

impl<T: ScoringBackend + ?Sized> ScoringBackend for &T {
    fn fetch_test_cases(&self, question: &str) -> Result<Vec<TestCase>, GradeError> {
        (**self).fetch_test_cases(question)
    }

    fn submit(&self, submission: &str) -> Result<Reply, GradeError> {
        (**self).submit(submission)
    }
}

impl<T: ScoringBackend + ?Sized> ScoringBackend for Box<T> {
    fn fetch_test_cases(&self, question: &str) -> Result<Vec<TestCase>, GradeError> {
        (**self).fetch_test_cases(question)
    }

    fn submit(&self, submission: &str) -> Result<Reply, GradeError> {
        (**self).submit(submission)
    }
}

/// Builds the backend `config` selects.
pub fn from_config(config: &ClientConfig) -> Result<Box<dyn ScoringBackend>, GradeError> {
    Ok(match config.mode() {
        Mode::Remote => Box::new(RemoteBackend::new(config)?),
        Mode::Local => Box::new(LocalBackend::new(config.local_dir())),
    })
}
