#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Errors that end a grading run.

use crate::{client::Stage, codec::CodecError, descriptor::DescriptorError, validate::Mismatch};

/// Every way a grading run can fail. All of them are terminal for the run.
#[derive(thiserror::Error, Debug)]
pub enum GradeError {
    /// The service has no test cases for the question.
    #[error("No question found: {question}")]
    QuestionNotFound {
        /// The requested question.
        question: String,
        /// Status the service answered with.
        status:   u16,
    },
    /// The test cases could not be read from the service's response.
    #[error("The test cases for `{question}` could not be read: {source}")]
    TestCases {
        /// The requested question.
        question: String,
        /// Why the body did not parse.
        source:   serde_json::Error,
    },
    /// A test case carries a descriptor that does not parse.
    #[error("Test case {index} has a broken type descriptor. {source}")]
    Descriptor {
        /// Zero-based position of the test case.
        index:  usize,
        /// The parse failure.
        source: DescriptorError,
    },
    /// The solution failed while running a test case.
    #[error("Your solution failed on test case {index}: {source:#}")]
    Solution {
        /// Zero-based position of the test case.
        index:  usize,
        /// The solution's error.
        source: anyhow::Error,
    },
    /// The solution returned a value of the wrong shape.
    #[error("Test case {index} of `{question}` returned an invalid result: {mismatch}")]
    ResultShape {
        /// The question being graded.
        question: String,
        /// Zero-based position of the test case.
        index:    usize,
        /// Where and how the result differs from the expected shape.
        mismatch: Mismatch,
    },
    /// The submission could not be serialized.
    #[error("The submission could not be encoded: {0}")]
    Encode(#[source] CodecError),
    /// The service's reply could not be read as a score.
    #[error("The grading service sent a response that could not be read (status {status}): {source}")]
    Decode {
        /// Status of the reply.
        status: u16,
        /// Raw reply body.
        body:   String,
        /// The decode failure.
        source: CodecError,
    },
    /// The request never got a response.
    #[error("Could not reach the grading service at {url}: {message}")]
    Transport {
        /// Stage that issued the request.
        stage:   Stage,
        /// Endpoint that was being contacted, without credentials.
        url:     String,
        /// What went wrong.
        message: String,
    },
}

impl GradeError {
    /// Builds a transport error from a failed request.
    pub fn transport(stage: Stage, url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            stage,
            url: url.into(),
            message: err.to_string(),
        }
    }

    /// Whether the failure lies with the solution rather than with setup or
    /// the grading infrastructure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Solution { .. } | Self::ResultShape { .. })
    }

    /// The stage of the run that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::QuestionNotFound { .. } | Self::TestCases { .. } => Stage::Fetching,
            Self::Descriptor { index, .. }
            | Self::Solution { index, .. }
            | Self::ResultShape { index, .. } => Stage::Running { index: *index },
            Self::Encode(_) => Stage::Submitting,
            Self::Decode { .. } => Stage::AwaitingScore,
            Self::Transport { stage, .. } => *stage,
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::QuestionNotFound { .. } => 2,
            Self::Solution { .. } | Self::ResultShape { .. } => 3,
            Self::TestCases { .. }
            | Self::Descriptor { .. }
            | Self::Encode(_)
            | Self::Decode { .. } => 4,
            Self::Transport { .. } => 5,
        }
    }
}
