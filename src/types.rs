#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Records exchanged with a scoring backend: test cases in, raw replies out.

use serde::{Deserialize, Serialize};

use crate::value::{Map, Value};

/// One set of arguments to call a solution with, and the shape its result
/// must have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Positional arguments.
    #[serde(default)]
    pub args:     Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs:   Map<String, Value>,
    /// Type descriptor text for the expected result.
    pub type_str: String,
}

impl TestCase {
    /// Creates a test case with positional arguments only.
    pub fn new(args: Vec<Value>, type_str: impl Into<String>) -> Self {
        Self {
            args,
            kwargs: Map::new(),
            type_str: type_str.into(),
        }
    }

    /// Adds a keyword argument.
    pub fn with_kwarg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.kwargs.insert(name.into(), value);
        self
    }
}

/// A raw response from the grading service to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code, or its local equivalent.
    pub status: u16,
    /// Response body.
    pub body:   String,
}

impl Reply {
    /// Whether the service accepted the submission.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
