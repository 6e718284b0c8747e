#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Wire formats for submissions sent to, and scores received from, the
//! grading service.
//!
//! Both are JSON. Mapping keys are emitted in sorted order so that encoding is
//! deterministic, and numbers keep their integer/float distinction across a
//! round trip.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::value::{Kind, Value};

/// Errors raised while encoding or decoding wire data.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The input is not well-formed wire data for the expected record.
    #[error("malformed wire data: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The input is valid JSON, but not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(Kind),
}

/// Parses `wire` as a JSON object and deserializes it into `T`.
fn record<T: DeserializeOwned>(wire: &str) -> Result<T, CodecError> {
    let value: Value = serde_json::from_str(wire)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject(Kind::of(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

/// All results produced for one question, in test-case order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Submission {
    /// Name of the question being answered.
    pub question_name: String,
    /// One result per test case.
    pub submission:    Vec<Value>,
}

impl Submission {
    /// Bundles the results for `question_name`.
    pub fn new(question_name: impl Into<String>, submission: Vec<Value>) -> Self {
        Self {
            question_name: question_name.into(),
            submission,
        }
    }

    /// Serializes the submission for transmission.
    pub fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a submission produced by [`Submission::encode`].
    pub fn decode(wire: &str) -> Result<Self, CodecError> {
        record(wire)
    }
}

/// The grading service's verdict on a submission.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Score {
    /// Numeric score, absent when the service could not grade.
    #[serde(default)]
    pub score:     Option<f64>,
    /// Message accompanying the score, if any.
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl Score {
    /// Serializes the score the way the grading service sends it.
    pub fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encodes the results for `question_name` into a submission string.
pub fn encode(question_name: &str, results: &[Value]) -> Result<String, CodecError> {
    Submission::new(question_name, results.to_vec()).encode()
}

/// Decodes a score response.
pub fn decode(wire: &str) -> Result<Score, CodecError> {
    record(wire)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encoding_sorts_keys() {
        let wire = encode("q", &[json!({"b": 1, "a": 2.0})]).unwrap();
        assert_eq!(wire, r#"{"question_name":"q","submission":[{"a":2.0,"b":1}]}"#);
    }

    #[test]
    fn missing_score_fields_are_null() {
        assert_eq!(decode("{}").unwrap(), Score::default());
    }

    #[test]
    fn arrays_are_not_scores() {
        assert!(matches!(decode("[]"), Err(CodecError::NotAnObject(Kind::List))));
    }
}
