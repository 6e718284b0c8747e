#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runtime values exchanged with the grading service and their kinds.

use std::fmt::Display;

pub use serde_json::{Map, Value};

/// Longest rendering of a value that is quoted verbatim in a diagnostic.
const PREVIEW_LIMIT: usize = 60;

/// The runtime kind of a [`Value`].
///
/// Integer and floating-point numbers are separate kinds, and a boolean is
/// never an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// A number stored without a fractional part.
    Int,
    /// A number stored as a 64-bit float.
    Float,
    /// A string.
    Str,
    /// An ordered sequence.
    List,
    /// A string-keyed mapping.
    Dict,
}

impl Kind {
    /// Classifies a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) if n.is_f64() => Kind::Float,
            Value::Number(_) => Kind::Int,
            Value::String(_) => Kind::Str,
            Value::Array(_) => Kind::List,
            Value::Object(_) => Kind::Dict,
        }
    }

    /// The name graders use for this kind in type descriptors.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "NoneType",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Dict => "dict",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a compact, length-limited preview of a value for diagnostics.
pub fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= PREVIEW_LIMIT {
        return text;
    }
    let mut cut: String = text.chars().take(PREVIEW_LIMIT).collect();
    cut.push_str("...");
    cut
}
