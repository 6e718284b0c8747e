#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Structural shape checking of result values against type descriptors.

use std::fmt::Display;

use crate::{
    descriptor::{DescriptorError, TypeDescriptor},
    value::{Kind, Value, preview},
};

/// One step from the root of a result to a nested element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An element of a sequence.
    Index(usize),
    /// The value stored under a mapping key.
    Value(String),
    /// A mapping key itself.
    Key(String),
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The value is of the wrong kind.
    Kind,
    /// A tuple descriptor met a sequence of the wrong length.
    Arity {
        /// Length the tuple descriptor requires.
        expected: usize,
        /// Length of the sequence.
        found:    usize,
    },
}

/// The innermost place where a value failed to match its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Steps from the root value to the failing element.
    pub path:     Vec<PathSegment>,
    /// Descriptor the failing element was checked against.
    pub expected: TypeDescriptor,
    /// Kind of the failing element.
    pub found:    Kind,
    /// Short rendering of the failing element.
    pub value:    String,
    /// Why it failed.
    pub reason:   Reason,
}

impl Mismatch {
    /// Creates a kind mismatch for `value` at `path`.
    fn kind(path: &[PathSegment], expected: &TypeDescriptor, value: &Value) -> Self {
        Self {
            path:     path.to_vec(),
            expected: expected.clone(),
            found:    Kind::of(value),
            value:    preview(value),
            reason:   Reason::Kind,
        }
    }

    /// Renders the path as an accessor expression rooted at `result`.
    pub fn location(&self) -> String {
        let mut out = String::from("result");
        let mut key = None;
        for segment in &self.path {
            match segment {
                PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
                PathSegment::Value(k) => out.push_str(&format!("[{}]", quoted(k))),
                PathSegment::Key(k) => key = Some(k),
            }
        }
        if let Some(k) = key {
            out.push_str(&format!(" (key {})", quoted(k)));
        }
        out
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Reason::Kind => write!(
                f,
                "{}: expected {}, found {} {}",
                self.location(),
                self.expected,
                self.found,
                self.value
            ),
            Reason::Arity { expected, found } => write!(
                f,
                "{}: expected {} of length {expected}, found {} of length {found}",
                self.location(),
                self.expected,
                self.found
            ),
        }
    }
}

impl std::error::Error for Mismatch {}

/// JSON-quotes a mapping key for display.
fn quoted(key: &str) -> String {
    Value::String(key.to_string()).to_string()
}

/// Either side of a failed check of descriptor text.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The descriptor itself could not be parsed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    /// The value does not have the described shape.
    #[error("invalid result: {0}")]
    Mismatch(#[from] Mismatch),
}

/// Checks that `value` has the shape `descriptor` describes.
pub fn validate(value: &Value, descriptor: &TypeDescriptor) -> Result<(), Mismatch> {
    let mut path = Vec::new();
    check(value, descriptor, &mut path)
}

/// Parses `descriptor` and checks `value` against it.
pub fn validate_str(value: &Value, descriptor: &str) -> Result<(), ValidationError> {
    let descriptor = TypeDescriptor::parse(descriptor)?;
    validate(value, &descriptor)?;
    Ok(())
}

/// Recursive worker for [`validate`]; `path` locates `value` within the root.
fn check(
    value: &Value,
    descriptor: &TypeDescriptor,
    path: &mut Vec<PathSegment>,
) -> Result<(), Mismatch> {
    match descriptor {
        TypeDescriptor::Any => Ok(()),
        TypeDescriptor::Primitive(p) => {
            if Kind::of(value) == p.kind() {
                Ok(())
            } else {
                Err(Mismatch::kind(path, descriptor, value))
            }
        }
        TypeDescriptor::List(inner) => {
            let Value::Array(items) = value else {
                return Err(Mismatch::kind(path, descriptor, value));
            };
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                check(item, inner, path)?;
                path.pop();
            }
            Ok(())
        }
        TypeDescriptor::Tuple(slots) => {
            let Value::Array(items) = value else {
                return Err(Mismatch::kind(path, descriptor, value));
            };
            if items.len() != slots.len() {
                return Err(Mismatch {
                    reason: Reason::Arity {
                        expected: slots.len(),
                        found:    items.len(),
                    },
                    ..Mismatch::kind(path, descriptor, value)
                });
            }
            for (i, (item, slot)) in items.iter().zip(slots).enumerate() {
                path.push(PathSegment::Index(i));
                check(item, slot, path)?;
                path.pop();
            }
            Ok(())
        }
        TypeDescriptor::Dict(key_type, value_type) => {
            let Value::Object(map) = value else {
                return Err(Mismatch::kind(path, descriptor, value));
            };
            for (k, v) in map {
                path.push(PathSegment::Key(k.clone()));
                check_key(k, key_type, path)?;
                path.pop();

                path.push(PathSegment::Value(k.clone()));
                check(v, value_type, path)?;
                path.pop();
            }
            Ok(())
        }
        TypeDescriptor::Union(alternatives) => {
            if alternatives
                .iter()
                .any(|alt| check(value, alt, &mut path.clone()).is_ok())
            {
                return Ok(());
            }
            // Report through the only alternative of the right outer kind.
            let mut candidates = alternatives.iter().filter(|alt| admits_kind(alt, value));
            match (candidates.next(), candidates.next()) {
                (Some(only), None) => check(value, only, path),
                _ => Err(Mismatch::kind(path, descriptor, value)),
            }
        }
    }
}

/// Checks a mapping key. Keys are always strings on the wire, so a key that
/// fails as a string is retried as the scalar its text encodes, e.g. `"1987"`
/// for `int` or `"true"` for `bool`.
fn check_key(
    key: &str,
    key_type: &TypeDescriptor,
    path: &mut Vec<PathSegment>,
) -> Result<(), Mismatch> {
    let as_string = Value::String(key.to_string());
    let Err(mismatch) = check(&as_string, key_type, path) else {
        return Ok(());
    };
    match serde_json::from_str::<Value>(key) {
        Ok(scalar) if !scalar.is_array() && !scalar.is_object() && !scalar.is_string() => {
            check(&scalar, key_type, &mut path.clone()).map_err(|_| mismatch)
        }
        _ => Err(mismatch),
    }
}

/// Whether `descriptor` accepts values of `value`'s outer kind, ignoring
/// anything nested inside it.
fn admits_kind(descriptor: &TypeDescriptor, value: &Value) -> bool {
    match descriptor {
        TypeDescriptor::Any => true,
        TypeDescriptor::Primitive(p) => Kind::of(value) == p.kind(),
        TypeDescriptor::List(_) | TypeDescriptor::Tuple(_) => value.is_array(),
        TypeDescriptor::Dict(..) => value.is_object(),
        TypeDescriptor::Union(alternatives) => {
            alternatives.iter().any(|alt| admits_kind(alt, value))
        }
    }
}
