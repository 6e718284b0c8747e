#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Type descriptors: the declarative shapes a test case expects its result to
//! have.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use peg::{error::ParseError, str::LineCol};

use crate::{parsers::parser, value::Kind};

/// A scalar kind named by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `int` (alias `long`)
    Int,
    /// `float`
    Float,
    /// `str` (aliases `string`, `unicode`)
    Str,
    /// `bool`
    Bool,
    /// `NoneType` (alias `None`)
    NoneType,
}

impl Primitive {
    /// The value kind this primitive accepts.
    pub fn kind(self) -> Kind {
        match self {
            Primitive::Int => Kind::Int,
            Primitive::Float => Kind::Float,
            Primitive::Str => Kind::Str,
            Primitive::Bool => Kind::Bool,
            Primitive::NoneType => Kind::Null,
        }
    }
}

/// A parsed type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Matches exactly one scalar kind.
    Primitive(Primitive),
    /// `list(T)`: a sequence of any length whose elements all match `T`.
    List(Box<TypeDescriptor>),
    /// `tuple(T1,...,Tn)`: a sequence of exactly `n` elements.
    Tuple(Vec<TypeDescriptor>),
    /// `dict(K,V)`: a mapping whose keys match `K` and values match `V`.
    Dict(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// `union(T1,...,Tn)`: matches if any alternative matches.
    Union(Vec<TypeDescriptor>),
    /// Matches anything.
    Any,
}

impl TypeDescriptor {
    /// Parses descriptor text.
    pub fn parse(text: &str) -> Result<Self, DescriptorError> {
        parser::type_descriptor(text).map_err(|source| DescriptorError {
            text: text.to_string(),
            source,
        })
    }
}

impl FromStr for TypeDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Primitive(p) => f.write_str(p.kind().name()),
            TypeDescriptor::List(t) => write!(f, "list({t})"),
            TypeDescriptor::Tuple(items) => write!(f, "tuple({})", items.iter().join(",")),
            TypeDescriptor::Dict(k, v) => write!(f, "dict({k},{v})"),
            TypeDescriptor::Union(alts) => write!(f, "union({})", alts.iter().join(",")),
            TypeDescriptor::Any => f.write_str("*"),
        }
    }
}

/// Descriptor text that does not follow the descriptor grammar.
///
/// This points at the test data, not at the solution being graded.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("malformed type descriptor `{text}`: {source}")]
pub struct DescriptorError {
    /// The offending text.
    pub text:   String,
    /// Where and why parsing stopped.
    pub source: ParseError<LineCol>,
}
