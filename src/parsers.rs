#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::descriptor::{Primitive, TypeDescriptor};

/// Maps a bare name to the descriptor it stands for, if any.
fn named(name: &str) -> Option<TypeDescriptor> {
    let primitive = match name {
        "int" | "long" => Primitive::Int,
        "float" => Primitive::Float,
        "str" | "string" | "unicode" => Primitive::Str,
        "bool" => Primitive::Bool,
        "NoneType" | "None" => Primitive::NoneType,
        "any" | "Any" | "object" => return Some(TypeDescriptor::Any),
        _ => return None,
    };
    Some(TypeDescriptor::Primitive(primitive))
}

peg::parser! {
    /// grammar for the type descriptors attached to test cases, eg.
    /// `list(tuple(int,str))` or `union(dict(str,float),NoneType)`.
    pub grammar parser() for str {
        /// matches any number of whitespace characters
        rule whitespace() = quiet!{[' ' | '\n' | '\t' | '\r']*}

        /// matches a bare identifier
        rule ident() -> &'input str
            = $(['a'..='z' | 'A'..='Z' | '_'] ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']*)

        /// matches a primitive name or a named wildcard
        rule name() -> TypeDescriptor
            = n:ident() {? named(n).ok_or("a type name") }

        /// matches the `*` wildcard
        rule star() -> TypeDescriptor
            = "*" { TypeDescriptor::Any }

        /// matches `list(T)`
        rule list() -> TypeDescriptor
            = "list" whitespace() "(" t:descriptor() ")"
            { TypeDescriptor::List(Box::new(t)) }

        /// matches `tuple(T1,...,Tn)`, including the empty tuple
        rule tuple() -> TypeDescriptor
            = "tuple" whitespace() "(" whitespace() items:(descriptor() ** ",") ")"
            { TypeDescriptor::Tuple(items) }

        /// matches `dict(K,V)`
        rule dict() -> TypeDescriptor
            = "dict" whitespace() "(" k:descriptor() "," v:descriptor() ")"
            { TypeDescriptor::Dict(Box::new(k), Box::new(v)) }

        /// matches `union(T1,...,Tn)` with at least one alternative
        rule union() -> TypeDescriptor
            = "union" whitespace() "(" alts:(descriptor() ++ ",") ")"
            { TypeDescriptor::Union(alts) }

        /// matches any descriptor, with surrounding whitespace
        rule descriptor() -> TypeDescriptor
            = whitespace()
              d:(list() / tuple() / dict() / union() / star() / name())
              whitespace()
            { d }

        /// parses a complete descriptor; trailing input is an error
        pub rule type_descriptor() -> TypeDescriptor
            = d:descriptor() { d }
    }
}
