//! Tests for checking result values against type descriptors.

use grader::{
    descriptor::TypeDescriptor,
    validate,
    validate::{Mismatch, PathSegment, Reason, ValidationError},
    validate_str,
    value::Kind,
};
use serde_json::{Value, json};

fn mismatch(value: Value, descriptor: &str) -> Mismatch {
    let descriptor = TypeDescriptor::parse(descriptor).expect("descriptor parses");
    validate(&value, &descriptor).expect_err("value should not match")
}

fn accepts(value: Value, descriptor: &str) -> bool {
    validate_str(&value, descriptor).is_ok()
}

#[test]
fn matching_values_pass() {
    assert!(accepts(json!(5), "int"));
    assert!(accepts(json!(5.5), "float"));
    assert!(accepts(json!("x"), "str"));
    assert!(accepts(json!(false), "bool"));
    assert!(accepts(json!(null), "NoneType"));
    assert!(accepts(json!([1, 2, 3]), "list(int)"));
    assert!(accepts(json!([1, "a"]), "tuple(int,str)"));
    assert!(accepts(json!({"a": 1, "b": 2}), "dict(str,int)"));
    assert!(accepts(json!([[1, {"k": [true]}]]), "list(tuple(int,dict(str,list(bool))))"));
}

#[test]
fn empty_containers_match_any_element_type() {
    assert!(accepts(json!([]), "list(int)"));
    assert!(accepts(json!([]), "list(dict(str,float))"));
    assert!(accepts(json!({}), "dict(str,int)"));
    assert!(accepts(json!([]), "tuple()"));
}

#[test]
fn numeric_kinds_are_not_coerced() {
    assert!(!accepts(json!(5.0), "int"));
    assert!(!accepts(json!(5), "float"));
    assert!(!accepts(json!(true), "int"));
    assert!(!accepts(json!(1), "bool"));
}

#[test]
fn wrong_outer_kind_names_the_container() {
    let err = mismatch(json!("hello"), "list(int)");
    assert!(err.path.is_empty());
    assert_eq!(err.found, Kind::Str);
    assert_eq!(err.to_string(), r#"result: expected list(int), found str "hello""#);
}

#[test]
fn tuple_arity_is_checked_before_elements() {
    let err = mismatch(json!([1, "a", 2]), "tuple(int,str)");
    assert_eq!(
        err.reason,
        Reason::Arity {
            expected: 2,
            found:    3,
        }
    );
    assert!(err.path.is_empty());

    let err = mismatch(json!(["not", "ints", "at all"]), "tuple(int,str)");
    assert!(matches!(err.reason, Reason::Arity { .. }));
    assert_eq!(
        err.to_string(),
        "result: expected tuple(int,str) of length 2, found list of length 3"
    );
}

#[test]
fn dict_diagnostic_points_at_the_value() {
    let err = mismatch(json!({"a": "x"}), "dict(str,int)");
    assert_eq!(err.path, vec![PathSegment::Value("a".into())]);
    assert_eq!(err.value, r#""x""#);
    assert_eq!(err.to_string(), r#"result["a"]: expected int, found str "x""#);
}

#[test]
fn innermost_failure_is_reported() {
    let err = mismatch(json!([[1, 2], [3, 4.5]]), "list(list(int))");
    assert_eq!(err.path, vec![PathSegment::Index(1), PathSegment::Index(1)]);
    assert_eq!(err.expected.to_string(), "int");
    assert_eq!(err.found, Kind::Float);
    assert_eq!(err.location(), "result[1][1]");
}

#[test]
fn first_failing_element_wins() {
    let err = mismatch(json!([1, "a", null]), "list(int)");
    assert_eq!(err.path, vec![PathSegment::Index(1)]);
}

#[test]
fn unions_match_any_alternative() {
    assert!(accepts(json!("hello"), "union(int,str)"));
    assert!(accepts(json!(3), "union(int,str)"));
    assert!(accepts(json!(null), "union(NoneType,list(int))"));

    let err = mismatch(json!(3.5), "union(int,str)");
    assert_eq!(err.expected.to_string(), "union(int,str)");
    assert_eq!(err.found, Kind::Float);
}

#[test]
fn failed_union_reports_through_the_alternative_of_matching_kind() {
    let err = mismatch(json!([1, "a"]), "union(list(int))");
    assert_eq!(err.path, vec![PathSegment::Index(1)]);
    assert_eq!(err.to_string(), r#"result[1]: expected int, found str "a""#);

    let err = mismatch(json!({"a": [1], "b": [1.5]}), "dict(str,union(NoneType,list(int)))");
    assert_eq!(
        err.path,
        vec![PathSegment::Value("b".into()), PathSegment::Index(0)]
    );
    assert_eq!(err.expected.to_string(), "int");
    assert_eq!(err.found, Kind::Float);
}

#[test]
fn ambiguous_union_failure_names_the_union() {
    let err = mismatch(json!([1.5]), "union(list(int),tuple(str))");
    assert!(err.path.is_empty());
    assert_eq!(err.expected.to_string(), "union(list(int),tuple(str))");
}

#[test]
fn integer_keys_are_read_from_their_text() {
    assert!(accepts(json!({"1987": 3, "1990": 1}), "dict(int,int)"));
    assert!(accepts(json!({"true": 1}), "dict(bool,int)"));
    assert!(accepts(json!({"1987": 3}), "dict(str,int)"));
    assert!(accepts(json!({"1987": 3, "x": 1}), "dict(union(int,str),int)"));

    let err = mismatch(json!({"x": 3}), "dict(int,int)");
    assert_eq!(err.path, vec![PathSegment::Key("x".into())]);
    assert_eq!(err.to_string(), r#"result (key "x"): expected int, found str "x""#);

    let err = mismatch(json!({"1.5": 3}), "dict(int,int)");
    assert_eq!(err.location(), r#"result (key "1.5")"#);
}

#[test]
fn wildcard_accepts_everything() {
    for value in [json!(null), json!(1), json!(1.5), json!("s"), json!([1]), json!({"k": 1})] {
        assert!(accepts(value.clone(), "*"), "{value}");
        assert!(accepts(json!([value]), "list(any)"));
    }
}

#[test]
fn malformed_descriptor_is_not_a_mismatch() {
    match validate_str(&json!(1), "list(") {
        Err(ValidationError::Descriptor(e)) => assert_eq!(e.text, "list("),
        other => panic!("expected a descriptor error, got {other:?}"),
    }
    assert!(matches!(
        validate_str(&json!("1"), "int"),
        Err(ValidationError::Mismatch(_))
    ));
}
