//! Tests for grading against question files on disk.

use std::{fs, path::PathBuf};

use grader::{
    GradeError, GradingClient, LocalBackend, Map, ScoringBackend, Value,
    codec::{self, Submission},
};
use serde_json::json;
use uuid::Uuid;

/// A uniquely named directory removed when dropped.
struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("grader-cases-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        Self(dir)
    }

    fn write(&self, question: &str, contents: Value) {
        fs::write(self.0.join(format!("{question}.json")), contents.to_string())
            .expect("write question file");
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn add(args: &[Value], _: &Map<String, Value>) -> Value {
    json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))
}

fn add_question() -> Value {
    json!({
        "test_cases": [
            {"args": [2, 3], "kwargs": {}, "type_str": "int"},
            {"args": [10, -4], "type_str": "int"}
        ],
        "answers": [5, 6]
    })
}

#[test]
fn reads_test_cases_from_disk() {
    let dir = TempDir::new();
    dir.write("add", add_question());

    let cases = LocalBackend::new(&dir.0).fetch_test_cases("add").expect("fetch");

    assert_eq!(cases.len(), 2);
    assert_eq!(cases[1].args, vec![json!(10), json!(-4)]);
}

#[test]
fn missing_or_unsafe_names_are_not_found() {
    let dir = TempDir::new();
    let backend = LocalBackend::new(&dir.0);

    for name in ["absent", "", "../add", "a/b", ".hidden"] {
        let err = backend.fetch_test_cases(name).expect_err(name);
        assert!(
            matches!(err, GradeError::QuestionNotFound { status: 404, .. }),
            "{name}: {err:?}"
        );
    }
}

#[test]
fn broken_question_file_is_reported() {
    let dir = TempDir::new();
    fs::write(dir.0.join("bad.json"), "{ not json").expect("write");

    let err = LocalBackend::new(&dir.0)
        .fetch_test_cases("bad")
        .expect_err("unreadable file");

    assert!(matches!(err, GradeError::TestCases { .. }));
}

#[test]
fn correct_answers_score_full_marks() {
    let dir = TempDir::new();
    dir.write("add", add_question());
    let client = GradingClient::new(LocalBackend::new(&dir.0));

    let report = client.grade_question("add", &add).expect("grading succeeds");

    assert!(report.accepted());
    assert_eq!(report.submitted, 2);
    assert_eq!(report.score.score, Some(1.0));
    assert_eq!(report.score.error_msg, None);
}

#[test]
fn wrong_answers_get_partial_credit() {
    let dir = TempDir::new();
    dir.write("add", add_question());
    let backend = LocalBackend::new(&dir.0);

    let wire = codec::encode("add", &[json!(5), json!(14)]).expect("encode");
    let reply = backend.submit(&wire).expect("submit");
    let score = codec::decode(&reply.body).expect("decode");

    assert_eq!(reply.status, 200);
    assert_eq!(score.score, Some(0.5));
    assert_eq!(score.error_msg.as_deref(), Some("Test case 1: expected 6, got 14."));
}

#[test]
fn float_answers_compare_with_tolerance() {
    let dir = TempDir::new();
    dir.write(
        "mean",
        json!({
            "test_cases": [{"args": [[0.1, 0.2]], "type_str": "float"}],
            "answers": [0.15]
        }),
    );
    let client = GradingClient::new(LocalBackend::new(&dir.0));
    let mean = |args: &[Value], _: &Map<String, Value>| {
        let xs: Vec<f64> = args[0]
            .as_array()
            .map(|xs| xs.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();
        json!(xs.iter().sum::<f64>() / xs.len() as f64)
    };

    let report = client.grade_question("mean", &mean).expect("grading succeeds");

    assert_eq!(report.score.score, Some(1.0));
}

#[test]
fn wrong_result_count_is_rejected() {
    let dir = TempDir::new();
    dir.write("add", add_question());
    let backend = LocalBackend::new(&dir.0);

    let wire = Submission::new("add", vec![json!(5)]).encode().expect("encode");
    let reply = backend.submit(&wire).expect("submit");
    let score = codec::decode(&reply.body).expect("decode");

    assert_eq!(reply.status, 400);
    assert_eq!(score.score, None);
    assert_eq!(score.error_msg.as_deref(), Some("Expected 2 results, received 1."));
}

#[test]
fn questions_without_answers_are_only_shape_checked() {
    let dir = TempDir::new();
    dir.write(
        "open",
        json!({"test_cases": [{"args": [1, 1], "type_str": "int"}]}),
    );
    let client = GradingClient::new(LocalBackend::new(&dir.0));

    let report = client.grade_question("open", &add).expect("grading succeeds");

    assert!(report.accepted());
    assert_eq!(report.score.score, None);
    assert!(report.score.error_msg.is_some_and(|m| m.contains("only checked for shape")));
}

#[test]
fn garbage_submissions_get_a_400() {
    let dir = TempDir::new();
    let backend = LocalBackend::new(&dir.0);

    let reply = backend.submit("[1, 2, 3]").expect("submit");

    assert_eq!(reply.status, 400);
    let score = codec::decode(&reply.body).expect("decode");
    assert!(score.error_msg.is_some());
}

#[test]
fn submissions_for_unknown_questions_get_a_404() {
    let dir = TempDir::new();
    let backend = LocalBackend::new(&dir.0);

    let wire = codec::encode("ghost", &[json!(1)]).expect("encode");
    let reply = backend.submit(&wire).expect("submit");

    assert_eq!(reply.status, 404);
    let score = codec::decode(&reply.body).expect("decode");
    assert_eq!(score.error_msg.as_deref(), Some("No question found: ghost"));
}
