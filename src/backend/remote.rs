#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use reqwest::{StatusCode, blocking::Client};
use tracing::{debug, info, warn};
use url::Url;

use super::ScoringBackend;
use crate::{
    client::Stage,
    config::ClientConfig,
    error::GradeError,
    types::{Reply, TestCase},
};

/// Talks to the grading service over HTTP.
///
/// Every request carries the API key as an `api_key` query parameter. Routes
/// are resolved against the base URL the way a browser resolves a relative
/// link, so a base of `https://host/app` sends requests to `https://host/...`
/// while `https://host/app/` keeps the `app` segment.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    /// Blocking HTTP client.
    client:   Client,
    /// Base URL routes are resolved against.
    base_url: Url,
    /// Opaque key sent with every request.
    api_key:  String,
}

impl RemoteBackend {
    /// Creates a backend for the service `config` points at.
    pub fn new(config: &ClientConfig) -> Result<Self, GradeError> {
        let client = Client::builder()
            .user_agent(concat!("grader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GradeError::transport(Stage::Fetching, config.base_url().as_str(), e))?;
        Ok(Self::with_client(client, config.base_url().clone(), config.api_key()))
    }

    /// Creates a backend around an existing client.
    pub fn with_client(client: Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Returns the base URL routes are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `route` against the base URL, appends `segment` as a single
    /// escaped path segment, and attaches the API key.
    pub fn endpoint(
        &self,
        stage: Stage,
        route: &str,
        segment: Option<&str>,
    ) -> Result<Url, GradeError> {
        let mut url = self
            .base_url
            .join(route)
            .map_err(|e| GradeError::transport(stage, self.base_url.as_str(), e))?;
        if let Some(segment) = segment {
            let mut segments = url.path_segments_mut().map_err(|()| {
                GradeError::transport(stage, self.base_url.as_str(), "base URL cannot hold a path")
            })?;
            segments.pop_if_empty().push(segment);
        }
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

/// Renders `url` without its query string, so the API key stays out of logs
/// and error messages.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

impl ScoringBackend for RemoteBackend {
    fn fetch_test_cases(&self, question: &str) -> Result<Vec<TestCase>, GradeError> {
        let url = self.endpoint(Stage::Fetching, "test_cases/", Some(question))?;
        let shown = redacted(&url);
        debug!(url = %shown, "fetching test cases");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| GradeError::transport(Stage::Fetching, &shown, e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "no test cases for question");
            return Err(GradeError::QuestionNotFound {
                question: question.to_string(),
                status:   status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| GradeError::transport(Stage::Fetching, &shown, e.without_url()))?;
        let cases: Vec<TestCase> =
            serde_json::from_str(&body).map_err(|source| GradeError::TestCases {
                question: question.to_string(),
                source,
            })?;

        info!(question, count = cases.len(), "fetched test cases");
        Ok(cases)
    }

    fn submit(&self, submission: &str) -> Result<Reply, GradeError> {
        let url = self.endpoint(Stage::Submitting, "submission", None)?;
        let shown = redacted(&url);
        debug!(url = %shown, bytes = submission.len(), "submitting results");

        let response = self
            .client
            .post(url)
            .form(&[("submission", submission)])
            .send()
            .map_err(|e| GradeError::transport(Stage::Submitting, &shown, e.without_url()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| GradeError::transport(Stage::AwaitingScore, &shown, e.without_url()))?;

        if status != StatusCode::OK.as_u16() {
            warn!(status, "grading service did not accept the submission");
        }
        Ok(Reply { status, body })
    }
}
