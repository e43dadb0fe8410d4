//! Scripted evaluator for tests and downstream crates

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::EvaluatorError;
use crate::evaluator::{EvaluationRequest, EvaluationResponses, Evaluator};
use crate::metric::Metric;
use crate::response::JudgeResponse;

/// Scripted response shape for [`MockEvaluator`]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Structured(Value),
    Text(String),
    Deferred(Box<MockResponse>),
    DeferredError(EvaluatorError),
}

impl MockResponse {
    fn to_response(&self) -> JudgeResponse {
        match self {
            MockResponse::Structured(value) => JudgeResponse::Structured(value.clone()),
            MockResponse::Text(text) => JudgeResponse::Text(text.clone()),
            MockResponse::Deferred(inner) => {
                let inner = inner.to_response();
                JudgeResponse::deferred(async move { Ok(inner) })
            }
            MockResponse::DeferredError(err) => {
                let err = err.clone();
                JudgeResponse::deferred(async move { Err(err) })
            }
        }
    }
}

/// What the mock was asked to grade
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub metrics: Vec<Metric>,
    pub query: String,
    pub context: Option<String>,
    pub image: Option<String>,
}

pub struct MockEvaluator {
    name: String,
    default: MockResponse,
    responses: HashMap<Metric, MockResponse>,
    omitted: HashSet<Metric>,
    failing_queries: HashSet<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockEvaluator {
    /// Every metric is graded `grade` unless scripted otherwise
    pub fn new(name: impl Into<String>, grade: i64) -> Self {
        Self {
            name: name.into(),
            default: MockResponse::Structured(
                serde_json::json!({ "grade": grade, "reason": "mock grade" }),
            ),
            responses: HashMap::new(),
            omitted: HashSet::new(),
            failing_queries: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, metric: Metric, response: MockResponse) -> Self {
        self.responses.insert(metric, response);
        self
    }

    pub fn with_grade(self, metric: Metric, grade: i64, reason: &str) -> Self {
        self.with_response(
            metric,
            MockResponse::Structured(serde_json::json!({ "grade": grade, "reason": reason })),
        )
    }

    pub fn with_text(self, metric: Metric, text: &str) -> Self {
        self.with_response(metric, MockResponse::Text(text.to_string()))
    }

    /// Leave `metric` out of the returned mapping even when requested
    pub fn omitting(mut self, metric: Metric) -> Self {
        self.omitted.insert(metric);
        self
    }

    /// Fail the whole call for examples with this query
    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<EvaluationResponses, EvaluatorError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(RecordedRequest {
            metrics: request.metrics.to_vec(),
            query: request.query.to_string(),
            context: request.context.map(str::to_string),
            image: request.image.map(str::to_string),
        });

        if self.failing_queries.contains(request.query) {
            return Err(EvaluatorError::Request(format!("mock failure for '{}'", request.query)));
        }

        Ok(request
            .metrics
            .iter()
            .filter(|m| !self.omitted.contains(*m))
            .map(|m| (*m, self.responses.get(m).unwrap_or(&self.default).to_response()))
            .collect())
    }
}
