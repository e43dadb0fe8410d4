//! Judge response shapes and their normalization into graded results
//!
//! A judge may answer with a structured value, a JSON string, or a deferred
//! value that must be awaited first. Every shape goes through the same
//! `resolve` then `into_graded` steps before it reaches the result table.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

use crate::error::EvaluatorError;

/// Reason recorded when the judge's text could not be parsed
pub const INVALID_FORMAT_REASON: &str = "Invalid format";

/// Reason recorded when a parsed response carries no `reason` field
pub const NO_EVALUATION_REASON: &str = "No evaluation provided";

/// Grade and rationale for one metric of one example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedResult {
    /// `None` means "not evaluated", which is not the same as a zero grade
    pub grade: Option<i64>,
    pub reason: String,
}

impl GradedResult {
    pub fn graded(grade: i64, reason: impl Into<String>) -> Self {
        Self { grade: Some(grade), reason: reason.into() }
    }

    pub fn not_graded(reason: impl Into<String>) -> Self {
        Self { grade: None, reason: reason.into() }
    }

    /// The judge produced something unusable: a judged zero
    pub fn invalid_format() -> Self {
        Self::graded(0, INVALID_FORMAT_REASON)
    }

    /// The judge produced nothing for the metric
    pub fn no_evaluation() -> Self {
        Self::graded(0, NO_EVALUATION_REASON)
    }
}

/// A response that has not been produced yet
pub struct DeferredResponse(BoxFuture<'static, Result<JudgeResponse, EvaluatorError>>);

impl DeferredResponse {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<JudgeResponse, EvaluatorError>> + Send + 'static,
    {
        Self(Box::pin(future))
    }
}

impl fmt::Debug for DeferredResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredResponse(..)")
    }
}

/// What an evaluator returns for a single metric
#[derive(Debug)]
pub enum JudgeResponse {
    /// Already structured, expected to be an object with `grade` and `reason`
    Structured(Value),
    /// A string, expected to hold the JSON encoding of the structured shape
    Text(String),
    /// Must be awaited before use
    Deferred(DeferredResponse),
}

impl JudgeResponse {
    pub fn structured(grade: i64, reason: impl Into<String>) -> Self {
        JudgeResponse::Structured(serde_json::json!({ "grade": grade, "reason": reason.into() }))
    }

    pub fn text(text: impl Into<String>) -> Self {
        JudgeResponse::Text(text.into())
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<JudgeResponse, EvaluatorError>> + Send + 'static,
    {
        JudgeResponse::Deferred(DeferredResponse::new(future))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, JudgeResponse::Deferred(_))
    }

    /// Await deferred values, including deferreds that yield deferreds
    pub async fn resolve(self) -> Result<ResolvedResponse, EvaluatorError> {
        let mut current = self;
        loop {
            current = match current {
                JudgeResponse::Deferred(DeferredResponse(future)) => future.await?,
                JudgeResponse::Structured(value) => return Ok(ResolvedResponse::Structured(value)),
                JudgeResponse::Text(text) => return Ok(ResolvedResponse::Text(text)),
            };
        }
    }
}

/// A judge response with no pending work left
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedResponse {
    Structured(Value),
    Text(String),
}

impl ResolvedResponse {
    /// Normalize into a grade and a reason.
    ///
    /// Unparseable text (and JSON that is not an object) becomes a zero grade
    /// with [`INVALID_FORMAT_REASON`]. A missing `grade` becomes 0 and a
    /// missing `reason` becomes [`NO_EVALUATION_REASON`].
    pub fn into_graded(self) -> GradedResult {
        let value = match self {
            ResolvedResponse::Structured(value) => value,
            ResolvedResponse::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(_) => return GradedResult::invalid_format(),
            },
        };

        let Value::Object(fields) = value else {
            return GradedResult::invalid_format();
        };

        let grade = match fields.get("grade") {
            None => Some(0),
            // An explicit null is kept as "not evaluated"
            Some(Value::Null) => None,
            Some(other) => Some(parse_grade(other)),
        };
        let reason = match fields.get("reason") {
            None | Some(Value::Null) => NO_EVALUATION_REASON.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        GradedResult { grade, reason }
    }
}

/// Integer grade from a JSON value; floats truncate, non-numeric values give 0
fn parse_grade(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn normalize(response: JudgeResponse) -> GradedResult {
        response.resolve().await.unwrap().into_graded()
    }

    #[tokio::test]
    async fn test_structured_response() {
        let graded = normalize(JudgeResponse::structured(4, "well supported")).await;
        assert_eq!(graded, GradedResult::graded(4, "well supported"));
    }

    #[tokio::test]
    async fn test_json_text_response() {
        let graded = normalize(JudgeResponse::text(r#"{"grade": 3, "reason": "partly"}"#)).await;
        assert_eq!(graded, GradedResult::graded(3, "partly"));
    }

    #[tokio::test]
    async fn test_unparseable_text_is_invalid_format() {
        for text in ["Grade: 4", "", "{\"grade\": 4", "```json\n{\"grade\": 4}\n```"] {
            let graded = normalize(JudgeResponse::text(text)).await;
            assert_eq!(graded, GradedResult::graded(0, "Invalid format"), "text {text:?}");
        }
    }

    #[tokio::test]
    async fn test_non_object_json_is_invalid_format() {
        assert_eq!(normalize(JudgeResponse::text("5")).await, GradedResult::invalid_format());
        assert_eq!(
            normalize(JudgeResponse::Structured(json!(["a"]))).await,
            GradedResult::invalid_format()
        );
    }

    #[tokio::test]
    async fn test_empty_object_uses_defaults() {
        let graded = normalize(JudgeResponse::text("{}")).await;
        assert_eq!(graded, GradedResult::graded(0, "No evaluation provided"));

        let graded = normalize(JudgeResponse::Structured(json!({}))).await;
        assert_eq!(graded.grade, Some(0));
        assert_eq!(graded.reason, NO_EVALUATION_REASON);
    }

    #[tokio::test]
    async fn test_partial_fields() {
        let graded = normalize(JudgeResponse::Structured(json!({"grade": 2}))).await;
        assert_eq!(graded, GradedResult::graded(2, NO_EVALUATION_REASON));

        let graded = normalize(JudgeResponse::Structured(json!({"reason": "no grade"}))).await;
        assert_eq!(graded, GradedResult::graded(0, "no grade"));
    }

    #[tokio::test]
    async fn test_grade_coercion() {
        let cases = [
            (json!({"grade": 4.7}), Some(4)),
            (json!({"grade": "3"}), Some(3)),
            (json!({"grade": " 2.0 "}), Some(2)),
            (json!({"grade": "excellent"}), Some(0)),
            (json!({"grade": null}), None),
        ];
        for (value, expected) in cases {
            let graded = normalize(JudgeResponse::Structured(value.clone())).await;
            assert_eq!(graded.grade, expected, "value {value}");
        }
    }

    #[tokio::test]
    async fn test_deferred_is_resolved_first() {
        let response =
            JudgeResponse::deferred(async { Ok(JudgeResponse::text(r#"{"grade": 5, "reason": "ok"}"#)) });
        assert!(response.is_deferred());
        assert_eq!(normalize(response).await, GradedResult::graded(5, "ok"));
    }

    #[tokio::test]
    async fn test_nested_deferred() {
        let response = JudgeResponse::deferred(async {
            Ok(JudgeResponse::deferred(async { Ok(JudgeResponse::structured(1, "inner")) }))
        });
        assert_eq!(normalize(response).await, GradedResult::graded(1, "inner"));
    }

    #[tokio::test]
    async fn test_deferred_failure_propagates() {
        let response = JudgeResponse::deferred(async { Err(EvaluatorError::EmptyResponse) });
        assert_eq!(response.resolve().await.unwrap_err(), EvaluatorError::EmptyResponse);
    }
}
