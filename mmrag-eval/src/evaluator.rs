//! The judge contract consumed by the row evaluator

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::EvaluatorError;
use crate::metric::Metric;
use crate::response::JudgeResponse;
use crate::schema::Example;

/// Everything the judge sees for one example
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// Metrics to grade; never contains metrics for a missing modality
    pub metrics: &'a [Metric],
    pub query: &'a str,
    pub context: Option<&'a str>,
    pub image: Option<&'a str>,
    pub generated_answer: &'a str,
    pub reference_answer: &'a str,
}

impl<'a> EvaluationRequest<'a> {
    pub fn new(metrics: &'a [Metric], example: &'a Example) -> Self {
        Self {
            metrics,
            query: &example.user_query,
            context: example.context(),
            image: example.image(),
            generated_answer: &example.generated_answer,
            reference_answer: &example.reference_answer,
        }
    }
}

/// Per-metric responses returned by a judge
pub type EvaluationResponses = HashMap<Metric, JudgeResponse>;

/// An automated judge grading a generated answer.
///
/// Implementations must return an error rather than hang on input they
/// cannot handle.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Grade the requested metrics for one example
    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<EvaluationResponses, EvaluatorError>;
}

#[async_trait]
impl<E: Evaluator + ?Sized> Evaluator for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<EvaluationResponses, EvaluatorError> {
        (**self).evaluate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_example() {
        let example = Example::new("What is shown?", "A cat.", "A cat.")
            .with_context("")
            .with_image("aW1n");
        let metrics = [Metric::AnswerCorrectness];
        let request = EvaluationRequest::new(&metrics, &example);
        assert_eq!(request.query, "What is shown?");
        assert_eq!(request.context, None);
        assert_eq!(request.image, Some("aW1n"));
        assert_eq!(request.metrics, &[Metric::AnswerCorrectness]);
    }
}
