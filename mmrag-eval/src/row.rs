//! Per-example grading
//!
//! [`evaluate_row`] asks the judge for every applicable metric and writes the
//! normalized grades; [`handle_no_data`] records the sentinel entries for a
//! modality the example does not have.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::RowError;
use crate::evaluator::{EvaluationRequest, Evaluator};
use crate::metric::{Metric, MetricCatalog, Modality};
use crate::response::GradedResult;
use crate::schema::Example;
use crate::table::{Cell, ResultTable};

/// Grade `metrics` for the example at `index` and write them into `table`.
///
/// Every response is resolved and normalized before anything is written, so
/// on error the row has no metric columns from this call. A requested metric
/// missing from the judge's answer is recorded with the missing-field
/// defaults; metrics that were not requested are dropped.
pub async fn evaluate_row(
    index: usize,
    metrics: &[Metric],
    example: &Example,
    evaluator: &dyn Evaluator,
    table: &mut ResultTable,
) -> Result<BTreeMap<Metric, GradedResult>, RowError> {
    let request = EvaluationRequest::new(metrics, example);
    let mut responses = evaluator.evaluate(&request).await.map_err(RowError::Invocation)?;

    let mut graded = BTreeMap::new();
    for metric in metrics {
        let result = match responses.remove(metric) {
            Some(response) => response
                .resolve()
                .await
                .map_err(|source| RowError::Resolution { metric: metric.name().to_string(), source })?
                .into_graded(),
            None => {
                debug!(metric = %metric, index, "judge returned no result for requested metric");
                GradedResult::no_evaluation()
            }
        };
        graded.insert(*metric, result);
    }

    for metric in responses.keys() {
        debug!(metric = %metric, index, "ignoring result for metric that was not requested");
    }

    for (metric, result) in &graded {
        write_result(table, index, *metric, result);
    }

    Ok(graded)
}

/// Record "not graded" entries for every metric of a missing modality
pub fn handle_no_data(
    index: usize,
    modality: Modality,
    catalog: &MetricCatalog,
    table: &mut ResultTable,
) {
    let reason = modality.missing_reason();
    for metric in catalog.modality_metrics(modality) {
        write_result(table, index, *metric, &GradedResult::not_graded(reason.clone()));
    }
}

fn write_result(table: &mut ResultTable, index: usize, metric: Metric, result: &GradedResult) {
    table.set(index, &metric.grade_column(), Cell::from(result.grade));
    table.set(index, &metric.reason_column(), result.reason.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluatorError;
    use crate::evaluator::EvaluationResponses;
    use crate::mock::{MockEvaluator, MockResponse};
    use crate::response::JudgeResponse;
    use async_trait::async_trait;

    fn example() -> Example {
        Example::new("What is the capital of France?", "Paris.", "Paris.")
            .with_context("Paris is the capital of France.")
    }

    #[tokio::test]
    async fn test_writes_grade_and_reason_for_each_metric() {
        let mock = MockEvaluator::new("mock", 4);
        let metrics = [Metric::AnswerCorrectness, Metric::TextFaithfulness];
        let mut table = ResultTable::new();

        let graded = evaluate_row(0, &metrics, &example(), &mock, &mut table).await.unwrap();
        assert_eq!(graded.len(), 2);
        assert_eq!(table.grade(0, "Answer Correctness"), Some(4));
        assert_eq!(table.grade(0, "Text Faithfulness"), Some(4));
        assert_eq!(
            table.get(0, "Text Faithfulness reason").and_then(Cell::as_text),
            Some("mock grade")
        );
        assert_eq!(table.columns().len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_response_is_judged_zero() {
        let mock = MockEvaluator::new("mock", 4).with_text(Metric::AnswerRelevancy, "4/5, good");
        let metrics = [Metric::AnswerCorrectness, Metric::AnswerRelevancy];
        let mut table = ResultTable::new();

        evaluate_row(0, &metrics, &example(), &mock, &mut table).await.unwrap();
        assert_eq!(table.grade(0, "Answer Relevancy"), Some(0));
        assert_eq!(
            table.get(0, "Answer Relevancy reason").and_then(Cell::as_text),
            Some("Invalid format")
        );
        assert_eq!(table.grade(0, "Answer Correctness"), Some(4));
    }

    #[tokio::test]
    async fn test_omitted_metric_gets_defaults() {
        let mock = MockEvaluator::new("mock", 4).omitting(Metric::AnswerRelevancy);
        let metrics = [Metric::AnswerCorrectness, Metric::AnswerRelevancy];
        let mut table = ResultTable::new();

        let graded = evaluate_row(0, &metrics, &example(), &mock, &mut table).await.unwrap();
        assert_eq!(graded[&Metric::AnswerRelevancy], GradedResult::no_evaluation());
        assert_eq!(table.grade(0, "Answer Relevancy"), Some(0));
    }

    #[tokio::test]
    async fn test_invocation_failure_writes_nothing() {
        let mock = MockEvaluator::new("mock", 4).failing_on("What is the capital of France?");
        let metrics = [Metric::AnswerCorrectness];
        let mut table = ResultTable::new();

        let err = evaluate_row(0, &metrics, &example(), &mock, &mut table).await.unwrap_err();
        assert!(matches!(err, RowError::Invocation(EvaluatorError::Request(_))));
        assert!(table.columns().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_failure_writes_nothing() {
        let mock = MockEvaluator::new("mock", 4).with_response(
            Metric::TextFaithfulness,
            MockResponse::DeferredError(EvaluatorError::Other("lazy call failed".to_string())),
        );
        let metrics = [Metric::AnswerCorrectness, Metric::TextFaithfulness];
        let mut table = ResultTable::new();

        let err = evaluate_row(0, &metrics, &example(), &mock, &mut table).await.unwrap_err();
        assert!(matches!(err, RowError::Resolution { ref metric, .. } if metric == "Text Faithfulness"));
        assert!(table.columns().is_empty());
    }

    struct ChattyEvaluator;

    #[async_trait]
    impl Evaluator for ChattyEvaluator {
        fn name(&self) -> &str {
            "chatty"
        }

        async fn evaluate(
            &self,
            _request: &EvaluationRequest<'_>,
        ) -> Result<EvaluationResponses, EvaluatorError> {
            Ok(EvaluationResponses::from([
                (Metric::AnswerCorrectness, JudgeResponse::structured(5, "right")),
                (Metric::ImageFaithfulness, JudgeResponse::structured(5, "unasked")),
            ]))
        }
    }

    #[tokio::test]
    async fn test_unrequested_metrics_are_ignored() {
        let metrics = [Metric::AnswerCorrectness];
        let mut table = ResultTable::new();

        let graded =
            evaluate_row(0, &metrics, &example(), &ChattyEvaluator, &mut table).await.unwrap();
        assert_eq!(graded.len(), 1);
        assert!(table.get(0, "Image Faithfulness grade").is_none());
    }

    #[test]
    fn test_handle_no_data_sets_absent_grades() {
        let catalog = MetricCatalog::default();
        let mut table = ResultTable::new();
        handle_no_data(2, Modality::Image, &catalog, &mut table);

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2, "Image Faithfulness grade"), Some(&Cell::Null));
        assert_eq!(table.get(2, "Image Context Relevancy grade"), Some(&Cell::Null));
        assert_eq!(
            table.get(2, "Image Faithfulness reason").and_then(Cell::as_text),
            Some("No Image provided")
        );
        assert_eq!(
            table.get(2, "Image Context Relevancy reason").and_then(Cell::as_text),
            Some("No Image provided")
        );
        assert!(table.get(2, "Text Faithfulness grade").is_none());
    }
}
