//! Span helpers for evaluation runs

use tracing::Span;

/// Span covering a whole dataset run
///
/// # Example
/// ```
/// use mmrag_telemetry::dataset_run_span;
/// let span = dataset_run_span("gpt-4o", 12);
/// let _enter = span.enter();
/// ```
pub fn dataset_run_span(evaluator: &str, examples: usize) -> Span {
    tracing::info_span!("dataset.evaluate", evaluator.name = evaluator, dataset.examples = examples)
}

/// Span for grading one example
pub fn row_evaluate_span(index: usize) -> Span {
    tracing::info_span!("row.evaluate", row.index = index)
}

/// Span for a single judge call
pub fn judge_call_span(model_name: &str, metric: &str) -> Span {
    tracing::debug_span!("judge.call", model.name = model_name, metric = metric)
}
