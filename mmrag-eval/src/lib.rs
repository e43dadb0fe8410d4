//! # mmrag-eval
//!
//! Judge-based scoring of multimodal RAG pipeline outputs.
//!
//! Every example of a dataset is graded by a judge on a fixed set of named
//! metrics. Answer metrics are always requested; image and text metrics only
//! when the example carries that modality. Grades and reasons are collected
//! into a result table, aggregated across modalities, and checkpointed to disk
//! after every example.
//!
//! ## Features
//!
//! - **Metric catalog**: Answer, Image and Text metrics plus the two
//!   cross-modality aggregates
//! - **Pluggable judges**: anything implementing [`Evaluator`]
//! - **Tolerant parsing**: structured, text and deferred judge responses are
//!   all normalized into a grade and a reason
//! - **Checkpointing**: the full table is rewritten after each example
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mmrag_eval::{Dataset, DatasetEvaluator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let judge = Arc::new(create_my_judge()?);
//!     let dataset = Dataset::load("data/rag_outputs.json")?;
//!
//!     let outcome = DatasetEvaluator::new(judge)
//!         .evaluate_dataset(&dataset, "results/evaluation.json")
//!         .await?;
//!
//!     println!("{}", outcome.report.format_summary());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metric;
pub mod mock;
pub mod report;
pub mod response;
pub mod row;
pub mod schema;
pub mod table;

// Re-exports
pub use aggregate::{ABSENT_GRADE, aggregate, aggregate_grade};
pub use dataset::{DatasetEvaluator, EvaluationOutcome};
pub use error::{EvalError, EvaluatorError, Result, RowError};
pub use evaluator::{EvaluationRequest, EvaluationResponses, Evaluator};
pub use metric::{AggregateMetric, Metric, MetricCatalog, Modality};
pub use mock::{MockEvaluator, MockResponse};
pub use report::{FailedRow, MetricSummary, RunReport, format_table};
pub use response::{
    DeferredResponse, GradedResult, INVALID_FORMAT_REASON, JudgeResponse, NO_EVALUATION_REASON,
    ResolvedResponse,
};
pub use row::{evaluate_row, handle_no_data};
pub use schema::{Dataset, Example};
pub use table::{Cell, ResultRow, ResultTable};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::dataset::{DatasetEvaluator, EvaluationOutcome};
    pub use crate::error::{EvalError, EvaluatorError, Result, RowError};
    pub use crate::evaluator::{EvaluationRequest, EvaluationResponses, Evaluator};
    pub use crate::metric::{AggregateMetric, Metric, MetricCatalog, Modality};
    pub use crate::report::RunReport;
    pub use crate::response::{GradedResult, JudgeResponse};
    pub use crate::schema::{Dataset, Example};
    pub use crate::table::{Cell, ResultTable};
}
