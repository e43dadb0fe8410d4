//! Dataset driver
//!
//! Walks the examples strictly in order, one judge call in flight at a time,
//! and rewrites the full result table after every example.

use mmrag_telemetry::{Instrument, dataset_run_span, info, row_evaluate_span, warn};
use std::path::Path;
use std::sync::Arc;

use crate::aggregate::aggregate;
use crate::error::{Result, RowError};
use crate::evaluator::Evaluator;
use crate::metric::{MetricCatalog, Modality};
use crate::report::{FailedRow, RunReport};
use crate::row::{evaluate_row, handle_no_data};
use crate::schema::{Dataset, Example};
use crate::table::ResultTable;

/// Table and report produced by a run
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub table: ResultTable,
    pub report: RunReport,
}

/// Drives grading over a whole dataset
pub struct DatasetEvaluator {
    evaluator: Arc<dyn Evaluator>,
    catalog: MetricCatalog,
}

impl DatasetEvaluator {
    /// Create a dataset evaluator with the default metric catalog
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator, catalog: MetricCatalog::default() }
    }

    /// Use a custom metric catalog
    pub fn with_catalog(mut self, catalog: MetricCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Grade one example into `table`.
    ///
    /// Missing modalities get their sentinel entries first, then the judge is
    /// asked only for the applicable metrics. Aggregates are written only if
    /// the row evaluation succeeded.
    pub async fn evaluate_example(
        &self,
        index: usize,
        example: &Example,
        table: &mut ResultTable,
    ) -> std::result::Result<(), RowError> {
        table.ensure_row(index);

        let has_image = example.has_image();
        let has_text = example.has_context();
        if !has_image {
            handle_no_data(index, Modality::Image, &self.catalog, table);
        }
        if !has_text {
            handle_no_data(index, Modality::Text, &self.catalog, table);
        }

        let metrics = self.catalog.metrics_for(has_image, has_text);
        evaluate_row(index, &metrics, example, self.evaluator.as_ref(), table).await?;

        for category in &self.catalog.aggregates {
            aggregate(table, index, *category);
        }
        Ok(())
    }

    /// Grade every example, checkpointing the table to `output_path` after each.
    ///
    /// Judge failures only skip the affected row. Failing to write the
    /// checkpoint stops the run.
    pub async fn evaluate_dataset(
        &self,
        dataset: &Dataset,
        output_path: impl AsRef<Path>,
    ) -> Result<EvaluationOutcome> {
        let output_path = output_path.as_ref();
        let span = dataset_run_span(self.evaluator.name(), dataset.len());

        async move {
            let started_at = chrono::Utc::now();
            let stem = output_path.file_stem().and_then(|s| s.to_str()).unwrap_or("evaluation");
            let run_id = format!("{}_{}", stem, uuid::Uuid::new_v4());

            let mut table = ResultTable::new();
            let mut failed_rows = Vec::new();

            for (index, example) in dataset.iter().enumerate() {
                info!("Evaluating query no. {}...", index + 1);

                let outcome = self
                    .evaluate_example(index, example, &mut table)
                    .instrument(row_evaluate_span(index))
                    .await;

                if let Err(e) = outcome {
                    warn!(index, query = %example.user_query, error = %e, "failed to evaluate example");
                    failed_rows.push(FailedRow {
                        index,
                        query: example.user_query.clone(),
                        error: e.to_string(),
                    });
                }

                table.save(output_path)?;
            }

            let report =
                RunReport::new(&run_id, self.evaluator.name(), &table, failed_rows, started_at);
            info!(
                run_id = %report.run_id,
                evaluated = report.evaluated,
                failed = report.failed_rows.len(),
                "Dataset evaluation complete"
            );

            Ok(EvaluationOutcome { table, report })
        }
        .instrument(span)
        .await
    }
}
