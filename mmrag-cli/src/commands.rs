use anyhow::{Context, Result};
use mmrag_eval::report::{MetricSummary, format_metric_summaries};
use mmrag_eval::{Dataset, DatasetEvaluator, ResultTable, format_table};
use mmrag_model::{DEFAULT_API_BASE, VisionJudge};
use mmrag_telemetry::{info, init_telemetry, warn};
use std::path::Path;
use std::sync::Arc;

use crate::config::CliConfig;

/// Run a full dataset evaluation and print the report and table
pub async fn evaluate(input: &Path, output: &Path, config: CliConfig) -> Result<()> {
    init_telemetry("mmrag", config.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let dataset = Dataset::load(input)?;
    info!(examples = dataset.len(), input = %input.display(), "Loaded RAG outputs");

    if config.judge.api_key.is_empty() && config.judge.base_url == DEFAULT_API_BASE {
        warn!("no API key configured; set MMRAG_API_KEY or OPENAI_API_KEY");
    }

    let judge = VisionJudge::new(config.judge)
        .context("failed to create judge")?
        .with_retry_config(config.retry.to_retry_config());
    let evaluator = DatasetEvaluator::new(Arc::new(judge));

    let outcome = evaluator
        .evaluate_dataset(&dataset, output)
        .await
        .with_context(|| format!("evaluation aborted, partial results in {}", output.display()))?;

    println!("{}", outcome.report.format_summary());
    print!("{}", format_table(&outcome.table));
    Ok(())
}

/// Print per-metric averages and the table of a persisted result file
pub fn report(results: &Path) -> Result<()> {
    let table = ResultTable::load(results)?;

    println!("Results: {} ({} rows)", results.display(), table.len());
    print!("{}", format_metric_summaries(&MetricSummary::from_table(&table)));
    println!();
    print!("{}", format_table(&table));
    Ok(())
}
