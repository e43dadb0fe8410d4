//! Evaluation result reporting
//!
//! Structures for summarizing a run and rendering the result table.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::table::{Cell, ResultTable};

/// Widest cell printed by [`format_table`]
const MAX_CELL_WIDTH: usize = 40;

/// Summary of a dataset run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this evaluation run
    pub run_id: String,
    /// Judge that produced the grades
    pub evaluator: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub duration: Duration,
    /// Examples in the input
    pub total: usize,
    /// Examples whose metrics were written
    pub evaluated: usize,
    /// Examples skipped because the judge failed
    pub failed_rows: Vec<FailedRow>,
    /// Per grade column statistics
    pub metrics: Vec<MetricSummary>,
}

impl RunReport {
    pub fn new(
        run_id: &str,
        evaluator: &str,
        table: &ResultTable,
        failed_rows: Vec<FailedRow>,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let completed_at = chrono::Utc::now();
        let duration = (completed_at - started_at).to_std().unwrap_or_default();
        let total = table.len();
        Self {
            run_id: run_id.to_string(),
            evaluator: evaluator.to_string(),
            started_at,
            completed_at,
            duration,
            total,
            evaluated: total.saturating_sub(failed_rows.len()),
            failed_rows,
            metrics: MetricSummary::from_table(table),
        }
    }

    pub fn all_evaluated(&self) -> bool {
        self.failed_rows.is_empty()
    }

    /// Format as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Evaluation Report: {}\n", self.run_id));
        output.push_str(&format!("Evaluator: {}\n", self.evaluator));
        output.push_str(&format!("Duration: {:?}\n", self.duration));
        output.push_str("\nSummary:\n");
        output.push_str(&format!("  Examples: {}\n", self.total));
        output.push_str(&format!("  Evaluated: {}\n", self.evaluated));
        output.push_str(&format!("  Failed: {}\n", self.failed_rows.len()));
        output.push_str(&format_metric_summaries(&self.metrics));

        if !self.failed_rows.is_empty() {
            output.push_str("\nFailed Examples:\n");
            for failed in &self.failed_rows {
                output.push_str(&format!(
                    "  - #{} \"{}\": {}\n",
                    failed.index + 1,
                    failed.query,
                    failed.error
                ));
            }
        }

        output
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// An example whose row evaluation was abandoned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRow {
    pub index: usize,
    pub query: String,
    pub error: String,
}

/// Average of one grade column over the rows that have a grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub column: String,
    /// Rows with a non-null grade
    pub count: usize,
    pub mean: Option<f64>,
}

impl MetricSummary {
    /// Summaries for every `... grade` column, in column order
    pub fn from_table(table: &ResultTable) -> Vec<Self> {
        table
            .columns()
            .iter()
            .filter(|c| c.ends_with(" grade"))
            .map(|column| {
                let values: Vec<f64> = table
                    .rows()
                    .iter()
                    .filter_map(|row| row.get(column).and_then(Cell::as_f64))
                    .collect();
                let mean = if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                };
                MetricSummary { column: column.clone(), count: values.len(), mean }
            })
            .collect()
    }
}

/// Render metric averages, one line per grade column
pub fn format_metric_summaries(metrics: &[MetricSummary]) -> String {
    let mut output = String::new();
    if metrics.is_empty() {
        return output;
    }
    output.push_str("\nAverage Grades:\n");
    for metric in metrics {
        match metric.mean {
            Some(mean) => output.push_str(&format!(
                "  {}: {:.3} (n={})\n",
                metric.column, mean, metric.count
            )),
            None => output.push_str(&format!("  {}: n/a\n", metric.column)),
        }
    }
    output
}

/// Plain-text rendering of the whole table
pub fn format_table(table: &ResultTable) -> String {
    let mut header = vec!["#".to_string()];
    header.extend(table.columns().iter().cloned());

    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = vec![index.to_string()];
            cells.extend(
                table.columns().iter().map(|c| render_cell(row.get(c).unwrap_or(&Cell::Null))),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut output = String::new();
    for line in std::iter::once(&header).chain(body.iter()) {
        let rendered: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = *width))
            .collect();
        output.push_str(rendered.join("  ").trim_end());
        output.push('\n');
    }
    output
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Null => "None".to_string(),
        Cell::Grade(g) => g.to_string(),
        Cell::Score(s) => format!("{:.1}", s),
        Cell::Text(t) => t.replace('\n', " "),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
