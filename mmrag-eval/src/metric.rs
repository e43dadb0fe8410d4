//! Metric definitions
//!
//! The quality dimensions graded by the judge, the context modality each one
//! depends on, and the aggregate categories combined across modalities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A context channel that may or may not be present for an example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Image,
    Text,
}

impl Modality {
    /// Column prefix used for this modality's metrics
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Image => "Image",
            Modality::Text => "Text",
        }
    }

    /// Reason recorded when the modality is missing from an example
    pub fn missing_reason(&self) -> String {
        format!("No {} provided", self.label())
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An individually graded quality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    AnswerCorrectness,
    AnswerRelevancy,
    ImageFaithfulness,
    ImageContextRelevancy,
    TextFaithfulness,
    TextContextRelevancy,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::AnswerCorrectness,
        Metric::AnswerRelevancy,
        Metric::ImageFaithfulness,
        Metric::ImageContextRelevancy,
        Metric::TextFaithfulness,
        Metric::TextContextRelevancy,
    ];

    /// Display name, also the prefix of the result columns
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AnswerCorrectness => "Answer Correctness",
            Metric::AnswerRelevancy => "Answer Relevancy",
            Metric::ImageFaithfulness => "Image Faithfulness",
            Metric::ImageContextRelevancy => "Image Context Relevancy",
            Metric::TextFaithfulness => "Text Faithfulness",
            Metric::TextContextRelevancy => "Text Context Relevancy",
        }
    }

    /// Modality the metric grades against, `None` for base metrics
    pub fn modality(&self) -> Option<Modality> {
        match self {
            Metric::AnswerCorrectness | Metric::AnswerRelevancy => None,
            Metric::ImageFaithfulness | Metric::ImageContextRelevancy => Some(Modality::Image),
            Metric::TextFaithfulness | Metric::TextContextRelevancy => Some(Modality::Text),
        }
    }

    pub fn grade_column(&self) -> String {
        grade_column(self.name())
    }

    pub fn reason_column(&self) -> String {
        reason_column(self.name())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s.trim())
            .ok_or_else(|| format!("unknown metric '{}'", s))
    }
}

/// A category averaged over its Image- and Text-prefixed metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateMetric {
    Faithfulness,
    ContextRelevancy,
}

impl AggregateMetric {
    pub const ALL: [AggregateMetric; 2] =
        [AggregateMetric::Faithfulness, AggregateMetric::ContextRelevancy];

    pub fn name(&self) -> &'static str {
        match self {
            AggregateMetric::Faithfulness => "Faithfulness",
            AggregateMetric::ContextRelevancy => "Context Relevancy",
        }
    }

    pub fn image_metric(&self) -> Metric {
        match self {
            AggregateMetric::Faithfulness => Metric::ImageFaithfulness,
            AggregateMetric::ContextRelevancy => Metric::ImageContextRelevancy,
        }
    }

    pub fn text_metric(&self) -> Metric {
        match self {
            AggregateMetric::Faithfulness => Metric::TextFaithfulness,
            AggregateMetric::ContextRelevancy => Metric::TextContextRelevancy,
        }
    }

    pub fn grade_column(&self) -> String {
        grade_column(self.name())
    }
}

impl fmt::Display for AggregateMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column holding the grade for a metric or aggregate
pub fn grade_column(name: &str) -> String {
    format!("{} grade", name)
}

/// Column holding the judge's rationale for a metric
pub fn reason_column(name: &str) -> String {
    format!("{} reason", name)
}

/// Which metrics exist and how they group by modality.
///
/// Built once and handed to the components that need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalog {
    /// Always evaluated
    pub base: Vec<Metric>,
    /// Evaluated only when an image is present
    pub image: Vec<Metric>,
    /// Evaluated only when context text is present
    pub text: Vec<Metric>,
    /// Combined per example after grading
    pub aggregates: Vec<AggregateMetric>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            base: vec![Metric::AnswerCorrectness, Metric::AnswerRelevancy],
            image: vec![Metric::ImageFaithfulness, Metric::ImageContextRelevancy],
            text: vec![Metric::TextFaithfulness, Metric::TextContextRelevancy],
            aggregates: AggregateMetric::ALL.to_vec(),
        }
    }
}

impl MetricCatalog {
    /// Metrics tied to a modality
    pub fn modality_metrics(&self, modality: Modality) -> &[Metric] {
        match modality {
            Modality::Image => &self.image,
            Modality::Text => &self.text,
        }
    }

    /// Metric set for an example, in base, image, text order
    pub fn metrics_for(&self, has_image: bool, has_text: bool) -> Vec<Metric> {
        let mut metrics = self.base.clone();
        if has_image {
            metrics.extend_from_slice(&self.image);
        }
        if has_text {
            metrics.extend_from_slice(&self.text);
        }
        metrics
    }

    /// Number of individual metrics in the catalog
    pub fn len(&self) -> usize {
        self.base.len() + self.image.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert!("Fluency".parse::<Metric>().is_err());
    }

    #[test]
    fn test_metric_columns() {
        assert_eq!(Metric::AnswerCorrectness.grade_column(), "Answer Correctness grade");
        assert_eq!(Metric::ImageFaithfulness.reason_column(), "Image Faithfulness reason");
        assert_eq!(AggregateMetric::ContextRelevancy.grade_column(), "Context Relevancy grade");
    }

    #[test]
    fn test_modality_grouping() {
        assert_eq!(Metric::AnswerRelevancy.modality(), None);
        assert_eq!(Metric::ImageContextRelevancy.modality(), Some(Modality::Image));
        assert_eq!(Metric::TextFaithfulness.modality(), Some(Modality::Text));
        assert_eq!(Modality::Image.missing_reason(), "No Image provided");
    }

    #[test]
    fn test_aggregate_inputs() {
        let faith = AggregateMetric::Faithfulness;
        assert_eq!(faith.image_metric(), Metric::ImageFaithfulness);
        assert_eq!(faith.text_metric(), Metric::TextFaithfulness);
        let relevancy = AggregateMetric::ContextRelevancy;
        assert_eq!(relevancy.image_metric(), Metric::ImageContextRelevancy);
        assert_eq!(relevancy.text_metric(), Metric::TextContextRelevancy);
    }

    #[test]
    fn test_metrics_for_modalities() {
        let catalog = MetricCatalog::default();
        assert_eq!(catalog.len(), 6);
        assert_eq!(
            catalog.metrics_for(false, false),
            vec![Metric::AnswerCorrectness, Metric::AnswerRelevancy]
        );
        assert_eq!(catalog.metrics_for(true, true).len(), 6);

        let text_only = catalog.metrics_for(false, true);
        assert_eq!(text_only.len(), 4);
        assert!(text_only.iter().all(|m| m.modality() != Some(Modality::Image)));
        assert_eq!(text_only[2], Metric::TextFaithfulness);
    }
}
