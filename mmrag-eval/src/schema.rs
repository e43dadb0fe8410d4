//! Input schema
//!
//! A RAG output file is a JSON array of records, one per answered query.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{EvalError, Result};

/// One output of the RAG pipeline under evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Question answered by the pipeline
    pub user_query: String,
    /// Gold standard answer
    pub reference_answer: String,
    /// Answer produced by the pipeline
    pub generated_answer: String,
    /// Retrieved text context
    #[serde(default, deserialize_with = "lenient_text")]
    pub context: Option<String>,
    /// Retrieved image, base64 encoded
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
}

impl Example {
    pub fn new(
        user_query: impl Into<String>,
        generated_answer: impl Into<String>,
        reference_answer: impl Into<String>,
    ) -> Self {
        Self {
            user_query: user_query.into(),
            reference_answer: reference_answer.into(),
            generated_answer: generated_answer.into(),
            context: None,
            image: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Context text, if any non-empty text was retrieved
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.is_empty())
    }

    /// Encoded image, if any non-empty image was retrieved
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }

    pub fn has_context(&self) -> bool {
        self.context().is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image().is_some()
    }
}

/// Accepts a string, or any falsy JSON value as "absent".
///
/// Pipelines emit `null`, `""`, `[]` or `false` for missing context, and a list
/// of images where only the first one is graded.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Array(items) => match items.into_iter().next() {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(serde::de::Error::custom(format!(
                "expected a list of strings, found element {}",
                other
            ))),
        },
        other => Err(serde::de::Error::custom(format!("expected string or null, found {}", other))),
    }
}

/// Ordered collection of examples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub examples: Vec<Example>,
}

impl Dataset {
    pub fn from_examples(examples: Vec<Example>) -> Self {
        Self { examples }
    }

    /// Load a dataset from a JSON array of records
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::LoadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| EvalError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }
}
