//! Error types for the evaluation framework

use thiserror::Error;

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that stop a dataset run
#[derive(Error, Debug)]
pub enum EvalError {
    /// Failed to load an input file
    #[error("Failed to load input: {0}")]
    LoadError(String),

    /// Failed to parse an input file
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors raised by an [`Evaluator`](crate::evaluator::Evaluator) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    /// The request never produced a response (transport failure, timeout)
    #[error("Judge request failed: {0}")]
    Request(String),

    /// The judge answered with a non-success status
    #[error("Judge returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The judge answered without any content
    #[error("Empty response from judge")]
    EmptyResponse,

    /// The evaluator is misconfigured
    #[error("Invalid judge configuration: {0}")]
    Config(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Row-level failure: no metric column is written for the example.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// The evaluator call itself failed
    #[error("evaluator invocation failed: {0}")]
    Invocation(EvaluatorError),

    /// A deferred response for the given metric could not be resolved
    #[error("failed to resolve deferred result for {metric}: {source}")]
    Resolution { metric: String, source: EvaluatorError },
}
