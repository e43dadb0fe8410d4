//! # mmrag-model
//!
//! Judge implementations for `mmrag-eval`.
//!
//! ## Overview
//!
//! - [`VisionJudge`] - vision-language judge over any OpenAI-compatible chat
//!   completions API (OpenAI, Ollama, vLLM, ...)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mmrag_model::{JudgeConfig, VisionJudge};
//!
//! let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
//! let judge = VisionJudge::new(JudgeConfig::gpt4o(api_key)).unwrap();
//!
//! // Use with a dataset evaluator
//! // let evaluator = DatasetEvaluator::new(Arc::new(judge));
//! ```
//!
//! ## Supported Judges
//!
//! | Preset | Model | Endpoint |
//! |--------|-------|----------|
//! | `gpt4o` | `gpt-4o` | `https://api.openai.com/v1` |
//! | `llava_ollama` | `llava` | `http://localhost:11434/v1` |

pub mod config;
pub mod convert;
pub mod judge;
pub mod prompt;
pub mod retry;

pub use config::{DEFAULT_API_BASE, JudgeConfig, OLLAMA_API_BASE};
pub use judge::VisionJudge;
pub use retry::RetryConfig;
