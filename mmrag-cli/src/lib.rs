//! # mmrag-cli
//!
//! Command-line runner for multimodal RAG evaluations.
//!
//! ## Commands
//!
//! - `mmrag evaluate` - grade a RAG output file with a vision judge,
//!   checkpointing results after every example
//! - `mmrag report` - summarize a (possibly partial) result file
//!
//! ## Configuration
//!
//! Defaults, then an optional TOML file (`--config`), then `MMRAG_API_KEY`
//! (or `OPENAI_API_KEY`), `MMRAG_BASE_URL` and `MMRAG_MODEL`, then flags.
//!
//! ```toml
//! log_format = "pretty"
//!
//! [judge]
//! model = "gpt-4o"
//! base_url = "https://api.openai.com/v1"
//! max_tokens = 512
//!
//! [retry]
//! max_retries = 3
//! ```

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
pub use config::{CliConfig, RetrySettings};
