//! # mmrag-telemetry
//!
//! Structured logging for the multimodal RAG evaluator.
//!
//! ```rust
//! use mmrag_telemetry::{init_telemetry, info, LogFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("mmrag", LogFormat::Pretty)?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry};
pub use spans::*;
