use clap::{Parser, Subcommand};
use mmrag_telemetry::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mmrag")]
#[command(about = "Evaluate multimodal RAG pipeline outputs with an LLM judge", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grade every example of a RAG output file
    Evaluate {
        /// JSON array of RAG outputs to grade
        #[arg(short, long)]
        input: PathBuf,

        /// Result file, rewritten after every example
        #[arg(short, long)]
        output: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Judge model name
        #[arg(long)]
        model: Option<String>,

        /// Base URL of an OpenAI-compatible API
        #[arg(long)]
        base_url: Option<String>,

        /// Log format: pretty or json
        #[arg(long)]
        log_format: Option<LogFormat>,
    },

    /// Print averages and the table of a (possibly partial) result file
    Report {
        /// Result file written by `evaluate`
        #[arg(short, long)]
        results: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "mmrag", "evaluate", "--input", "in.json", "--output", "out.json", "--model", "llava",
            "--log-format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate { input, output, config, model, base_url, log_format } => {
                assert_eq!(input, PathBuf::from("in.json"));
                assert_eq!(output, PathBuf::from("out.json"));
                assert!(config.is_none());
                assert_eq!(model.as_deref(), Some("llava"));
                assert!(base_url.is_none());
                assert_eq!(log_format, Some(LogFormat::Json));
            }
            Commands::Report { .. } => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let parsed = Cli::try_parse_from([
            "mmrag", "evaluate", "-i", "in.json", "-o", "out.json", "--log-format", "xml",
        ]);
        assert!(parsed.is_err());
    }
}
