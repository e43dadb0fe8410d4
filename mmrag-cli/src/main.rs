use anyhow::Result;
use clap::Parser;
use mmrag_cli::config::CliConfig;
use mmrag_cli::{Cli, Commands, commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { input, output, config, model, base_url, log_format } => {
            let mut settings = CliConfig::load(config.as_deref())?;
            settings.apply_process_env();
            settings.apply_overrides(model, base_url, log_format);
            commands::evaluate(&input, &output, settings).await
        }
        Commands::Report { results } => commands::report(&results),
    }
}
