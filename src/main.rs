//! Claimscope CLI entry point.

use anyhow::Result;
use clap::Parser;
use claimscope::cli::{commands, Cli, Commands};
use claimscope::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("claimscope={},tower_http={}", log_level, log_level)
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Analyze {
            text,
            sample,
            file,
            json,
        } => {
            let source = commands::ClaimSource::from_args(
                text.as_deref(),
                sample.as_deref(),
                file.as_deref(),
            );
            commands::run_analyze(source, *json, &settings).await?;
        }

        Commands::Samples => {
            commands::run_samples();
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, cli.config.as_deref()).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
