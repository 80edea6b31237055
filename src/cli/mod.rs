//! CLI module for Claimscope.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Claimscope - AI fraud triage for healthcare claims
///
/// Runs an agent that classifies a claim, extracts risk indicators, searches
/// similar fraud patterns and explains its assessment, from the command line
/// or through a small web dashboard.
#[derive(Parser, Debug)]
#[command(name = "claimscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web dashboard and JSON API
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze one claim and print the assessment
    Analyze {
        /// Claim text (reads stdin when no text, sample or file is given)
        text: Option<String>,

        /// Use a built-in sample claim by name
        #[arg(short, long, conflicts_with_all = ["text", "file"])]
        sample: Option<String>,

        /// Read the claim from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in sample claims
    Samples,

    /// Check configuration and workspace connectivity
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (token redacted)
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_sample() {
        let cli = Cli::try_parse_from(["claimscope", "-vv", "analyze", "--sample", "Phantom Billing", "--json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze { sample, json, text, .. } => {
                assert_eq!(sample.as_deref(), Some("Phantom Billing"));
                assert!(json);
                assert!(text.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sample_conflicts_with_text() {
        assert!(Cli::try_parse_from(["claimscope", "analyze", "claim", "--sample", "x"]).is_err());
    }

    #[test]
    fn test_parse_serve_and_config() {
        let cli = Cli::try_parse_from(["claimscope", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), host: None }));

        let cli = Cli::try_parse_from(["claimscope", "--config", "/tmp/c.toml", "config", "path"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
        assert!(matches!(cli.command, Commands::Config { action: ConfigAction::Path }));
    }
}
