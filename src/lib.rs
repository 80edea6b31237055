//! Claimscope - AI fraud triage for healthcare claims
//!
//! An agent investigates a free-text insurance claim by calling fraud tools
//! hosted in a data-platform workspace, then explains its assessment.
//!
//! # Overview
//!
//! Claimscope allows you to:
//! - Classify a claim and extract its risk indicators with remote SQL functions
//! - Search a vector index of known fraud patterns
//! - Get a written assessment with a replay of every tool call
//! - Use all of this from the CLI, a web dashboard or a JSON API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `workspace` - Authenticated workspace REST client
//! - `remote` - Remote function and vector search invokers
//! - `agent` - Tool-calling agent and its transcript
//! - `analysis` - Claim analysis service and transcript replay
//! - `samples` - Built-in sample claims
//! - `server` - Web dashboard and JSON API
//!
//! # Example
//!
//! ```rust,no_run
//! use claimscope::analysis::build_analyzer;
//! use claimscope::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let (analyzer, _workspace) = build_analyzer(&settings)?;
//!
//!     let report = analyzer.analyze("Medical claim #CLM-2024-001 ...").await?;
//!     println!("{} tool(s) used", report.tool_count);
//!     if let Some(answer) = report.final_answer {
//!         println!("{}", answer);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod remote;
pub mod samples;
pub mod server;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ClaimscopeError, Result};
