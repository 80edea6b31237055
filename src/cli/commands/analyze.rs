//! Analyze command implementation.

use crate::analysis::{build_analyzer, AnalysisReport};
use crate::cli::Output;
use crate::config::Settings;
use crate::samples::{find_sample, SAMPLE_CLAIMS};
use anyhow::{Context, Result};
use std::io::Read;

/// Where the claim text comes from.
#[derive(Debug)]
pub enum ClaimSource<'a> {
    Text(&'a str),
    Sample(&'a str),
    File(&'a str),
    Stdin,
}

impl<'a> ClaimSource<'a> {
    pub fn from_args(text: Option<&'a str>, sample: Option<&'a str>, file: Option<&'a str>) -> Self {
        match (text, sample, file) {
            (Some(t), _, _) => ClaimSource::Text(t),
            (_, Some(s), _) => ClaimSource::Sample(s),
            (_, _, Some(f)) => ClaimSource::File(f),
            _ => ClaimSource::Stdin,
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            ClaimSource::Text(t) => Ok(t.to_string()),
            ClaimSource::Sample(name) => match find_sample(name) {
                Some(sample) => Ok(sample.text.to_string()),
                None => {
                    let names: Vec<_> = SAMPLE_CLAIMS.iter().map(|s| s.name).collect();
                    anyhow::bail!("Unknown sample '{}'. Available: {}", name, names.join(", "))
                }
            },
            ClaimSource::File(path) => {
                let path = Settings::expand_path(path);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read claim from {}", path.display()))
            }
            ClaimSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read claim from stdin")?;
                Ok(buf)
            }
        }
    }
}

/// Run the analyze command.
pub async fn run_analyze(source: ClaimSource<'_>, json: bool, settings: &Settings) -> Result<()> {
    let claim_text = source.read()?;

    let (analyzer, _workspace) = match build_analyzer(settings) {
        Ok(built) => built,
        Err(e) => {
            Output::error(&format!("Error creating agent: {}", e));
            Output::info("Run 'claimscope doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let spinner = if json {
        None
    } else {
        Some(Output::spinner("🧠 Agent is analyzing the claim..."))
    };

    let result = analyzer.analyze(&claim_text).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            Output::error(&format!("Error running agent: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    if report.no_tools_used {
        Output::warning("No tool calls detected in agent execution");
    } else {
        Output::header(&format!(
            "Agent Tools Execution ({} of {} tools)",
            report.tool_count, report.tools_available
        ));
        for (i, call) in report.calls.iter().enumerate() {
            Output::tool_call(i + 1, call);
        }
    }

    Output::header("Final Fraud Assessment");
    match &report.final_answer {
        Some(answer) => println!("\n{}\n", answer),
        None => Output::success("Agent completed analysis. Check tool outputs above for details."),
    }

    Output::header("Performance Metrics");
    Output::metrics(report);
}
