//! Claim analysis service.
//!
//! Runs the agent over one claim, replays the transcript and derives the
//! metrics shown alongside the assessment.

mod replay;

pub use replay::{
    display_result, MessageDigest, ReplayedCall, ToolCategory, TranscriptReplay,
    DIGEST_CONTENT_CHARS, RESULT_PREVIEW_CHARS,
};

use crate::agent::{tool_specs, Agent, ServingEndpointModel, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::{ClaimscopeError, Result};
use crate::openai::{create_client, serving_base_url};
use crate::remote::{FraudPatternSearch, RemoteFunctions};
use crate::workspace::{ConnectionStatus, WorkspaceClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Placeholder cost per tool call, for display only.
pub const COST_PER_TOOL_USD: f64 = 0.0005;

/// Everything produced by analyzing one claim.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub model: String,
    pub calls: Vec<ReplayedCall>,
    pub final_answer: Option<String>,
    pub thoughts: Vec<String>,
    pub no_tools_used: bool,
    pub elapsed_ms: u64,
    pub tool_count: usize,
    /// Out of the tools the agent has available.
    pub tools_available: usize,
    pub estimated_cost_usd: f64,
    pub messages: Vec<MessageDigest>,
}

impl AnalysisReport {
    pub fn tools_used_label(&self) -> String {
        format!("{}/{}", self.tool_count, self.tools_available)
    }

    pub fn cost_label(&self) -> String {
        format!("${:.4}", self.estimated_cost_usd)
    }
}

/// Turns claim text into an [`AnalysisReport`] using a shared agent.
pub struct ClaimAnalyzer {
    agent: Agent,
}

impl ClaimAnalyzer {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub fn model_name(&self) -> &str {
        self.agent.model_name()
    }

    /// Analyze one claim. Agent failures are returned as errors, not retried.
    #[instrument(skip(self, claim_text), fields(chars = claim_text.len()))]
    pub async fn analyze(&self, claim_text: &str) -> Result<AnalysisReport> {
        if claim_text.trim().is_empty() {
            return Err(ClaimscopeError::InvalidInput(
                "Please enter claim details".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Analyzing claim (request {})", request_id);

        let transcript = self.agent.run(claim_text).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let replay = TranscriptReplay::from_messages(&transcript);
        if replay.no_tools_used {
            warn!("Agent finished without calling any tools");
        }

        let tool_count = replay.tool_count();
        info!("Analysis finished in {}ms using {} tool(s)", elapsed_ms, tool_count);

        Ok(AnalysisReport {
            request_id,
            started_at,
            model: self.model_name().to_string(),
            tool_count,
            tools_available: tool_specs().len(),
            estimated_cost_usd: tool_count as f64 * COST_PER_TOOL_USD,
            messages: transcript.iter().map(MessageDigest::from_message).collect(),
            calls: replay.calls,
            final_answer: replay.final_answer,
            thoughts: replay.thoughts,
            no_tools_used: replay.no_tools_used,
            elapsed_ms,
        })
    }
}

/// Build the production analyzer and the client it talks through.
pub fn build_analyzer(settings: &Settings) -> Result<(ClaimAnalyzer, Arc<WorkspaceClient>)> {
    let workspace = Arc::new(WorkspaceClient::from_settings(&settings.workspace)?);

    let functions = RemoteFunctions::new(workspace.clone(), settings.catalog.clone());
    let search = FraudPatternSearch::new(
        workspace.clone(),
        &settings.vector_index(),
        settings.search.num_results,
    );

    let client = create_client(
        &serving_base_url(workspace.base_url())?,
        workspace.token(),
        Duration::from_secs(settings.agent.request_timeout_secs),
    )?;
    let model = Arc::new(ServingEndpointModel::new(client, &settings.agent));

    let prompts = Prompts::load(settings.agent.prompts_dir.as_deref())?;
    let agent = Agent::new(model, ToolContext::new(functions, search))
        .with_prompts(prompts)
        .with_max_iterations(settings.agent.max_iterations);

    Ok((ClaimAnalyzer::new(agent), workspace))
}

/// Process-wide services, built once at startup and shared read-only.
///
/// A construction failure is kept and reported on every request until restart.
pub struct Services {
    analyzer: std::result::Result<Arc<ClaimAnalyzer>, String>,
    status: ConnectionStatus,
}

impl Services {
    pub async fn initialize(settings: &Settings) -> Self {
        match build_analyzer(settings) {
            Ok((analyzer, workspace)) => {
                let status = workspace.check_connection().await;
                if !status.is_connected() {
                    warn!("Workspace not reachable: {}", status.detail());
                }
                Self {
                    analyzer: Ok(Arc::new(analyzer)),
                    status,
                }
            }
            Err(e) => {
                warn!("Failed to initialize analyzer: {}", e);
                Self {
                    status: ConnectionStatus::Disconnected(e.to_string()),
                    analyzer: Err(e.to_string()),
                }
            }
        }
    }

    /// Services around an already built analyzer.
    pub fn from_parts(analyzer: Arc<ClaimAnalyzer>, status: ConnectionStatus) -> Self {
        Self {
            analyzer: Ok(analyzer),
            status,
        }
    }

    /// Services that failed to build, with the reason.
    pub fn failed(reason: &str) -> Self {
        Self {
            analyzer: Err(reason.to_string()),
            status: ConnectionStatus::Disconnected(reason.to_string()),
        }
    }

    pub fn analyzer(&self) -> Result<Arc<ClaimAnalyzer>> {
        self.analyzer.clone().map_err(|e| {
            ClaimscopeError::Agent(format!("Error creating agent: {}", e))
        })
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }
}
