//! Fraud-triage agent with tool calling.
//!
//! Provides an LLM agent that investigates a claim by calling the
//! classify / extract / search / explain tools until it can give a
//! final assessment. The whole transcript of the run is returned.

mod runner;
mod tools;
mod transcript;

pub use runner::{Agent, ChatModel, ModelTurn, ServingEndpointModel};
pub use tools::{
    parse_tool_call, tool_definitions, tool_specs, FraudTool, ParamKind, ToolContext, ToolParam,
    ToolSpec, CLASSIFY_TOOL, EXPLAIN_TOOL, EXTRACT_TOOL, SEARCH_TOOL,
};
pub use transcript::{ToolCallRequest, Transcript, TranscriptMessage};
