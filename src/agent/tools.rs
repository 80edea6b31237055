//! Tool definitions and adapters for the fraud analysis agent.
//!
//! Each tool wraps one remote capability and always answers with JSON text:
//! either the capability's result or an `{"error": ...}` payload.

use crate::error::{ClaimscopeError, Result};
use crate::remote::{unavailable, FraudPatternSearch, RemoteFunctions};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

pub const CLASSIFY_TOOL: &str = "classify_claim";
pub const EXTRACT_TOOL: &str = "extract_indicators";
pub const SEARCH_TOOL: &str = "search_fraud_patterns";
pub const EXPLAIN_TOOL: &str = "generate_explanation";

/// Available tools for the agent, with their decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum FraudTool {
    /// Classify a claim as fraudulent or legitimate.
    ClassifyClaim { claim_text: String },

    /// Extract structured fraud indicators.
    ExtractIndicators { claim_text: String },

    /// Search the fraud-pattern knowledge base.
    SearchFraudPatterns { query: String },

    /// Explain the classification with findings and recommendations.
    GenerateExplanation {
        claim_text: String,
        is_fraudulent: bool,
        fraud_type: String,
    },
}

impl FraudTool {
    pub fn name(&self) -> &'static str {
        match self {
            FraudTool::ClassifyClaim { .. } => CLASSIFY_TOOL,
            FraudTool::ExtractIndicators { .. } => EXTRACT_TOOL,
            FraudTool::SearchFraudPatterns { .. } => SEARCH_TOOL,
            FraudTool::GenerateExplanation { .. } => EXPLAIN_TOOL,
        }
    }
}

/// JSON-schema type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
}

impl ParamKind {
    fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One declared input of a tool.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl ToolParam {
    fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
        }
    }
}

/// Registration record for one tool: name, description and typed inputs.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ToolParam>,
}

impl ToolSpec {
    /// JSON schema of the tool's arguments.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut prop = json!({
                "type": param.kind.schema_type(),
                "description": param.description,
            });
            if let Some(default) = &param.default {
                prop["default"] = default.clone();
            }
            properties.insert(param.name.to_string(), prop);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// The four tools exposed to the agent.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: CLASSIFY_TOOL,
            description: "Classifies a healthcare claim as fraudulent or legitimate. \
                Use this FIRST to understand fraud risk. Returns JSON with is_fraudulent, \
                fraud_probability, fraud_type, confidence.",
            params: vec![ToolParam::required(
                "claim_text",
                ParamKind::String,
                "The insurance claim text to classify for fraud",
            )],
        },
        ToolSpec {
            name: EXTRACT_TOOL,
            description: "Extracts fraud indicators from claim including risk score, red flags, \
                anomaly indicators, urgency level, and financial impact. Use after classification \
                to get detailed analysis. Returns JSON with structured indicators.",
            params: vec![ToolParam::required(
                "claim_text",
                ParamKind::String,
                "The claim text to extract fraud indicators from",
            )],
        },
        ToolSpec {
            name: SEARCH_TOOL,
            description: "Searches the fraud knowledge base for relevant patterns, schemes, and \
                documentation using semantic search. Use to find similar fraud cases or detection \
                techniques. Returns JSON array with doc_id, doc_type, title, content for top matches.",
            params: vec![ToolParam::required(
                "query",
                ParamKind::String,
                "The search query to find relevant fraud patterns",
            )],
        },
        ToolSpec {
            name: EXPLAIN_TOOL,
            description: "Generates comprehensive fraud explanation with summary, risk factors, \
                recommendations. REQUIRES results from classify_claim first. Pass claim_text, \
                is_fraudulent (true/false), and fraud_type from classification. Returns JSON with \
                detailed explanation.",
            params: vec![
                ToolParam::required("claim_text", ParamKind::String, "The claim text to explain"),
                ToolParam::required(
                    "is_fraudulent",
                    ParamKind::Boolean,
                    "Whether the claim is fraudulent (from classification)",
                ),
                ToolParam {
                    name: "fraud_type",
                    kind: ParamKind::String,
                    description: "Type of fraud detected (from classification)",
                    required: false,
                    default: Some(json!("none")),
                },
            ],
        },
    ]
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    tool_specs()
        .into_iter()
        .map(|spec| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                parameters: Some(spec.parameters_schema()),
                strict: None,
            },
        })
        .collect()
}

fn string_arg(args: &Value, tool: &str, key: &str) -> Result<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClaimscopeError::Agent(format!("{}: missing '{}' argument", tool, key)))
}

fn bool_arg(args: &Value, tool: &str, key: &str) -> Result<bool> {
    match args.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        // Some endpoints stringify booleans in tool arguments
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ClaimscopeError::Agent(format!(
            "{}: missing or non-boolean '{}' argument",
            tool, key
        ))),
    }
}

/// Parse a tool call from its name and decoded arguments.
pub fn parse_tool_call(name: &str, args: &Value) -> Result<FraudTool> {
    if !args.is_object() {
        return Err(ClaimscopeError::Agent(format!(
            "{}: arguments must be a JSON object",
            name
        )));
    }

    match name {
        CLASSIFY_TOOL => Ok(FraudTool::ClassifyClaim {
            claim_text: string_arg(args, name, "claim_text")?,
        }),
        EXTRACT_TOOL => Ok(FraudTool::ExtractIndicators {
            claim_text: string_arg(args, name, "claim_text")?,
        }),
        SEARCH_TOOL => Ok(FraudTool::SearchFraudPatterns {
            query: string_arg(args, name, "query")?,
        }),
        EXPLAIN_TOOL => Ok(FraudTool::GenerateExplanation {
            claim_text: string_arg(args, name, "claim_text")?,
            is_fraudulent: bool_arg(args, name, "is_fraudulent")?,
            fraud_type: args
                .get("fraud_type")
                .and_then(Value::as_str)
                .unwrap_or("none")
                .to_string(),
        }),
        _ => Err(ClaimscopeError::Agent(format!("Unknown tool: {}", name))),
    }
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Empty strings, objects and arrays count as no result.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Tool execution context backed by the remote invokers.
#[derive(Clone)]
pub struct ToolContext {
    functions: RemoteFunctions,
    search: FraudPatternSearch,
}

impl ToolContext {
    pub fn new(functions: RemoteFunctions, search: FraudPatternSearch) -> Self {
        Self { functions, search }
    }

    /// Execute a parsed tool and return its JSON text.
    pub async fn execute(&self, tool: &FraudTool) -> String {
        debug!("Executing {}", tool.name());
        let value = match tool {
            FraudTool::ClassifyClaim { claim_text } => self
                .functions
                .classify(claim_text)
                .await
                .filter(has_content)
                .unwrap_or_else(|| unavailable("Classification failed")),
            FraudTool::ExtractIndicators { claim_text } => self
                .functions
                .extract_indicators(claim_text)
                .await
                .filter(has_content)
                .unwrap_or_else(|| unavailable("Extraction failed")),
            FraudTool::SearchFraudPatterns { query } => {
                let outcome = self.search.search(query).await;
                if outcome.is_failed() {
                    debug!("Search returned an error payload");
                }
                serde_json::to_value(&outcome)
                    .unwrap_or_else(|e| unavailable(&format!("Search failed: {}", e)))
            }
            FraudTool::GenerateExplanation {
                claim_text,
                is_fraudulent,
                fraud_type,
            } => self
                .functions
                .explain(claim_text, *is_fraudulent, fraud_type)
                .await
                .filter(has_content)
                .unwrap_or_else(|| unavailable("Explanation generation failed")),
        };

        to_pretty_json(&value)
    }

    /// Parse and execute a call by name. Invalid calls yield an error payload.
    pub async fn dispatch(&self, name: &str, args: &Value) -> String {
        info!("Agent calling tool: {} with args: {}", name, args);

        match parse_tool_call(name, args) {
            Ok(tool) => self.execute(&tool).await,
            Err(e) => to_pretty_json(&unavailable(&e.to_string())),
        }
    }
}
