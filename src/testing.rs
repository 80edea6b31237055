//! Scripted stand-ins for the model endpoint and the workspace, shared by unit tests.

use crate::agent::{ChatModel, ModelTurn, ToolCallRequest, TranscriptMessage};
use crate::error::{ClaimscopeError, Result};
use crate::workspace::{StatementExecutor, StatementResponse, VectorIndexClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Model that replays scripted turns and records the message count it was sent.
pub struct ScriptedModel {
    turns: Mutex<VecDeque<Result<ModelTurn>>>,
    pub seen: Mutex<Vec<usize>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<Result<ModelTurn>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[TranscriptMessage]) -> Result<ModelTurn> {
        self.seen.lock().unwrap().push(messages.len());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| answer_turn("done"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn call_turn(calls: &[(&str, &str, Value)]) -> Result<ModelTurn> {
    Ok(ModelTurn {
        content: None,
        tool_calls: calls
            .iter()
            .map(|(id, name, args)| ToolCallRequest::new(id, name, args.clone()))
            .collect(),
    })
}

pub fn answer_turn(text: &str) -> Result<ModelTurn> {
    Ok(ModelTurn {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
    })
}

/// Workspace answering each fraud function and the index with fixed payloads.
pub struct ScriptedWorkspace {
    pub statements: Mutex<Vec<String>>,
    pub offline: bool,
}

impl ScriptedWorkspace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            statements: Mutex::new(Vec::new()),
            offline: false,
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            statements: Mutex::new(Vec::new()),
            offline: true,
        })
    }
}

#[async_trait]
impl StatementExecutor for ScriptedWorkspace {
    async fn execute_statement(&self, statement: &str) -> Result<StatementResponse> {
        self.statements.lock().unwrap().push(statement.to_string());
        if self.offline {
            return Err(ClaimscopeError::Connection("workspace offline".into()));
        }

        let payload = if statement.contains("fraud_classify(") {
            json!({"is_fraudulent": false, "fraud_probability": 0.04, "fraud_type": "none", "confidence": 0.95})
                .to_string()
        } else if statement.contains("fraud_extract_indicators(") {
            json!({"risk_score": 1, "red_flags": [], "urgency": "low", "financial_impact": 185})
                .to_string()
        } else {
            json!(["Routine wellness visit consistent with history.", ["Codes align"], ["Approve payment"]])
                .to_string()
        };
        Ok(StatementResponse::succeeded(Value::String(payload)))
    }
}

#[async_trait]
impl VectorIndexClient for ScriptedWorkspace {
    async fn query_index(&self, _index_name: &str, _body: &Value) -> Result<Value> {
        if self.offline {
            return Err(ClaimscopeError::Connection("workspace offline".into()));
        }
        Ok(json!({
            "result": {"data_array": [
                ["FP-010", "guideline", "Preventive care billing", "Annual wellness visits are billed once per year.", 0.82]
            ]}
        }))
    }
}
