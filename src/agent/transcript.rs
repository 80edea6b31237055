//! Message model for one agent invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call id assigned by the model endpoint.
    pub id: String,
    pub name: String,
    /// Decoded JSON arguments. Undecodable argument text is kept as a string.
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: &str, name: &str, arguments: Value) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    /// Decode raw argument text as sent by the endpoint.
    pub fn from_raw(id: &str, name: &str, raw_arguments: &str) -> Self {
        let arguments = if raw_arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(raw_arguments)
                .unwrap_or_else(|_| Value::String(raw_arguments.to_string()))
        };
        Self::new(id, name, arguments)
    }
}

/// One message of the ordered transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TranscriptMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl TranscriptMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptMessage::System { .. } => "system",
            TranscriptMessage::User { .. } => "user",
            TranscriptMessage::Assistant { .. } => "assistant",
            TranscriptMessage::Tool { .. } => "tool",
        }
    }

    /// Text content, if the message carries any.
    pub fn content(&self) -> Option<&str> {
        match self {
            TranscriptMessage::System { content }
            | TranscriptMessage::User { content }
            | TranscriptMessage::Tool { content, .. } => Some(content),
            TranscriptMessage::Assistant { content, .. } => content.as_deref(),
        }
    }

    pub fn tool_call_count(&self) -> usize {
        match self {
            TranscriptMessage::Assistant { tool_calls, .. } => tool_calls.len(),
            _ => 0,
        }
    }
}

/// Ordered messages produced by one agent run.
pub type Transcript = Vec<TranscriptMessage>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_arguments() {
        let call = ToolCallRequest::from_raw("c1", "classify_claim", r#"{"claim_text": "x"}"#);
        assert_eq!(call.arguments["claim_text"], "x");

        let call = ToolCallRequest::from_raw("c2", "classify_claim", "not json");
        assert_eq!(call.arguments, json!("not json"));

        let call = ToolCallRequest::from_raw("c3", "classify_claim", "");
        assert_eq!(call.arguments, json!({}));
    }

    #[test]
    fn test_message_serialization() {
        let msg = TranscriptMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCallRequest::new("c1", "search_fraud_patterns", json!({"query": "q"}))],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["tool_calls"][0]["name"], "search_fraud_patterns");
        assert!(value.get("content").is_none());
        assert_eq!(msg.tool_call_count(), 1);
        assert_eq!(msg.content(), None);
    }
}
