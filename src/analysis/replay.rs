//! Replay of an agent transcript into tool-call records for display.

use crate::agent::TranscriptMessage;
use crate::remote::truncate_chars;
use serde::Serialize;
use serde_json::Value;

/// Maximum characters shown for a tool result that is not JSON.
pub const RESULT_PREVIEW_CHARS: usize = 500;

/// Maximum characters of message content kept in a digest.
pub const DIGEST_CONTENT_CHARS: usize = 200;

/// One tool call as shown to the user, with its result once seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayedCall {
    pub name: String,
    pub call_id: String,
    pub arguments: Value,
    pub result: Option<String>,
}

impl ReplayedCall {
    pub fn category(&self) -> ToolCategory {
        ToolCategory::from_name(&self.name)
    }

    /// Result text for display: pretty JSON when it parses, otherwise a preview.
    pub fn result_display(&self) -> String {
        match &self.result {
            Some(text) => display_result(text),
            None => "No result".to_string(),
        }
    }
}

/// Display grouping of a tool, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Classify,
    Extract,
    Search,
    Explain,
}

impl ToolCategory {
    /// Anything that is not classify, extract or search counts as explain.
    pub fn from_name(name: &str) -> Self {
        if name.contains("classify") {
            ToolCategory::Classify
        } else if name.contains("extract") {
            ToolCategory::Extract
        } else if name.contains("search") {
            ToolCategory::Search
        } else {
            ToolCategory::Explain
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToolCategory::Classify => "🎯",
            ToolCategory::Extract => "📊",
            ToolCategory::Search => "🔍",
            ToolCategory::Explain => "💡",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolCategory::Classify => "classify",
            ToolCategory::Extract => "extract",
            ToolCategory::Search => "search",
            ToolCategory::Explain => "explain",
        }
    }
}

/// Pretty-print `text` if it is JSON, else cap it at [`RESULT_PREVIEW_CHARS`].
pub fn display_result(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => {
            if text.chars().count() > RESULT_PREVIEW_CHARS {
                format!("{}...", truncate_chars(text, RESULT_PREVIEW_CHARS))
            } else {
                text.to_string()
            }
        }
    }
}

/// Short debugging view of one transcript message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDigest {
    pub kind: String,
    pub content: String,
    pub tool_calls: usize,
}

impl MessageDigest {
    pub fn from_message(message: &TranscriptMessage) -> Self {
        Self {
            kind: message.kind().to_string(),
            content: truncate_chars(message.content().unwrap_or("N/A"), DIGEST_CONTENT_CHARS),
            tool_calls: message.tool_call_count(),
        }
    }
}

/// Tool calls, final answer and intermediate thoughts recovered from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptReplay {
    pub calls: Vec<ReplayedCall>,
    pub final_answer: Option<String>,
    pub thoughts: Vec<String>,
    pub no_tools_used: bool,
}

impl TranscriptReplay {
    /// Walk the transcript once, pairing each tool result with its call.
    ///
    /// A result goes to the pending call with the same id, or failing that to
    /// the first call of the same name that has no result yet. Results that
    /// match nothing are dropped.
    pub fn from_messages(messages: &[TranscriptMessage]) -> Self {
        let mut replay = TranscriptReplay::default();

        for message in messages {
            match message {
                TranscriptMessage::Assistant {
                    content,
                    tool_calls,
                } if !tool_calls.is_empty() => {
                    replay.calls.extend(tool_calls.iter().map(|call| ReplayedCall {
                        name: call.name.clone(),
                        call_id: call.id.clone(),
                        arguments: call.arguments.clone(),
                        result: None,
                    }));
                    // Text alongside tool calls is reasoning, not an answer
                    if let Some(text) = content.as_deref().filter(|t| !t.trim().is_empty()) {
                        replay.thoughts.push(text.to_string());
                    }
                }
                TranscriptMessage::Assistant { content, .. } => {
                    if let Some(text) = content.as_deref().filter(|t| !t.trim().is_empty()) {
                        if replay.final_answer.is_none() {
                            replay.final_answer = Some(text.to_string());
                        } else {
                            replay.thoughts.push(text.to_string());
                        }
                    }
                }
                TranscriptMessage::Tool {
                    tool_call_id,
                    name,
                    content,
                } => replay.attach_result(tool_call_id, name, content),
                TranscriptMessage::System { .. } | TranscriptMessage::User { .. } => {}
            }
        }

        replay.no_tools_used = replay.calls.is_empty();
        replay
    }

    fn attach_result(&mut self, call_id: &str, name: &str, content: &str) {
        let by_id = self
            .calls
            .iter()
            .position(|c| c.result.is_none() && !call_id.is_empty() && c.call_id == call_id);
        let target = by_id.or_else(|| {
            self.calls
                .iter()
                .position(|c| c.result.is_none() && c.name == name)
        });

        if let Some(call) = target.and_then(|idx| self.calls.get_mut(idx)) {
            call.result = Some(content.to_string());
        }
    }

    pub fn tool_count(&self) -> usize {
        self.calls.len()
    }
}
