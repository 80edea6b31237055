//! Agent runner with tool calling loop.

use super::tools::{tool_definitions, ToolContext};
use super::transcript::{ToolCallRequest, Transcript, TranscriptMessage};
use crate::config::{AgentSettings, Prompts};
use crate::error::{ClaimscopeError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
};
use async_openai::Client;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One model reply: optional text plus any requested tool calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// A chat model with the agent's tools already bound.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce the next turn for the conversation so far.
    async fn complete(&self, messages: &[TranscriptMessage]) -> Result<ModelTurn>;

    /// Endpoint or model name, for display.
    fn name(&self) -> &str;
}

/// Chat model served by an OpenAI-compatible serving endpoint.
pub struct ServingEndpointModel {
    client: Client<OpenAIConfig>,
    endpoint: String,
    temperature: f32,
    max_tokens: u32,
    tools: Vec<ChatCompletionTool>,
}

impl ServingEndpointModel {
    /// Bind the fraud tools to `settings.llm_endpoint`.
    pub fn new(client: Client<OpenAIConfig>, settings: &AgentSettings) -> Self {
        Self {
            client,
            endpoint: settings.llm_endpoint.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            tools: tool_definitions(),
        }
    }
}

fn agent_err<E: std::fmt::Display>(e: E) -> ClaimscopeError {
    ClaimscopeError::Agent(e.to_string())
}

fn arguments_text(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Convert a transcript message into the endpoint's request format.
fn to_request_message(message: &TranscriptMessage) -> Result<ChatCompletionRequestMessage> {
    let msg = match message {
        TranscriptMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into(),
        TranscriptMessage::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into(),
        TranscriptMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                args.content(text.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: arguments_text(&call.arguments),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build().map_err(agent_err)?.into()
        }
        TranscriptMessage::Tool {
            tool_call_id,
            content,
            ..
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.clone())
            .content(content.clone())
            .build()
            .map_err(agent_err)?
            .into(),
    };
    Ok(msg)
}

#[async_trait]
impl ChatModel for ServingEndpointModel {
    #[allow(deprecated)]
    async fn complete(&self, messages: &[TranscriptMessage]) -> Result<ModelTurn> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.endpoint)
            .messages(messages)
            .tools(self.tools.clone())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(agent_err)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ClaimscopeError::OpenAI(format!("Agent API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClaimscopeError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest::from_raw(&tc.id, &tc.function.name, &tc.function.arguments))
            .collect();

        Ok(ModelTurn {
            content: choice.message.content.filter(|c| !c.trim().is_empty()),
            tool_calls,
        })
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

/// Agent that analyzes one claim at a time using the fraud tools.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    prompts: Prompts,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent with the given model and tool context.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolContext) -> Self {
        Self {
            model,
            tools,
            prompts: Prompts::default(),
            max_iterations: 10,
        }
    }

    /// Use custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set maximum model turns for one run.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run the agent over one claim and return the full transcript.
    ///
    /// Tools are executed one at a time in the order the model requests them.
    /// The run ends at the first model turn without tool calls.
    #[instrument(skip(self, claim_text), fields(model = %self.model.name()))]
    pub async fn run(&self, claim_text: &str) -> Result<Transcript> {
        let mut messages: Transcript = vec![
            TranscriptMessage::System {
                content: self.prompts.agent.system.clone(),
            },
            TranscriptMessage::User {
                content: self.prompts.user_message(claim_text),
            },
        ];

        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ClaimscopeError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let turn = self.model.complete(&messages).await?;

            if turn.tool_calls.is_empty() {
                messages.push(TranscriptMessage::Assistant {
                    content: turn.content,
                    tool_calls: Vec::new(),
                });
                info!("Agent finished after {} iteration(s)", iterations);
                return Ok(messages);
            }

            let calls = turn.tool_calls.clone();
            messages.push(TranscriptMessage::Assistant {
                content: turn.content,
                tool_calls: turn.tool_calls,
            });

            for call in calls {
                let result = self.tools.dispatch(&call.name, &call.arguments).await;
                messages.push(TranscriptMessage::Tool {
                    tool_call_id: call.id,
                    name: call.name,
                    content: result,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tools::{CLASSIFY_TOOL, SEARCH_TOOL};
    use crate::config::CatalogSettings;
    use crate::remote::{FraudPatternSearch, RemoteFunctions};
    use crate::testing::{answer_turn, call_turn, ScriptedModel};
    use crate::workspace::{StatementExecutor, StatementResponse, VectorIndexClient};
    use serde_json::json;

    struct EchoWorkspace;

    #[async_trait]
    impl StatementExecutor for EchoWorkspace {
        async fn execute_statement(&self, _statement: &str) -> Result<StatementResponse> {
            Ok(StatementResponse::succeeded(json!({"is_fraudulent": false})))
        }
    }

    #[async_trait]
    impl VectorIndexClient for EchoWorkspace {
        async fn query_index(&self, _index: &str, _body: &Value) -> Result<Value> {
            Ok(json!({"result": {"data_array": []}}))
        }
    }

    fn tools() -> ToolContext {
        let ws = Arc::new(EchoWorkspace);
        ToolContext::new(
            RemoteFunctions::new(ws.clone(), CatalogSettings::default()),
            FraudPatternSearch::new(ws, "c.s.i", 3),
        )
    }

    #[tokio::test]
    async fn test_run_records_calls_and_results_in_order() {
        let model = ScriptedModel::new(vec![
            call_turn(&[
                ("c1", CLASSIFY_TOOL, json!({"claim_text": "x"})),
                ("c2", SEARCH_TOOL, json!({"query": "wellness visit"})),
            ]),
            answer_turn("Legitimate claim."),
        ]);
        let agent = Agent::new(model.clone(), tools());

        let transcript = agent.run("x").await.unwrap();
        let kinds: Vec<_> = transcript.iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec!["system", "user", "assistant", "tool", "tool", "assistant"]
        );
        match &transcript[3] {
            TranscriptMessage::Tool {
                tool_call_id,
                name,
                content,
            } => {
                assert_eq!(tool_call_id, "c1");
                assert_eq!(name, CLASSIFY_TOOL);
                assert!(content.contains("is_fraudulent"));
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(transcript[5].content(), Some("Legitimate claim."));
        // Second model call saw the tool results
        assert_eq!(*model.seen.lock().unwrap(), vec![2, 5]);
    }

    #[tokio::test]
    async fn test_model_failure_is_terminal() {
        let model = ScriptedModel::new(vec![Err(ClaimscopeError::OpenAI("503".into()))]);
        let agent = Agent::new(model, tools());
        let err = agent.run("x").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let looping: Vec<_> = (0..5)
            .map(|i| {
                let id = format!("c{}", i);
                call_turn(&[(id.as_str(), CLASSIFY_TOOL, json!({"claim_text": "x"}))])
            })
            .collect();
        let agent = Agent::new(ScriptedModel::new(looping), tools()).with_max_iterations(3);
        let err = agent.run("x").await.unwrap_err();
        assert!(err.to_string().contains("maximum iterations (3)"));
    }

    #[test]
    fn test_request_message_conversion() {
        let msg = TranscriptMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCallRequest::new("c1", CLASSIFY_TOOL, json!({"claim_text": "x"}))],
        };
        match to_request_message(&msg).unwrap() {
            ChatCompletionRequestMessage::Assistant(a) => {
                let calls = a.tool_calls.unwrap();
                assert_eq!(calls[0].function.name, CLASSIFY_TOOL);
                assert_eq!(calls[0].function.arguments, r#"{"claim_text":"x"}"#);
            }
            _ => panic!("Expected assistant message"),
        }
    }
}
