//! Client for the hosting workspace's REST APIs.
//!
//! The rest of the crate talks to the workspace through two narrow traits,
//! [`StatementExecutor`] and [`VectorIndexClient`], so the invokers can be
//! exercised against scripted implementations.

mod statement;

pub use statement::{
    ServiceError, StatementRequest, StatementResponse, StatementResult, StatementState,
    StatementStatus,
};

use crate::config::WorkspaceSettings;
use crate::error::{ClaimscopeError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const STATEMENTS_PATH: &str = "api/2.0/sql/statements";
const CURRENT_USER_PATH: &str = "api/2.0/preview/scim/v2/Me";

/// Executes SQL statements on a warehouse and waits for the outcome.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(&self, statement: &str) -> Result<StatementResponse>;
}

/// Issues similarity queries against a named vector index.
#[async_trait]
pub trait VectorIndexClient: Send + Sync {
    /// Query `index_name` and return the decoded response body.
    ///
    /// Bodies carrying an `error_code` are returned as `Ok` so callers can
    /// report the service's own message.
    async fn query_index(&self, index_name: &str, body: &Value) -> Result<Value>;
}

/// Outcome of the workspace connectivity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected(String),
    Disconnected(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected(_) => "Connected",
            ConnectionStatus::Disconnected(_) => "Not connected to workspace",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ConnectionStatus::Connected(d) | ConnectionStatus::Disconnected(d) => d,
        }
    }
}

/// Authenticated HTTP client for one workspace.
#[derive(Clone)]
pub struct WorkspaceClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    warehouse_id: String,
    statement_wait_secs: u32,
}

impl std::fmt::Debug for WorkspaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceClient")
            .field("base", &self.base.as_str())
            .field("warehouse_id", &self.warehouse_id)
            .finish_non_exhaustive()
    }
}

impl WorkspaceClient {
    /// Build a client from settings. Fails when host or token are missing.
    pub fn from_settings(settings: &WorkspaceSettings) -> Result<Self> {
        let host = settings
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ClaimscopeError::Config("DATABRICKS_HOST is not set".to_string()))?;
        let token = settings
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClaimscopeError::Config("DATABRICKS_TOKEN is not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base: normalize_host(host)?,
            token,
            warehouse_id: settings.warehouse_id.clone(),
            // The API rejects waits above 50 seconds.
            statement_wait_secs: settings.statement_wait_secs.clamp(5, 50),
        })
    }

    /// Workspace base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn warehouse_id(&self) -> &str {
        &self.warehouse_id
    }

    /// Check that the workspace is reachable and the token is accepted.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let url = match self.base.join(CURRENT_USER_PATH) {
            Ok(url) => url,
            Err(e) => return ConnectionStatus::Disconnected(e.to_string()),
        };

        match self.http.get(url).bearer_auth(&self.token).send().await {
            Ok(resp) if resp.status().is_success() => {
                ConnectionStatus::Connected(self.base.host_str().unwrap_or_default().to_string())
            }
            Ok(resp) => ConnectionStatus::Disconnected(format!(
                "workspace answered with HTTP {}",
                resp.status()
            )),
            Err(e) => ConnectionStatus::Disconnected(e.to_string()),
        }
    }

    /// POST a JSON body and decode the JSON reply along with its status code.
    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(u16, Value)> {
        let url = self.base.join(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(transport_error)?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }
}

#[async_trait]
impl StatementExecutor for WorkspaceClient {
    #[instrument(skip(self, statement), fields(warehouse = %self.warehouse_id))]
    async fn execute_statement(&self, statement: &str) -> Result<StatementResponse> {
        let request =
            StatementRequest::inline(&self.warehouse_id, statement, self.statement_wait_secs);
        let (status, body) = self.post_json(STATEMENTS_PATH, &request).await?;

        if !(200..300).contains(&status) {
            return Err(ClaimscopeError::WorkspaceApi {
                status,
                message: api_error_message(&body),
            });
        }

        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl VectorIndexClient for WorkspaceClient {
    #[instrument(skip(self, body))]
    async fn query_index(&self, index_name: &str, body: &Value) -> Result<Value> {
        let path = format!("api/2.0/vector-search/indexes/{}/query", index_name);
        let (status, reply) = self.post_json(&path, body).await?;

        if (200..300).contains(&status) || reply.get("error_code").is_some() {
            Ok(reply)
        } else {
            Err(ClaimscopeError::WorkspaceApi {
                status,
                message: api_error_message(&reply),
            })
        }
    }
}

/// Parse a host, adding `https://` when no scheme is given.
pub fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    Ok(Url::parse(&format!("{}/", with_scheme))?)
}

/// Unreachable hosts and timeouts are connection failures; anything else stays an HTTP error.
fn transport_error(err: reqwest::Error) -> ClaimscopeError {
    if err.is_connect() || err.is_timeout() {
        ClaimscopeError::Connection(err.to_string())
    } else {
        ClaimscopeError::Http(err)
    }
}

fn api_error_message(body: &Value) -> String {
    match body {
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
