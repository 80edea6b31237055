//! Wire types for the SQL statement execution API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/2.0/sql/statements`.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest<'a> {
    pub warehouse_id: &'a str,
    pub statement: &'a str,
    pub wait_timeout: String,
    pub on_wait_timeout: &'static str,
    pub format: &'static str,
    pub disposition: &'static str,
}

impl<'a> StatementRequest<'a> {
    /// Synchronous inline request that cancels if the wait elapses.
    pub fn inline(warehouse_id: &'a str, statement: &'a str, wait_secs: u32) -> Self {
        Self {
            warehouse_id,
            statement,
            wait_timeout: format!("{}s", wait_secs),
            on_wait_timeout: "CANCEL",
            format: "JSON_ARRAY",
            disposition: "INLINE",
        }
    }
}

/// Lifecycle state of a submitted statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for StatementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatementState::Pending => "PENDING",
            StatementState::Running => "RUNNING",
            StatementState::Succeeded => "SUCCEEDED",
            StatementState::Failed => "FAILED",
            StatementState::Canceled => "CANCELED",
            StatementState::Closed => "CLOSED",
            StatementState::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Error detail attached to a failed statement or API call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementStatus {
    #[serde(default)]
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub data_array: Option<Vec<Vec<Value>>>,
}

/// Response of a statement submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: Option<String>,
    #[serde(default)]
    pub status: StatementStatus,
    #[serde(default)]
    pub result: Option<StatementResult>,
}

impl StatementResponse {
    pub fn is_success(&self) -> bool {
        self.status.state == StatementState::Succeeded
    }

    /// First column of the first row, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.result
            .as_ref()?
            .data_array
            .as_ref()?
            .first()?
            .first()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error.as_ref()?.message.as_deref()
    }
}

#[cfg(test)]
impl StatementResponse {
    /// Completed response holding a single-cell result.
    pub(crate) fn succeeded(value: Value) -> Self {
        Self {
            statement_id: None,
            status: StatementStatus {
                state: StatementState::Succeeded,
                error: None,
            },
            result: Some(StatementResult {
                data_array: Some(vec![vec![value]]),
            }),
        }
    }

    /// Response in a given state with no rows.
    pub(crate) fn with_state(state: StatementState, message: Option<&str>) -> Self {
        Self {
            statement_id: None,
            status: StatementStatus {
                state,
                error: message.map(|m| ServiceError {
                    error_code: None,
                    message: Some(m.to_string()),
                }),
            },
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = StatementRequest::inline("wh-1", "SELECT 1", 50);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["wait_timeout"], "50s");
        assert_eq!(json["warehouse_id"], "wh-1");
        assert_eq!(json["format"], "JSON_ARRAY");
    }

    #[test]
    fn test_parse_succeeded_response() {
        let body = r#"{
            "statement_id": "01ef",
            "status": {"state": "SUCCEEDED"},
            "manifest": {"schema": {"column_count": 1}},
            "result": {"chunk_index": 0, "data_array": [["{\"is_fraudulent\": false}"]]}
        }"#;
        let resp: StatementResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_success());
        assert_eq!(
            resp.first_value().and_then(|v| v.as_str()),
            Some("{\"is_fraudulent\": false}")
        );
    }

    #[test]
    fn test_parse_failed_response() {
        let body = r#"{
            "status": {"state": "FAILED", "error": {"error_code": "BAD_REQUEST", "message": "function not found"}}
        }"#;
        let resp: StatementResponse = serde_json::from_str(body).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.status.state, StatementState::Failed);
        assert_eq!(resp.error_message(), Some("function not found"));
        assert!(resp.first_value().is_none());
    }

    #[test]
    fn test_unknown_state() {
        let resp: StatementResponse =
            serde_json::from_str(r#"{"status": {"state": "SOMETHING_NEW"}}"#).unwrap();
        assert_eq!(resp.status.state, StatementState::Unknown);
    }
}
