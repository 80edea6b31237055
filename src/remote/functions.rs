//! Invoker for the SQL-callable fraud functions.
//!
//! Every call is a single `SELECT <catalog>.<schema>.<fn>(...) AS result`
//! statement. Failures never escape this module: callers receive `None` and
//! must read it as "unavailable", not as a negative finding.

use crate::config::CatalogSettings;
use crate::workspace::StatementExecutor;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Claim classifier: `(claim_text) -> {is_fraudulent, fraud_probability, fraud_type, confidence}`.
pub const CLASSIFY_FUNCTION: &str = "fraud_classify";

/// Indicator extractor: `(claim_text) -> {risk_score, red_flags, ...}`.
pub const EXTRACT_FUNCTION: &str = "fraud_extract_indicators";

/// Explanation generator: `(claim_text, is_fraudulent, fraud_type) -> {summary, key_findings, recommendations}`.
pub const EXPLAIN_FUNCTION: &str = "fraud_generate_explanation";

/// A positional argument to a remote function.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl SqlArg {
    /// Render as a SQL literal. Text is single-quoted with embedded quotes doubled.
    /// NaN and infinities have no literal form and render as `NULL`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlArg::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlArg::Bool(b) => b.to_string(),
            SqlArg::Int(i) => i.to_string(),
            SqlArg::Float(f) if f.is_finite() => f.to_string(),
            SqlArg::Float(_) => "NULL".to_string(),
        }
    }
}

impl From<&str> for SqlArg {
    fn from(s: &str) -> Self {
        SqlArg::Text(s.to_string())
    }
}

impl From<String> for SqlArg {
    fn from(s: String) -> Self {
        SqlArg::Text(s)
    }
}

impl From<bool> for SqlArg {
    fn from(b: bool) -> Self {
        SqlArg::Bool(b)
    }
}

impl From<i64> for SqlArg {
    fn from(i: i64) -> Self {
        SqlArg::Int(i)
    }
}

impl From<f64> for SqlArg {
    fn from(f: f64) -> Self {
        SqlArg::Float(f)
    }
}

/// Build the statement for one function call.
pub fn build_query(catalog: &CatalogSettings, function: &str, args: &[SqlArg]) -> String {
    let args = args
        .iter()
        .map(SqlArg::to_sql_literal)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {}({}) AS result", catalog.qualify(function), args)
}

/// Normalize the scalar returned by a function call.
///
/// Text is JSON-decoded when possible. Positional arrays returned by the
/// explanation function are mapped to named fields. SQL `NULL` is absent.
pub fn unpack_result(function: &str, raw: &Value) -> Option<Value> {
    let value = match raw {
        Value::Null => return None,
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parsed,
            Err(_) => return Some(Value::String(text.clone())),
        },
        other => other.clone(),
    };

    match value {
        Value::Array(items) if function == EXPLAIN_FUNCTION => Some(map_explanation(&items)),
        Value::Null => None,
        other => Some(other),
    }
}

/// Map `[summary, key_findings, recommendations]` to named fields.
///
/// Missing or null list positions become empty lists.
pub fn map_explanation(items: &[Value]) -> Value {
    let list_at = |idx: usize| match items.get(idx) {
        Some(Value::Null) | None => Value::Array(Vec::new()),
        Some(v) => v.clone(),
    };

    let mut map = Map::new();
    map.insert(
        "summary".to_string(),
        items.first().cloned().unwrap_or(Value::Null),
    );
    map.insert("key_findings".to_string(), list_at(1));
    map.insert("recommendations".to_string(), list_at(2));
    Value::Object(map)
}

/// Calls the fraud functions through a statement executor.
#[derive(Clone)]
pub struct RemoteFunctions {
    executor: Arc<dyn StatementExecutor>,
    catalog: CatalogSettings,
}

impl RemoteFunctions {
    pub fn new(executor: Arc<dyn StatementExecutor>, catalog: CatalogSettings) -> Self {
        Self { executor, catalog }
    }

    /// Invoke `function` with positional arguments.
    #[instrument(skip(self, args), fields(args = args.len()))]
    pub async fn call(&self, function: &str, args: &[SqlArg]) -> Option<Value> {
        let query = build_query(&self.catalog, function, args);
        debug!("Executing {}(...)", function);

        let response = match self.executor.execute_statement(&query).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Error calling function {}: {}", function, e);
                return None;
            }
        };

        if !response.is_success() {
            warn!(
                "Function {} finished in state {}: {}",
                function,
                response.status.state,
                response.error_message().unwrap_or("no error detail")
            );
            return None;
        }

        match response.first_value() {
            Some(raw) => unpack_result(function, raw),
            None => {
                warn!("Function {} returned no rows", function);
                None
            }
        }
    }

    pub async fn classify(&self, claim_text: &str) -> Option<Value> {
        self.call(CLASSIFY_FUNCTION, &[claim_text.into()]).await
    }

    pub async fn extract_indicators(&self, claim_text: &str) -> Option<Value> {
        self.call(EXTRACT_FUNCTION, &[claim_text.into()]).await
    }

    pub async fn explain(
        &self,
        claim_text: &str,
        is_fraudulent: bool,
        fraud_type: &str,
    ) -> Option<Value> {
        self.call(
            EXPLAIN_FUNCTION,
            &[claim_text.into(), is_fraudulent.into(), fraud_type.into()],
        )
        .await
    }
}

/// Payload handed back to the agent when a function is unavailable.
pub fn unavailable(message: &str) -> Value {
    json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClaimscopeError, Result};
    use crate::workspace::{StatementResponse, StatementState};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Executor that replays one canned response and records statements.
    struct CannedExecutor {
        response: Mutex<Option<Result<StatementResponse>>>,
        seen: Mutex<Vec<String>>,
    }

    impl CannedExecutor {
        fn new(response: Result<StatementResponse>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StatementExecutor for CannedExecutor {
        async fn execute_statement(&self, statement: &str) -> Result<StatementResponse> {
            self.seen.lock().unwrap().push(statement.to_string());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ClaimscopeError::Agent("no response".into())))
        }
    }

    fn functions(executor: Arc<CannedExecutor>) -> RemoteFunctions {
        RemoteFunctions::new(executor, CatalogSettings::default())
    }

    #[test]
    fn test_quotes_are_doubled() {
        let query = build_query(
            &CatalogSettings::default(),
            CLASSIFY_FUNCTION,
            &["Member's claim for O'Brien".into()],
        );
        assert_eq!(
            query,
            "SELECT fraud_detection_dev.claims_analysis.fraud_classify('Member''s claim for O''Brien') AS result"
        );

        // The argument is still one literal: strip the outer quotes and every
        // remaining quote must come in pairs.
        let literal = SqlArg::from("a'b''c'").to_sql_literal();
        let inner = &literal[1..literal.len() - 1];
        assert!(literal.starts_with('\'') && literal.ends_with('\''));
        assert_eq!(inner.replace("''", ""), "abc");
    }

    #[test]
    fn test_non_text_args_unquoted() {
        let query = build_query(
            &CatalogSettings::default(),
            EXPLAIN_FUNCTION,
            &["claim".into(), true.into(), "upcoding".into()],
        );
        assert!(query.ends_with("fraud_generate_explanation('claim', true, 'upcoding') AS result"));
        assert_eq!(SqlArg::Int(42).to_sql_literal(), "42");
        assert_eq!(SqlArg::Float(0.5).to_sql_literal(), "0.5");
    }

    #[test]
    fn test_non_finite_float_renders_null() {
        assert_eq!(SqlArg::Float(f64::NAN).to_sql_literal(), "NULL");
        assert_eq!(SqlArg::from(f64::INFINITY).to_sql_literal(), "NULL");
        let query = build_query(
            &CatalogSettings::default(),
            CLASSIFY_FUNCTION,
            &[f64::NEG_INFINITY.into()],
        );
        assert!(query.ends_with("fraud_classify(NULL) AS result"));
    }

    #[test]
    fn test_unpack_json_text_and_raw_fallback() {
        let parsed = unpack_result(
            CLASSIFY_FUNCTION,
            &Value::String(r#"{"is_fraudulent": true, "fraud_type": "upcoding"}"#.into()),
        )
        .unwrap();
        assert_eq!(parsed["fraud_type"], "upcoding");

        let raw = unpack_result(CLASSIFY_FUNCTION, &Value::String("not json".into())).unwrap();
        assert_eq!(raw, Value::String("not json".into()));

        let obj = json!({"risk_score": 7});
        assert_eq!(unpack_result(EXTRACT_FUNCTION, &obj), Some(obj.clone()));
        assert_eq!(unpack_result(EXTRACT_FUNCTION, &Value::Null), None);
    }

    #[test]
    fn test_explanation_tuple_mapping() {
        let full = unpack_result(
            EXPLAIN_FUNCTION,
            &json!(["Looks fine", ["Codes align"], ["Approve"]]),
        )
        .unwrap();
        assert_eq!(full["summary"], "Looks fine");
        assert_eq!(full["key_findings"], json!(["Codes align"]));
        assert_eq!(full["recommendations"], json!(["Approve"]));

        let short = unpack_result(EXPLAIN_FUNCTION, &json!(["Only a summary"])).unwrap();
        assert_eq!(short["summary"], "Only a summary");
        assert_eq!(short["key_findings"], json!([]));
        assert_eq!(short["recommendations"], json!([]));

        let nulls = map_explanation(&[json!("s"), Value::Null]);
        assert_eq!(nulls["key_findings"], json!([]));

        // Arrays from other functions pass through unchanged
        let arr = json!([1, 2]);
        assert_eq!(unpack_result(CLASSIFY_FUNCTION, &arr), Some(arr.clone()));
    }

    #[test]
    fn test_explanation_tuple_encoded_as_text() {
        let value = unpack_result(
            EXPLAIN_FUNCTION,
            &Value::String(r#"["Summary", null, ["Deny"]]"#.into()),
        )
        .unwrap();
        assert_eq!(value["key_findings"], json!([]));
        assert_eq!(value["recommendations"], json!(["Deny"]));
    }

    #[tokio::test]
    async fn test_call_success() {
        let executor = CannedExecutor::new(Ok(StatementResponse::succeeded(Value::String(
            r#"{"is_fraudulent": false, "confidence": 0.93}"#.into(),
        ))));
        let result = functions(executor.clone()).classify("claim").await.unwrap();
        assert_eq!(result["is_fraudulent"], false);
        assert!(executor.seen.lock().unwrap()[0].contains("fraud_classify('claim')"));
    }

    #[tokio::test]
    async fn test_non_success_is_absent() {
        for state in [
            StatementState::Failed,
            StatementState::Canceled,
            StatementState::Running,
        ] {
            let executor = CannedExecutor::new(Ok(StatementResponse::with_state(
                state,
                Some("warehouse stopped"),
            )));
            assert_eq!(functions(executor).classify("claim").await, None);
        }
    }

    #[tokio::test]
    async fn test_transport_error_and_empty_rows_are_absent() {
        let executor = CannedExecutor::new(Err(ClaimscopeError::Connection("refused".into())));
        assert_eq!(functions(executor).extract_indicators("claim").await, None);

        let executor = CannedExecutor::new(Ok(StatementResponse::with_state(
            StatementState::Succeeded,
            None,
        )));
        assert_eq!(functions(executor).extract_indicators("claim").await, None);
    }

    #[tokio::test]
    async fn test_explain_passes_typed_args() {
        let executor = CannedExecutor::new(Ok(StatementResponse::succeeded(json!([
            "Upcoding suspected",
            ["Procedure mismatch"],
            ["Refer to SIU"]
        ]))));
        let result = functions(executor.clone())
            .explain("claim", true, "upcoding")
            .await
            .unwrap();
        assert_eq!(result["summary"], "Upcoding suspected");
        assert!(executor.seen.lock().unwrap()[0].contains("('claim', true, 'upcoding')"));
    }
}
