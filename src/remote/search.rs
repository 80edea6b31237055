//! Semantic search over the fraud-pattern knowledge base.

use crate::workspace::VectorIndexClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maximum characters of document content handed to the agent.
pub const SEARCH_CONTENT_MAX_CHARS: usize = 500;

/// Columns requested from the index, in row order.
pub const SEARCH_COLUMNS: [&str; 4] = ["doc_id", "doc_type", "title", "content"];

/// One knowledge-base document matching a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub doc_id: String,
    pub doc_type: String,
    pub title: String,
    pub content: String,
}

/// Result of a search: matches, or a structured error.
///
/// Serializes as a bare JSON array or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Matches(Vec<PatternMatch>),
    Failed { error: String },
}

impl SearchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SearchOutcome::Failed { .. })
    }
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Map a positional index row to a match.
fn row_to_match(row: &[Value]) -> PatternMatch {
    let cell = |idx: usize| match row.get(idx) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    PatternMatch {
        doc_id: cell(0),
        doc_type: cell(1),
        title: cell(2),
        content: truncate_chars(&cell(3), SEARCH_CONTENT_MAX_CHARS),
    }
}

/// Decode an index query response body.
pub fn parse_search_response(body: &Value) -> SearchOutcome {
    if body.get("error_code").is_some() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return SearchOutcome::Failed {
            error: format!("Vector Search error: {}", message),
        };
    }

    let rows = body
        .pointer("/result/data_array")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_array)
                .map(|row| row_to_match(row))
                .collect()
        })
        .unwrap_or_default();

    SearchOutcome::Matches(rows)
}

/// Queries the fraud-pattern vector index.
#[derive(Clone)]
pub struct FraudPatternSearch {
    client: Arc<dyn VectorIndexClient>,
    index_name: String,
    num_results: u32,
}

impl FraudPatternSearch {
    pub fn new(client: Arc<dyn VectorIndexClient>, index_name: &str, num_results: u32) -> Self {
        Self {
            client,
            index_name: index_name.to_string(),
            num_results,
        }
    }

    /// Run a free-text similarity query.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let body = json!({
            "columns": SEARCH_COLUMNS,
            "num_results": self.num_results,
            "query_text": query,
        });

        match self.client.query_index(&self.index_name, &body).await {
            Ok(reply) => {
                let outcome = parse_search_response(&reply);
                if let SearchOutcome::Matches(ref matches) = outcome {
                    debug!("Search returned {} matches", matches.len());
                }
                outcome
            }
            Err(e) => {
                warn!("Search against {} failed: {}", self.index_name, e);
                SearchOutcome::Failed {
                    error: format!("Search failed: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClaimscopeError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedIndex {
        reply: Mutex<Option<Result<Value>>>,
        bodies: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl VectorIndexClient for CannedIndex {
        async fn query_index(&self, index_name: &str, body: &Value) -> Result<Value> {
            self.bodies
                .lock()
                .unwrap()
                .push((index_name.to_string(), body.clone()));
            self.reply.lock().unwrap().take().unwrap()
        }
    }

    fn search_with(reply: Result<Value>) -> (FraudPatternSearch, Arc<CannedIndex>) {
        let index = Arc::new(CannedIndex {
            reply: Mutex::new(Some(reply)),
            bodies: Mutex::new(Vec::new()),
        });
        (
            FraudPatternSearch::new(index.clone(), "cat.sch.fraud_cases_index", 3),
            index,
        )
    }

    #[test]
    fn test_truncate_chars() {
        let long = "x".repeat(SEARCH_CONTENT_MAX_CHARS + 37);
        let cut = truncate_chars(&long, SEARCH_CONTENT_MAX_CHARS);
        assert_eq!(cut.chars().count(), SEARCH_CONTENT_MAX_CHARS);
        assert!(long.starts_with(&cut));

        let exact = "y".repeat(SEARCH_CONTENT_MAX_CHARS);
        assert_eq!(truncate_chars(&exact, SEARCH_CONTENT_MAX_CHARS), exact);
        assert_eq!(truncate_chars("short", SEARCH_CONTENT_MAX_CHARS), "short");

        // Multi-byte characters are counted, not bytes
        let accented = "é".repeat(SEARCH_CONTENT_MAX_CHARS + 1);
        let cut = truncate_chars(&accented, SEARCH_CONTENT_MAX_CHARS);
        assert_eq!(cut.chars().count(), SEARCH_CONTENT_MAX_CHARS);
    }

    #[tokio::test]
    async fn test_rows_map_positionally() {
        let long_content = "Upcoding ".repeat(100);
        let (search, index) = search_with(Ok(json!({
            "manifest": {"column_count": 5},
            "result": {"row_count": 2, "data_array": [
                ["FP-001", "pattern", "Upcoding", long_content, 0.91],
                [17, "case", "Unbundling", "Lab tests billed separately", 0.74]
            ]}
        })));

        let outcome = search.search("surgery billed for office visit").await;
        let SearchOutcome::Matches(matches) = outcome else {
            panic!("expected matches");
        };
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].doc_id, "FP-001");
        assert_eq!(matches[0].content.chars().count(), SEARCH_CONTENT_MAX_CHARS);
        assert_eq!(matches[1].doc_id, "17");
        assert_eq!(matches[1].title, "Unbundling");

        let bodies = index.bodies.lock().unwrap();
        assert_eq!(bodies[0].0, "cat.sch.fraud_cases_index");
        assert_eq!(bodies[0].1["num_results"], 3);
        assert_eq!(bodies[0].1["columns"], json!(SEARCH_COLUMNS));
    }

    #[tokio::test]
    async fn test_empty_result() {
        let (search, _) = search_with(Ok(json!({"result": {"row_count": 0}})));
        assert_eq!(search.search("q").await, SearchOutcome::Matches(vec![]));
    }

    #[tokio::test]
    async fn test_error_code_is_reported() {
        let (search, _) = search_with(Ok(json!({
            "error_code": "RESOURCE_DOES_NOT_EXIST",
            "message": "Index not found"
        })));
        let outcome = search.search("q").await;
        assert_eq!(
            outcome,
            SearchOutcome::Failed {
                error: "Vector Search error: Index not found".to_string()
            }
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "Vector Search error: Index not found"})
        );
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let (search, _) = search_with(Err(ClaimscopeError::Connection("dns".into())));
        let outcome = search.search("q").await;
        assert!(outcome.is_failed());
        match outcome {
            SearchOutcome::Failed { error } => assert!(error.starts_with("Search failed:")),
            _ => unreachable!(),
        }
    }
}
