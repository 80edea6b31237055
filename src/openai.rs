//! OpenAI-compatible client for the workspace's model serving endpoints.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;
use url::Url;

/// Default timeout for model requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Base URL of the OpenAI-compatible serving API for a workspace.
pub fn serving_base_url(workspace: &Url) -> Result<String> {
    let url = workspace.join("serving-endpoints")?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Create a client for `api_base` with a bearer token and request timeout.
pub fn create_client(api_base: &str, token: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(token);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serving_base_url() {
        let ws = Url::parse("https://adb-1.azuredatabricks.net/").unwrap();
        assert_eq!(
            serving_base_url(&ws).unwrap(),
            "https://adb-1.azuredatabricks.net/serving-endpoints"
        );
    }

    #[test]
    fn test_create_client() {
        let client = create_client(
            "https://example.com/serving-endpoints",
            "token",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        );
        assert!(client.is_ok());
    }
}
