//! Configuration settings for Claimscope.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub workspace: WorkspaceSettings,
    pub catalog: CatalogSettings,
    pub agent: AgentSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Deployment environment label (dev, staging, prod).
    pub environment: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
        }
    }
}

/// Hosting workspace connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Workspace base URL, e.g. `https://adb-123.azuredatabricks.net`.
    pub host: Option<String>,
    /// Personal access or app token. Prefer the environment over the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// SQL warehouse used for statement execution.
    pub warehouse_id: String,
    /// Server-side wait before a statement is reported back (seconds, max 50).
    pub statement_wait_secs: u32,
    /// HTTP client timeout for workspace calls (seconds).
    pub request_timeout_secs: u64,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            warehouse_id: "148ccb90800933a1".to_string(),
            statement_wait_secs: 50,
            request_timeout_secs: 120,
        }
    }
}

/// Catalog and schema holding the fraud functions and index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub catalog: String,
    pub schema: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            catalog: "fraud_detection_dev".to_string(),
            schema: "claims_analysis".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Fully qualified `catalog.schema.name` identifier.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, name)
    }
}

/// Agent and model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Model serving endpoint name.
    pub llm_endpoint: String,
    /// Sampling temperature. Kept low so tool-call formatting stays stable.
    pub temperature: f32,
    /// Output token budget per model turn.
    pub max_tokens: u32,
    /// Maximum model turns per analysis.
    pub max_iterations: usize,
    /// Timeout for a single model request (seconds).
    pub request_timeout_secs: u64,
    /// Directory holding an `agent.toml` prompt override.
    pub prompts_dir: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            llm_endpoint: "databricks-claude-sonnet-4-5".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            max_iterations: 10,
            request_timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            prompts_dir: None,
        }
    }
}

/// Fraud pattern search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Vector index name inside the configured catalog and schema.
    pub index_name: String,
    /// Number of matches requested per query.
    pub num_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index_name: "fraud_cases_index".to_string(),
            num_results: 3,
        }
    }
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file plus the process environment.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables always win over file values.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override values from environment-style lookups.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CATALOG_NAME") {
            self.catalog.catalog = v;
        }
        if let Some(v) = get("SCHEMA_NAME") {
            self.catalog.schema = v;
        }
        if let Some(v) = get("DATABRICKS_WAREHOUSE_ID") {
            self.workspace.warehouse_id = v;
        }
        if let Some(v) = get("ENVIRONMENT") {
            self.general.environment = v;
        }
        if let Some(v) = get("LLM_ENDPOINT") {
            self.agent.llm_endpoint = v;
        }
        if let Some(v) = get("DATABRICKS_HOST") {
            self.workspace.host = Some(v);
        }
        if let Some(v) = get("DATABRICKS_TOKEN") {
            self.workspace.token = Some(v);
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("claimscope")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Fully qualified name of the fraud pattern vector index.
    pub fn vector_index(&self) -> String {
        self.catalog.qualify(&self.search.index_name)
    }

    /// Copy of these settings with the token removed, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.workspace.token.is_some() {
            copy.workspace.token = Some("********".to_string());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.catalog.catalog, "fraud_detection_dev");
        assert_eq!(settings.catalog.schema, "claims_analysis");
        assert_eq!(settings.workspace.warehouse_id, "148ccb90800933a1");
        assert_eq!(settings.general.environment, "dev");
        assert_eq!(settings.agent.llm_endpoint, "databricks-claude-sonnet-4-5");
        assert_eq!(
            settings.vector_index(),
            "fraud_detection_dev.claims_analysis.fraud_cases_index"
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_NAME", "fraud_prod"),
            ("SCHEMA_NAME", "claims"),
            ("ENVIRONMENT", "prod"),
            ("LLM_ENDPOINT", "my-endpoint"),
            ("DATABRICKS_WAREHOUSE_ID", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.catalog.qualify("fraud_classify"), "fraud_prod.claims.fraud_classify");
        assert_eq!(settings.general.environment, "prod");
        assert_eq!(settings.agent.llm_endpoint, "my-endpoint");
        // Empty values keep the default
        assert_eq!(settings.workspace.warehouse_id, "148ccb90800933a1");
        assert!(settings.workspace.host.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[catalog]\ncatalog = \"from_file\"\n\n[search]\nnum_results = 5\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.search.num_results, 5);
        assert_eq!(settings.search.index_name, "fraud_cases_index");

        let missing = dir.path().join("missing.toml");
        let settings = Settings::load_from(Some(&missing)).unwrap();
        assert_eq!(settings.search.num_results, 3);
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut settings = Settings::default();
        settings.workspace.token = Some("dapi-secret".to_string());
        let shown = toml::to_string_pretty(&settings.redacted()).unwrap();
        assert!(!shown.contains("dapi-secret"));
    }
}
