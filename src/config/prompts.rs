//! Prompt templates for the fraud analysis agent.
//!
//! Prompts can be overridden by an `agent.toml` file in a custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
}

/// Prompts sent to the analysis agent on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert healthcare fraud detection analyst for insurance payers. Your job is to analyze claims and detect fraud.

You have access to these tools:
1. classify_claim - Determines if claim is fraudulent (returns is_fraudulent, fraud_type, etc). Use this FIRST.
2. extract_indicators - Extracts detailed fraud indicators. Use after classification.
3. search_fraud_patterns - Searches fraud knowledge base. Use for most claims.
4. generate_explanation - Creates comprehensive explanation. MUST pass is_fraudulent and fraud_type from classify_claim results.

IMPORTANT: You MUST use the tools by calling them properly. After using tools, provide a final analysis.

Analysis strategy:
- Start with classify_claim (get is_fraudulent and fraud_type)
- Then use extract_indicators
- Use search_fraud_patterns to find similar fraud cases
- Use generate_explanation with the is_fraudulent and fraud_type from step 1
- After gathering information, provide your final fraud assessment

Be thorough but efficient."#
                .to_string(),

            user: "Analyze this healthcare claim for fraud and provide a comprehensive assessment: {{claim}}"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from `custom_dir/agent.toml` when present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let agent_path = Path::new(&shellexpand::tilde(dir).to_string()).join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Build the user message for one claim.
    pub fn user_message(&self, claim_text: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("claim".to_string(), claim_text.to_string());
        Self::render(&self.agent.user, &vars)
    }
}
