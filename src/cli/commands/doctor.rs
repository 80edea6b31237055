//! Doctor command - verify configuration and workspace connectivity.

use crate::cli::Output;
use crate::config::Settings;
use crate::workspace::WorkspaceClient;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: Option<&str>) -> anyhow::Result<()> {
    Output::header("Claimscope Doctor");
    println!();
    println!("Checking configuration and workspace connectivity...\n");

    let mut checks = Vec::new();

    println!("{}", style("Credentials").bold());
    let credential_checks = vec![check_host(settings), check_token(settings)];
    for check in &credential_checks {
        check.print();
    }
    checks.extend(credential_checks);

    println!();

    println!("{}", style("Resources").bold());
    let resource_checks = check_resources(settings);
    for check in &resource_checks {
        check.print();
    }
    checks.extend(resource_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    // Only check the connection when credentials are present
    if checks.iter().all(|c| c.status != CheckStatus::Error) {
        println!("{}", style("Connectivity").bold());
        let spinner = Output::spinner("Contacting workspace...");
        let connection = check_connection(settings).await;
        spinner.finish_and_clear();
        connection.print();
        checks.push(connection);
        println!();
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Claimscope.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Claimscope is ready to use.");
    }

    Ok(())
}

fn check_host(settings: &Settings) -> CheckResult {
    match settings.workspace.host.as_deref().filter(|h| !h.trim().is_empty()) {
        Some(host) => CheckResult::ok("DATABRICKS_HOST", host),
        None => CheckResult::error(
            "DATABRICKS_HOST",
            "not set",
            "Set with: export DATABRICKS_HOST='https://<workspace>.cloud.databricks.com'",
        ),
    }
}

fn check_token(settings: &Settings) -> CheckResult {
    match settings.workspace.token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => CheckResult::ok("DATABRICKS_TOKEN", &format!("configured ({})", mask_secret(token))),
        None => CheckResult::error(
            "DATABRICKS_TOKEN",
            "not set",
            "Set with: export DATABRICKS_TOKEN='dapi...'",
        ),
    }
}

fn check_resources(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        CheckResult::ok("Warehouse", &settings.workspace.warehouse_id),
        CheckResult::ok(
            "Functions",
            &format!("{}.{}.*", settings.catalog.catalog, settings.catalog.schema),
        ),
        CheckResult::ok("Vector index", &settings.vector_index()),
        CheckResult::ok("Model endpoint", &settings.agent.llm_endpoint),
    ];

    if settings.general.environment != "prod" {
        results.push(CheckResult::warning(
            "Environment",
            &settings.general.environment,
            "Set ENVIRONMENT=prod for production workspaces",
        ));
    } else {
        results.push(CheckResult::ok("Environment", &settings.general.environment));
    }

    results
}

fn check_config_file(config_path: Option<&str>) -> CheckResult {
    let path = match config_path {
        Some(p) => Settings::expand_path(p),
        None => Settings::default_config_path(),
    };

    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults and environment",
            &format!("Create {} to persist settings", path.display()),
        )
    }
}

async fn check_connection(settings: &Settings) -> CheckResult {
    let client = match WorkspaceClient::from_settings(&settings.workspace) {
        Ok(client) => client,
        Err(e) => return CheckResult::error("Workspace", &e.to_string(), "Check DATABRICKS_HOST"),
    };

    let status = client.check_connection().await;
    if status.is_connected() {
        CheckResult::ok("Workspace", &format!("{} ({})", status.label(), status.detail()))
    } else {
        CheckResult::error(
            "Workspace",
            status.detail(),
            "Check the host, token and network access",
        )
    }
}

/// Keep the first and last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_missing_credentials_are_errors() {
        let mut settings = Settings::default();
        settings.workspace.host = None;
        settings.workspace.token = Some("  ".into());
        assert_eq!(check_host(&settings).status, CheckStatus::Error);
        assert_eq!(check_token(&settings).status, CheckStatus::Error);
    }

    #[test]
    fn test_token_is_masked() {
        let mut settings = Settings::default();
        settings.workspace.token = Some("dapi1234567890abcdef".into());
        let check = check_token(&settings);
        assert_eq!(check.status, CheckStatus::Ok);
        assert_eq!(check.message, "configured (dapi...cdef)");
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn test_dev_environment_warns() {
        let settings = Settings::default();
        let env = check_resources(&settings)
            .into_iter()
            .find(|c| c.name == "Environment")
            .unwrap();
        assert_eq!(env.status, CheckStatus::Warning);
    }
}
