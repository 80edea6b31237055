//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: &Settings, config_path: Option<&str>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings.redacted())
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let path = match config_path {
                Some(p) => Settings::expand_path(p),
                None => Settings::default_config_path(),
            };
            println!("{}", path.display());
        }
    }

    Ok(())
}
