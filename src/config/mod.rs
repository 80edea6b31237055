//! Configuration module for Claimscope.
//!
//! Handles loading application settings (file plus environment) and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts};
pub use settings::{
    AgentSettings, CatalogSettings, GeneralSettings, SearchSettings, ServerSettings, Settings,
    WorkspaceSettings,
};
