// Wizard Commands
// Request-level operations shared by the HTTP handlers

use serde_json::Value;

use crate::models::Config;
use crate::services::{self, DraftStore, FieldError};

/// Validate a candidate and persist it when it passes. A persistence failure
/// is logged and does not fail the operation; the operator keeps working.
pub fn submit_draft(store: &DraftStore, candidate: &Value) -> Result<Config, Vec<FieldError>> {
    let config = services::validate(candidate)?;

    if let Err(e) = store.save(&config) {
        log::warn!("Failed to persist draft: {e}");
    }

    Ok(config)
}

/// The stored draft, falling back to the all-default configuration so the
/// wizard always has something to show
pub fn current_draft(store: &DraftStore) -> Config {
    match store.load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            log::warn!("Failed to load draft: {e}");
            Config::default()
        }
    }
}

/// Render the stored draft as the config.json artifact. Exports only work
/// against a saved (hence validated) configuration.
pub fn export_config_json(store: &DraftStore) -> Result<String, String> {
    let config = stored_draft(store)?;
    services::config_json(&config)
}

/// Render the stored draft as the .env artifact
pub fn export_env_file(store: &DraftStore) -> Result<String, String> {
    let config = stored_draft(store)?;
    Ok(services::env_file(&config))
}

/// Drop the stored draft
pub fn clear_draft(store: &DraftStore) -> Result<(), String> {
    store.clear()
}

fn stored_draft(store: &DraftStore) -> Result<Config, String> {
    match store.load()? {
        Some(config) => Ok(config),
        None => Err("No validated configuration has been saved yet".to_string()),
    }
}
