// DraftStore Service
// Persists the wizard's working configuration as one JSON document

use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::Value;

use crate::models::{promote_legacy_build_fields, Config};

const DRAFT_FILE: &str = "draft.json";

/// Stores the single draft document under the app data directory, with an
/// in-memory copy so repeated loads do not re-read the file
pub struct DraftStore {
    draft_path: PathBuf,
    cache: RwLock<Option<Config>>,
}

impl DraftStore {
    /// Create a new DraftStore rooted at the given app data directory
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            draft_path: app_data_dir.join(DRAFT_FILE),
            cache: RwLock::new(None),
        }
    }

    /// Load the stored draft, or None when nothing has been saved yet.
    /// Legacy build spellings in older documents are promoted into their
    /// canonical fields; fields a document does not carry take defaults.
    pub fn load(&self) -> Result<Option<Config>, String> {
        if let Ok(cache) = self.cache.read() {
            if let Some(ref config) = *cache {
                return Ok(Some(config.clone()));
            }
        }

        if !self.draft_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.draft_path)
            .map_err(|e| format!("Failed to read draft: {e}"))?;

        let mut doc: Value = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse draft: {e}"))?;
        promote_legacy_build_fields(&mut doc);

        let config: Config = serde_json::from_value(doc)
            .map_err(|e| format!("Failed to parse draft: {e}"))?;

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(config.clone());
        }

        Ok(Some(config))
    }

    /// Save a validated configuration as the draft document
    pub fn save(&self, config: &Config) -> Result<(), String> {
        if let Some(parent) = self.draft_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create draft directory: {e}"))?;
        }

        let doc = config.to_document()?;
        let content = serde_json::to_string_pretty(&doc)
            .map_err(|e| format!("Failed to serialize draft: {e}"))?;

        std::fs::write(&self.draft_path, content)
            .map_err(|e| format!("Failed to write draft: {e}"))?;

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(config.clone());
        }

        Ok(())
    }

    /// Delete the stored draft
    pub fn clear(&self) -> Result<(), String> {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }

        if self.draft_path.exists() {
            std::fs::remove_file(&self.draft_path)
                .map_err(|e| format!("Failed to delete draft: {e}"))?;
        }

        Ok(())
    }
}
