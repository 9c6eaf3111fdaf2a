use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    config::{ApiConfig, TemplateSet},
    error::{ComicError, Result},
};

/// The one namespaced entry everything is stored under.
pub const SETTINGS_KEY: &str = "comicgen/api-settings";

/// What survives between sessions: the API credential, base URL and
/// the prompt templates. Generated panels are never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub templates: Option<TemplateSet>,
}

impl StoredSettings {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// File-backed key-value store holding the settings JSON. Loaded at
/// startup; written on every edit. Other keys in the file are left
/// untouched.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file or a malformed entry both read as "no settings
    /// yet"; only I/O failures surface as errors.
    pub fn load(&self) -> Result<Option<StoredSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        let root: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Ignoring malformed settings file: {}", e);
                return Ok(None);
            }
        };

        match root.get(SETTINGS_KEY) {
            Some(entry) => match serde_json::from_value(entry.clone()) {
                Ok(settings) => Ok(Some(settings)),
                Err(e) => {
                    log::warn!("Ignoring malformed settings entry: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<()> {
        let mut root: Map<String, Value> = if self.path.exists() {
            let raw = fs::read_to_string(&self.path)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            Map::new()
        };

        let entry = serde_json::to_value(settings)
            .map_err(|e| ComicError::Serialization(e.to_string()))?;
        root.insert(SETTINGS_KEY.to_string(), entry);

        let serialized = serde_json::to_string_pretty(&root)
            .map_err(|e| ComicError::Serialization(e.to_string()))?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}
