//! Generator configuration loading.
//!
//! Priority: `~/.config/parley/secret.json`, then environment variables
//! (`PARLEY_API_KEY`, `PARLEY_MODEL`, `PARLEY_BASE_URL`).

use parley_core::{ParleyError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Resolved backend settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// On-disk shape of secret.json.
#[derive(Debug, Clone, Deserialize)]
struct SecretFile {
    api_key: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
}

impl GeneratorConfig {
    /// Loads configuration from the secret file, falling back to
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns a config error when no API key can be found anywhere.
    pub fn load() -> Result<Self> {
        if let Some(config) = Self::from_secret_file()? {
            return Ok(config);
        }
        Self::from_env().ok_or_else(|| {
            ParleyError::config(
                "no API key found in ~/.config/parley/secret.json or PARLEY_API_KEY",
            )
        })
    }

    fn from_secret_file() -> Result<Option<Self>> {
        let Some(path) = secret_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            ParleyError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let secret: SecretFile = serde_json::from_str(&content).map_err(|e| {
            ParleyError::config(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(Some(Self::resolve(
            secret.api_key,
            secret.model,
            secret.base_url,
        )))
    }

    fn from_env() -> Option<Self> {
        let api_key = env::var("PARLEY_API_KEY").ok()?;
        Some(Self::resolve(
            api_key,
            env::var("PARLEY_MODEL").ok(),
            env::var("PARLEY_BASE_URL").ok(),
        ))
    }

    fn resolve(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Returns the path to the secret file: ~/.config/parley/secret.json
fn secret_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("parley").join("secret.json"))
}
