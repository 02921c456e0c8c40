//! Provider API tokens, kept out of the config file
//!
//! `~/.product-analysis/secrets.toml` maps provider ids to tokens:
//!
//! ```toml
//! [tokens]
//! openrouter = "sk-or-..."
//! ```
//!
//! Environment variables take precedence; this file is the fallback the
//! `secrets set` command writes to.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::file_storage::{atomic_write, ensure_dir, get_global_data_dir};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SecretsConfig {
    /// Provider id -> token
    #[serde(default)]
    tokens: BTreeMap<String, String>,
}

impl SecretsConfig {
    pub fn default_path() -> PathBuf {
        get_global_data_dir().join("secrets.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// A missing file holds no tokens
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse secrets file {:?}", path))
    }

    /// Write the file readable by the owner only
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize secrets")?;
        atomic_write(path, contents.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions on {:?}", path))?;
        }

        log::info!("[Secrets] Saved {} token(s) to {:?}", self.tokens.len(), path);
        Ok(())
    }

    /// Token for a provider; blank entries count as missing
    pub fn token(&self, provider_id: &str) -> Option<&str> {
        self.tokens
            .get(provider_id)
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn set_token(&mut self, provider_id: &str, token: &str) {
        self.tokens
            .insert(provider_id.to_string(), token.trim().to_string());
    }
}
