//! The `secrets set` command: store a provider token in secrets.toml

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::config::{get_all_provider_presets, get_provider_preset, SecretsConfig};

/// Store `token` for `provider` in the global secrets file
pub fn set_secret(provider: &str, token: &str) -> Result<PathBuf> {
    let path = SecretsConfig::default_path();
    set_secret_at(&path, provider, token)?;
    Ok(path)
}

/// Store `token` for `provider` in the secrets file at `path`, keeping other entries
pub fn set_secret_at(path: &Path, provider: &str, token: &str) -> Result<()> {
    let preset = get_provider_preset(provider).ok_or_else(|| {
        let known: Vec<&str> = get_all_provider_presets().iter().map(|p| p.id).collect();
        anyhow!(
            "Unknown provider '{}' (known: {})",
            provider,
            known.join(", ")
        )
    })?;
    if preset.api_key_env.is_none() {
        return Err(anyhow!("{} does not use an API key", preset.name));
    }
    if token.trim().is_empty() {
        return Err(anyhow!("Token must not be empty"));
    }

    let mut secrets = SecretsConfig::load_from(path)?;
    secrets.set_token(preset.id, token);
    secrets.save_to(path)?;

    log::info!("[Secrets] Stored token for {}", preset.id);
    Ok(())
}
