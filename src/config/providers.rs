// Builtin reasoning provider presets
//
// Every preset speaks the OpenAI chat-completions protocol.

use serde::Serialize;
use std::time::Duration;

use super::loader::LlmConfig;
use super::secrets::SecretsConfig;

/// A builtin provider preset
/// Note: This is hardcoded data, not deserialized from files
#[derive(Debug, Clone)]
pub struct ProviderPreset {
    /// Provider ID (e.g., "openrouter", "ollama")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Base URL; requests go to `{base_url}/chat/completions`
    pub base_url: &'static str,
    /// Environment variable holding the API key (None = keyless local server)
    pub api_key_env: Option<&'static str>,
    /// Model used when the configuration names none
    pub default_model: &'static str,
}

/// Builtin provider presets
pub static PROVIDERS: &[ProviderPreset] = &[
    ProviderPreset {
        id: "openrouter",
        name: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        api_key_env: Some("OPENROUTER_API_KEY"),
        default_model: "google/gemini-2.0-flash-001",
    },
    ProviderPreset {
        id: "openai",
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        api_key_env: Some("OPENAI_API_KEY"),
        default_model: "gpt-4o-mini",
    },
    ProviderPreset {
        id: "gemini",
        name: "Google Gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        api_key_env: Some("GEMINI_API_KEY"),
        default_model: "gemini-2.0-flash",
    },
    ProviderPreset {
        id: "ollama",
        name: "Ollama (local)",
        base_url: "http://localhost:11434/v1",
        api_key_env: None,
        default_model: "llama3.1",
    },
];

/// Get a provider preset by ID
pub fn get_provider_preset(id: &str) -> Option<&'static ProviderPreset> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Get all provider presets
pub fn get_all_provider_presets() -> &'static [ProviderPreset] {
    PROVIDERS
}

/// Where a resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeySource {
    Environment,
    SecretsFile,
    NotRequired,
    Missing,
}

/// Fully resolved client settings, built once at startup and passed by reference
#[derive(Clone)]
pub struct LlmSettings {
    pub provider_id: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_source: ApiKeySource,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider_id", &self.provider_id)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_source", &self.api_key_source)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmSettings {
    /// Resolve settings from config, reading the API key from the environment
    /// (which includes a loaded `.env`) and then from the secrets file.
    pub fn resolve(config: &LlmConfig, secrets: &SecretsConfig) -> anyhow::Result<Self> {
        Self::resolve_with_env(config, secrets, |name| std::env::var(name).ok())
    }

    pub fn resolve_with_env<F>(
        config: &LlmConfig,
        secrets: &SecretsConfig,
        env_lookup: F,
    ) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let preset = get_provider_preset(&config.provider)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider '{}'", config.provider))?;

        let (api_key, api_key_source) = match preset.api_key_env {
            None => (None, ApiKeySource::NotRequired),
            Some(var) => {
                if let Some(key) = env_lookup(var).filter(|k| !k.trim().is_empty()) {
                    (Some(key), ApiKeySource::Environment)
                } else if let Some(key) = secrets.token(preset.id) {
                    (Some(key.to_string()), ApiKeySource::SecretsFile)
                } else {
                    (None, ApiKeySource::Missing)
                }
            }
        };

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| preset.base_url.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            provider_id: preset.id.to_string(),
            base_url,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| preset.default_model.to_string()),
            api_key,
            api_key_source,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn has_usable_key(&self) -> bool {
        self.api_key_source != ApiKeySource::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_provider_preset() {
        let preset = get_provider_preset("openrouter").unwrap();
        assert_eq!(preset.api_key_env, Some("OPENROUTER_API_KEY"));
        assert!(get_provider_preset("unknown").is_none());
    }

    #[test]
    fn test_preset_ids_are_unique() {
        let presets = get_all_provider_presets();
        for (i, preset) in presets.iter().enumerate() {
            assert!(presets[i + 1..].iter().all(|p| p.id != preset.id));
        }
    }

    #[test]
    fn test_env_key_wins_over_secrets() {
        let mut secrets = SecretsConfig::default();
        secrets.set_token("openai", "from-secrets");
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };

        let settings = LlmSettings::resolve_with_env(&config, &secrets, |name| {
            (name == "OPENAI_API_KEY").then(|| "from-env".to_string())
        })
        .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.api_key_source, ApiKeySource::Environment);
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn test_secrets_fallback_and_missing() {
        let mut secrets = SecretsConfig::default();
        secrets.set_token("gemini", "from-secrets");
        let gemini = LlmConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        let settings = LlmSettings::resolve_with_env(&gemini, &secrets, |_| None).unwrap();
        assert_eq!(settings.api_key_source, ApiKeySource::SecretsFile);

        let openrouter = LlmConfig::default();
        let settings =
            LlmSettings::resolve_with_env(&openrouter, &SecretsConfig::default(), |_| None)
                .unwrap();
        assert_eq!(settings.api_key_source, ApiKeySource::Missing);
        assert!(!settings.has_usable_key());
    }

    #[test]
    fn test_ollama_needs_no_key_and_honours_base_url() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            base_url: Some("http://gpu-box:11434/v1/".to_string()),
            ..Default::default()
        };
        let settings =
            LlmSettings::resolve_with_env(&config, &SecretsConfig::default(), |_| None).unwrap();

        assert_eq!(settings.api_key_source, ApiKeySource::NotRequired);
        assert_eq!(settings.base_url, "http://gpu-box:11434/v1");
        assert!(settings.has_usable_key());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = LlmConfig::default();
        let settings = LlmSettings::resolve_with_env(&config, &SecretsConfig::default(), |_| {
            Some("sk-very-secret".to_string())
        })
        .unwrap();

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
