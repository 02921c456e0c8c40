//! OpenAI-compatible chat-completions client (OpenRouter, OpenAI, Gemini, Ollama)

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ReasoningError, ReasoningService};
use crate::config::{get_provider_preset, LlmSettings};

/// Blocking chat-completions client
pub struct OpenAiCompatibleClient {
    settings: LlmSettings,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(settings: LlmSettings) -> Result<Self, ReasoningError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|source| ReasoningError::Http {
                provider: settings.provider_id.clone(),
                source,
            })?;

        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }

    fn build_request(&self, prompt: &str, role_context: &str) -> ChatCompletionsRequest {
        let mut messages = Vec::with_capacity(2);
        if !role_context.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: role_context.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatCompletionsRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        }
    }
}

impl ReasoningService for OpenAiCompatibleClient {
    fn execute(&self, prompt: &str, role_context: &str) -> Result<String, ReasoningError> {
        let provider = self.settings.provider_id.clone();

        if !self.settings.has_usable_key() {
            let env_var = get_provider_preset(&provider)
                .and_then(|p| p.api_key_env)
                .unwrap_or("API key")
                .to_string();
            return Err(ReasoningError::MissingApiKey { provider, env_var });
        }

        let request = self.build_request(prompt, role_context);
        let mut request_builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(api_key) = &self.settings.api_key {
            request_builder = request_builder.bearer_auth(api_key);
        }
        if provider == "openrouter" {
            request_builder = request_builder.header("X-Title", "Product Analysis");
        }

        log::debug!(
            "[Reasoning] POST {} model={} prompt_chars={}",
            self.endpoint(),
            self.settings.model,
            prompt.len()
        );

        let response = request_builder
            .send()
            .map_err(|source| ReasoningError::Http {
                provider: provider.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReasoningError::Api {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionsResponse =
            response.json().map_err(|source| ReasoningError::Http {
                provider: provider.clone(),
                source,
            })?;

        if let Some(usage) = &parsed.usage {
            log::debug!(
                "[Reasoning] usage prompt={} completion={} total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReasoningError::EmptyResponse { provider })
    }

    fn name(&self) -> &str {
        &self.settings.provider_id
    }
}

// API request/response types for the Chat Completions API

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}
