//! Reasoning service boundary
//!
//! Every stage of the pipeline turns into exactly one call to a
//! [`ReasoningService`]. Production runs use an OpenAI-compatible HTTP
//! client; dry runs and tests use [`ScriptedService`].

pub mod openai_compatible;
pub mod persona;
pub mod scripted;

pub use openai_compatible::OpenAiCompatibleClient;
pub use persona::AgentPersona;
pub use scripted::{RecordedCall, ScriptedService};

use thiserror::Error;

/// Errors raised by a reasoning call
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("No API key for provider '{provider}' (set {env_var} or add it to secrets.toml)")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Request to {provider} failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },

    #[error("{0}")]
    Scripted(String),
}

/// A service that answers one prompt under one role context.
///
/// Calls are blocking and made one at a time.
pub trait ReasoningService {
    fn execute(&self, prompt: &str, role_context: &str) -> Result<String, ReasoningError>;

    /// Short label used in log lines
    fn name(&self) -> &str;
}
