//! Runs a single stage: render the prompt, make one reasoning call.

use serde::Serialize;
use std::time::Instant;

use super::catalog::StageDefinition;
use crate::agents::ReasoningService;
use crate::templates::{render_prompt, PromptContext};

/// Text recorded for a stage whose prompt or reasoning call failed
pub fn error_sentinel(stage_title: &str, message: &str) -> String {
    format!("Error in {}: {}", stage_title, message)
}

/// Result of a single stage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    pub stage_name: String,
    /// Model output, or the error sentinel on failure
    pub raw_text: String,
    /// Error message if failed
    pub error: Option<String>,
    pub duration_secs: f64,
}

impl StageOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes stages against one reasoning service
pub struct StageRunner<'a> {
    service: &'a dyn ReasoningService,
}

impl<'a> StageRunner<'a> {
    pub fn new(service: &'a dyn ReasoningService) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Run one stage. Never fails: errors become the sentinel text.
    pub fn run(&self, stage: &StageDefinition, context: &PromptContext) -> StageOutcome {
        let start = Instant::now();

        let result = build_prompt(stage, context).and_then(|prompt| {
            self.service
                .execute(&prompt, &stage.persona.role_context())
                .map_err(|e| e.to_string())
        });

        let duration_secs = start.elapsed().as_secs_f64();

        match result {
            Ok(raw_text) => StageOutcome {
                stage_name: stage.name.clone(),
                raw_text,
                error: None,
                duration_secs,
            },
            Err(message) => StageOutcome {
                stage_name: stage.name.clone(),
                raw_text: error_sentinel(&stage.title, &message),
                error: Some(message),
                duration_secs,
            },
        }
    }
}

/// Rendered description followed by the expected-output block
fn build_prompt(stage: &StageDefinition, context: &PromptContext) -> Result<String, String> {
    let description = render_prompt(&stage.name, &stage.description_template, context)
        .map_err(|e| e.to_string())?;

    Ok(format!(
        "{}\n\nExpected output:\n{}",
        description.trim(),
        stage.expected_output.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentPersona, ScriptedService};

    fn stage(template: &str) -> StageDefinition {
        StageDefinition::new(
            "market_research",
            "Market Research",
            AgentPersona::new("Market Research Analyst", "Size it", ""),
            template,
            "- TAM analysis",
        )
    }

    #[test]
    fn test_successful_stage() {
        let service = ScriptedService::always("TAM: $150 million");
        let runner = StageRunner::new(&service);

        let outcome = runner.run(&stage("Research {{ idea }}"), &PromptContext::new().with_idea("pots"));

        assert!(outcome.succeeded());
        assert_eq!(outcome.raw_text, "TAM: $150 million");
        let calls = service.calls();
        assert_eq!(calls[0].prompt, "Research pots\n\nExpected output:\n- TAM analysis");
        assert!(calls[0].role_context.contains("Market Research Analyst"));
    }

    #[test]
    fn test_service_failure_becomes_sentinel() {
        let service = ScriptedService::placeholder().fail_on("Market", "rate limited");
        let runner = StageRunner::new(&service);

        let outcome = runner.run(&stage("Research"), &PromptContext::new());

        assert!(!outcome.succeeded());
        assert_eq!(outcome.raw_text, "Error in Market Research: rate limited");
        assert_eq!(outcome.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_render_failure_becomes_sentinel_without_calling_service() {
        let service = ScriptedService::always("unused");
        let runner = StageRunner::new(&service);

        let outcome = runner.run(&stage("{{ undefined_variable }}"), &PromptContext::new());

        assert!(outcome.raw_text.starts_with("Error in Market Research: "));
        assert!(service.calls().is_empty());
    }
}
