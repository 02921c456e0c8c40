// Template rendering for stage prompts and the HTML report

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tera::{Context, Tera};

/// Output of an earlier stage, as seen by the synthesis prompt
#[derive(Debug, Clone, Serialize)]
pub struct PriorStage {
    pub name: String,
    pub title: String,
    pub text: String,
}

/// Variables available to stage prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    /// Only set for the first stage
    pub idea: Option<String>,
    /// Only non-empty for the synthesis stage
    pub prior_stages: Vec<PriorStage>,
    pub current_date: String,
}

impl PromptContext {
    pub fn new() -> Self {
        Self {
            idea: None,
            prior_stages: Vec::new(),
            current_date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }

    pub fn with_idea(mut self, idea: &str) -> Self {
        self.idea = Some(idea.to_string());
        self
    }

    pub fn with_prior_stages(mut self, prior_stages: Vec<PriorStage>) -> Self {
        self.prior_stages = prior_stages;
        self
    }

    /// Convert to Tera context
    pub fn to_tera_context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.insert("idea", self.idea.as_deref().unwrap_or(""));
        ctx.insert("prior_stages", &self.prior_stages);
        // Lookup by key for templates that want a single stage
        let by_name: std::collections::BTreeMap<&str, &str> = self
            .prior_stages
            .iter()
            .map(|stage| (stage.name.as_str(), stage.text.as_str()))
            .collect();
        ctx.insert("results", &by_name);
        ctx.insert("current_date", &self.current_date);
        ctx
    }
}

impl Default for PromptContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Template engine wrapping one Tera instance
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine. Autoescaping applies to names ending in
    /// `.html`; prompt templates are rendered verbatim.
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Add a template from string
    pub fn add_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, template)
            .map_err(|e| anyhow!("Failed to add template '{}': {}", name, describe(&e)))
    }

    /// Render a registered template
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| anyhow!("Failed to render template '{}': {}", name, describe(&e)))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a stage prompt template (no escaping)
pub fn render_prompt(name: &str, template: &str, context: &PromptContext) -> Result<String> {
    let mut engine = TemplateEngine::new();
    let template_name = format!("{}.prompt", name);
    engine.add_template(&template_name, template)?;
    engine.render(&template_name, &context.to_tera_context())
}

/// Check that a template parses without rendering it
pub fn check_template(name: &str, template: &str) -> Result<()> {
    TemplateEngine::new().add_template(&format!("{}.prompt", name), template)
}

/// Tera nests the useful message in the error source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
