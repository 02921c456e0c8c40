//! Offline reasoning service
//!
//! Answers from a fixed script instead of a provider. `--dry-run` uses it
//! to exercise the whole pipeline without network access, and the tests use
//! it to inject failures into specific stages.

use std::cell::RefCell;

use super::{ReasoningError, ReasoningService};

/// What the script does when a rule matches
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
    Placeholder,
}

#[derive(Debug, Clone)]
struct ScriptRule {
    /// Matched against the role context
    role_fragment: String,
    reply: Reply,
}

/// One call the service received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub role_context: String,
}

/// Scripted [`ReasoningService`]; the first rule whose fragment occurs in the
/// role context decides the reply.
#[derive(Debug)]
pub struct ScriptedService {
    rules: Vec<ScriptRule>,
    fallback: Reply,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedService {
    /// A script with no rules that answers every call with placeholder text
    pub fn placeholder() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Reply::Placeholder,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A script with no rules that answers every call with `text`
    pub fn always(text: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Reply::Text(text.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn respond_to(mut self, role_fragment: &str, text: &str) -> Self {
        self.rules.push(ScriptRule {
            role_fragment: role_fragment.to_string(),
            reply: Reply::Text(text.to_string()),
        });
        self
    }

    pub fn fail_on(mut self, role_fragment: &str, message: &str) -> Self {
        self.rules.push(ScriptRule {
            role_fragment: role_fragment.to_string(),
            reply: Reply::Fail(message.to_string()),
        });
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn placeholder_content(role_context: &str) -> String {
        let role = role_context
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("You are the "))
            .map(|rest| rest.trim_end_matches('.'))
            .unwrap_or("analyst");

        format!(
            "# {}\n\n*Dry run - no reasoning provider was called.*\n\n\
             Configure a provider API key and run again without --dry-run \
             to get a real analysis.",
            role
        )
    }
}

impl ReasoningService for ScriptedService {
    fn execute(&self, prompt: &str, role_context: &str) -> Result<String, ReasoningError> {
        self.calls.borrow_mut().push(RecordedCall {
            prompt: prompt.to_string(),
            role_context: role_context.to_string(),
        });

        let reply = self
            .rules
            .iter()
            .find(|rule| role_context.contains(&rule.role_fragment))
            .map(|rule| &rule.reply)
            .unwrap_or(&self.fallback);

        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(ReasoningError::Scripted(message.clone())),
            Reply::Placeholder => Ok(Self::placeholder_content(role_context)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
