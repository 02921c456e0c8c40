use serde::{Deserialize, Serialize};

/// Who the reasoning service should act as for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPersona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentPersona {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    /// The system-level context sent alongside the stage prompt
    pub fn role_context(&self) -> String {
        let mut context = format!("You are the {}.", self.role);
        if !self.goal.is_empty() {
            context.push_str(&format!("\nYour goal: {}", self.goal));
        }
        if !self.backstory.is_empty() {
            context.push_str("\n\n");
            context.push_str(&self.backstory);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_context_includes_all_parts() {
        let persona = AgentPersona::new(
            "Market Research Analyst",
            "Size the market",
            "You have covered consumer hardware for a decade.",
        );
        let context = persona.role_context();

        assert!(context.starts_with("You are the Market Research Analyst."));
        assert!(context.contains("Your goal: Size the market"));
        assert!(context.ends_with("for a decade."));
    }

    #[test]
    fn test_role_context_skips_empty_parts() {
        let persona = AgentPersona::new("Reviewer", "", "");
        assert_eq!(persona.role_context(), "You are the Reviewer.");
    }
}
