// Data models shared by the pipeline, the extraction layer and the report

pub mod timestamp;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Raw stage output keyed by stage name, in execution order.
pub type StageResults = IndexMap<String, String>;

/// A submitted product idea as persisted in the idea log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    #[serde(rename = "idea")]
    pub text: String,
    #[serde(rename = "timestamp", with = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    /// Only the first catalog stage runs; no charts, no report.
    Quick,
    #[default]
    Full,
}

impl AnalysisDepth {
    /// Parse the interactive menu choice ("1" or "2") or a depth name.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "1" | "quick" | "simplified" => Some(AnalysisDepth::Quick),
            "2" | "full" | "comprehensive" => Some(AnalysisDepth::Full),
            _ => None,
        }
    }
}

/// Everything a single pipeline run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub idea: Idea,
    pub stage_results: StageResults,
    /// Names of stages whose result is an error sentinel
    pub failed_stages: Vec<String>,
    /// Name of the terminal stage, whose output is the executive summary
    pub synthesis_stage: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineRun {
    pub fn summary_text(&self) -> &str {
        self.synthesis_stage
            .as_ref()
            .and_then(|name| self.stage_results.get(name))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn duration_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    pub fn into_report(self) -> Report {
        let summary_text = self.summary_text().to_string();
        let synthesis = self.synthesis_stage;
        let stage_results = self
            .stage_results
            .into_iter()
            .filter(|(name, _)| Some(name) != synthesis.as_ref())
            .collect();

        Report {
            summary_text,
            stage_results,
            chart_files: Vec::new(),
        }
    }
}

/// The assembled report before it is written to disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary_text: String,
    /// Narrative sections, synthesis excluded
    pub stage_results: StageResults,
    pub chart_files: Vec<PathBuf>,
}
