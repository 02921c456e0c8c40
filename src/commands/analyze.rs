//! The `analyze` command
//!
//! Stores the idea, runs the pipeline and, for a full analysis, extracts
//! chart data and writes the HTML report.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::agents::{OpenAiCompatibleClient, ReasoningService, ScriptedService};
use crate::config::{AppConfig, LlmSettings, SecretsConfig};
use crate::extraction::extract_all;
use crate::file_storage::ideas::IdeaStore;
use crate::models::{AnalysisDepth, Idea};
use crate::pipeline::{default_catalog, PipelineOrchestrator};
use crate::report::{self, chart_specs, open_in_viewer, ChartRenderer, PlottersChartRenderer};

/// What the user asked to analyze
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub idea: String,
    pub depth: AnalysisDepth,
}

/// Result of one `analyze` invocation
#[derive(Debug, Clone)]
pub enum AnalyzeOutcome {
    /// Quick analysis: the first stage's text, no charts or report
    Quick {
        idea: Idea,
        stage_title: String,
        text: String,
        failed: bool,
    },
    Full {
        idea: Idea,
        report_path: PathBuf,
        chart_files: Vec<PathBuf>,
        skipped_charts: Vec<String>,
        failed_stages: Vec<String>,
    },
}

/// Pick the reasoning service for this configuration
pub fn build_service(config: &AppConfig) -> Result<Box<dyn ReasoningService>> {
    if config.execution.dry_run {
        log::info!("[Analyze] Dry run: stages answer with placeholder text");
        return Ok(Box::new(ScriptedService::placeholder()));
    }

    let secrets = SecretsConfig::load().context("Failed to load secrets")?;
    let settings = LlmSettings::resolve(&config.llm, &secrets)?;
    if !settings.has_usable_key() {
        log::warn!(
            "[Analyze] No API key for provider '{}'; every stage will fail",
            settings.provider_id
        );
    }
    log::info!(
        "[Analyze] Using {} model {} at {}",
        settings.provider_id,
        settings.model,
        settings.base_url
    );

    let client = OpenAiCompatibleClient::new(settings)
        .context("Failed to create reasoning client")?;
    Ok(Box::new(client))
}

/// Run `analyze` with the configured service and chart renderer, then open
/// the report when configured to
pub fn analyze(config: &AppConfig, request: &AnalyzeRequest) -> Result<AnalyzeOutcome> {
    let service = build_service(config)?;
    let renderer = PlottersChartRenderer::new();
    let outcome = analyze_with(config, request, service.as_ref(), &renderer)?;

    if let AnalyzeOutcome::Full { report_path, .. } = &outcome {
        if config.report.open_in_browser {
            if let Err(e) = open_in_viewer(report_path) {
                log::warn!("[Analyze] {}", e);
            }
        }
    }

    Ok(outcome)
}

/// Run `analyze` against explicit service and renderer implementations.
/// Never opens a viewer.
pub fn analyze_with(
    config: &AppConfig,
    request: &AnalyzeRequest,
    service: &dyn ReasoningService,
    renderer: &dyn ChartRenderer,
) -> Result<AnalyzeOutcome> {
    let store = IdeaStore::new(&config.storage.ideas_file);
    let idea = store
        .append(&request.idea)
        .with_context(|| format!("Failed to store idea in {:?}", store.path()))?;

    let catalog = default_catalog();
    let orchestrator = PipelineOrchestrator::new(service);

    if request.depth == AnalysisDepth::Quick {
        let run = orchestrator.run_quick(&idea, &catalog);
        let first = catalog.first();
        let text = run
            .stage_results
            .get(&first.name)
            .cloned()
            .unwrap_or_default();
        return Ok(AnalyzeOutcome::Quick {
            failed: !run.failed_stages.is_empty(),
            idea,
            stage_title: first.title.clone(),
            text,
        });
    }

    let run = orchestrator.run(&idea, &catalog);
    let failed_stages = run.failed_stages.clone();
    let mut report_data = run.into_report();

    let specs = chart_specs(extract_all(&report_data.stage_results));
    let artifact = report::render(
        &report_data.summary_text,
        &report_data.stage_results,
        &specs,
        renderer,
        &config.report.output_dir,
    )
    .context("Failed to render report")?;
    report_data.chart_files = artifact.chart_files.clone();

    let report_path = report::write_report(&artifact, &config.report.report_file)
        .context("Failed to write report")?;

    Ok(AnalyzeOutcome::Full {
        idea,
        report_path,
        chart_files: report_data.chart_files,
        skipped_charts: artifact.skipped,
        failed_stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage_keys;
    use crate::report::{ChartError, ChartSpec};
    use std::path::Path;
    use tempfile::TempDir;

    struct TouchRenderer;

    impl ChartRenderer for TouchRenderer {
        fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), ChartError> {
            std::fs::write(path, b"png").map_err(|e| ChartError::Render {
                chart: spec.file_name().to_string(),
                message: e.to_string(),
            })
        }

        fn name(&self) -> &str {
            "touch"
        }
    }

    fn config_in(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.ideas_file = dir.join("ideas.json");
        config.report.output_dir = dir.join("visualizations");
        config.report.report_file = dir.join("product_report.html");
        config.report.open_in_browser = false;
        config.execution.dry_run = true;
        config
    }

    #[test]
    fn test_quick_analysis_runs_one_stage_and_writes_no_report() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let service = ScriptedService::always("TAM: $150 million");
        let request = AnalyzeRequest {
            idea: "Smart plant pot".to_string(),
            depth: AnalysisDepth::Quick,
        };

        let outcome = analyze_with(&config, &request, &service, &TouchRenderer).unwrap();

        match outcome {
            AnalyzeOutcome::Quick { idea, text, failed, .. } => {
                assert_eq!(idea.text, "Smart plant pot");
                assert_eq!(text, "TAM: $150 million");
                assert!(!failed);
            }
            other => panic!("expected quick outcome, got {:?}", other),
        }
        assert_eq!(service.calls().len(), 1);
        assert!(!config.report.report_file.exists());
    }

    #[test]
    fn test_full_analysis_writes_report_and_charts() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let service = ScriptedService::always("TAM: $150 million");
        let request = AnalyzeRequest {
            idea: "Smart plant pot".to_string(),
            depth: AnalysisDepth::Full,
        };

        let outcome = analyze_with(&config, &request, &service, &TouchRenderer).unwrap();

        match outcome {
            AnalyzeOutcome::Full {
                report_path,
                chart_files,
                skipped_charts,
                failed_stages,
                ..
            } => {
                assert_eq!(report_path, config.report.report_file);
                assert_eq!(chart_files.len(), 8);
                assert!(skipped_charts.is_empty());
                assert!(failed_stages.is_empty());
                let html = std::fs::read_to_string(report_path).unwrap();
                assert!(html.contains(stage_keys::MARKET_RESEARCH));
            }
            other => panic!("expected full outcome, got {:?}", other),
        }
        assert_eq!(service.calls().len(), default_catalog().len());
        assert_eq!(list_stored(&config), vec!["Smart plant pot".to_string()]);
    }

    #[test]
    fn test_empty_idea_is_a_hard_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let service = ScriptedService::placeholder();
        let request = AnalyzeRequest {
            idea: "   ".to_string(),
            depth: AnalysisDepth::Full,
        };

        assert!(analyze_with(&config, &request, &service, &TouchRenderer).is_err());
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_dry_run_builds_offline_service() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let service = build_service(&config).unwrap();
        assert!(service.execute("prompt", "role").is_ok());
    }

    fn list_stored(config: &AppConfig) -> Vec<String> {
        IdeaStore::new(&config.storage.ideas_file)
            .read_all()
            .unwrap()
            .into_iter()
            .map(|idea| idea.text)
            .collect()
    }
}
