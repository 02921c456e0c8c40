//! Pipeline orchestrator
//!
//! Drives the stage runner across a catalog in order. Analysis stages run
//! one at a time; the first sees the idea text, the others only their own
//! template. The terminal stage then receives every earlier result. A failed
//! stage records its error sentinel and the run continues.

use chrono::Utc;
use uuid::Uuid;

use super::catalog::{StageCatalog, StageDefinition};
use super::runner::{StageOutcome, StageRunner};
use crate::agents::ReasoningService;
use crate::models::{Idea, PipelineRun, StageResults};
use crate::templates::{PriorStage, PromptContext};

/// Orchestrator for sequential stage execution
pub struct PipelineOrchestrator<'a> {
    runner: StageRunner<'a>,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(service: &'a dyn ReasoningService) -> Self {
        Self {
            runner: StageRunner::new(service),
        }
    }

    /// Run every stage of the catalog
    pub fn run(&self, idea: &Idea, catalog: &StageCatalog) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = catalog.len();

        log::info!(
            "[Orchestrator] Run {} started: {} stages via {}",
            run_id,
            total,
            self.runner.service_name()
        );

        let mut stage_results = StageResults::new();
        let mut failed_stages = Vec::new();

        let (synthesis, analysis) = catalog.split_synthesis();

        for (index, stage) in analysis.iter().enumerate() {
            let mut context = PromptContext::new();
            if index == 0 {
                context = context.with_idea(&idea.text);
            }
            let outcome = self.run_stage(index, total, stage, &context);
            record(&mut stage_results, &mut failed_stages, outcome);
        }

        let mut synthesis_context = PromptContext::new().with_prior_stages(prior_stages(
            analysis,
            &stage_results,
        ));
        if analysis.is_empty() {
            // A one-stage catalog: the synthesis stage is also the first stage
            synthesis_context = synthesis_context.with_idea(&idea.text);
        }
        let outcome = self.run_stage(total - 1, total, synthesis, &synthesis_context);
        record(&mut stage_results, &mut failed_stages, outcome);

        let finished_at = Utc::now();
        log::info!(
            "[Orchestrator] Run {} finished in {}s: {} of {} stages failed",
            run_id,
            (finished_at - started_at).num_seconds(),
            failed_stages.len(),
            total
        );

        PipelineRun {
            run_id,
            idea: idea.clone(),
            stage_results,
            failed_stages,
            synthesis_stage: Some(synthesis.name.clone()),
            started_at,
            finished_at,
        }
    }

    /// Run only the first stage (quick analysis)
    pub fn run_quick(&self, idea: &Idea, catalog: &StageCatalog) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!("[Orchestrator] Quick run {} started", run_id);

        let context = PromptContext::new().with_idea(&idea.text);
        let outcome = self.run_stage(0, 1, catalog.first(), &context);

        let mut stage_results = StageResults::new();
        let mut failed_stages = Vec::new();
        record(&mut stage_results, &mut failed_stages, outcome);

        PipelineRun {
            run_id,
            idea: idea.clone(),
            stage_results,
            failed_stages,
            synthesis_stage: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn run_stage(
        &self,
        index: usize,
        total: usize,
        stage: &StageDefinition,
        context: &PromptContext,
    ) -> StageOutcome {
        log::info!(
            "[Orchestrator] Stage {}/{} '{}' started",
            index + 1,
            total,
            stage.title
        );

        let outcome = self.runner.run(stage, context);

        match &outcome.error {
            None => log::info!(
                "[Orchestrator] Stage '{}' completed in {:.1}s ({} chars)",
                stage.title,
                outcome.duration_secs,
                outcome.raw_text.len()
            ),
            Some(error) => log::warn!(
                "[Orchestrator] Stage '{}' failed after {:.1}s: {}",
                stage.title,
                outcome.duration_secs,
                error
            ),
        }

        outcome
    }
}

fn record(stage_results: &mut StageResults, failed_stages: &mut Vec<String>, outcome: StageOutcome) {
    if !outcome.succeeded() {
        failed_stages.push(outcome.stage_name.clone());
    }
    stage_results.insert(outcome.stage_name, outcome.raw_text);
}

fn prior_stages(stages: &[StageDefinition], results: &StageResults) -> Vec<PriorStage> {
    stages
        .iter()
        .filter_map(|stage| {
            results.get(&stage.name).map(|text| PriorStage {
                name: stage.name.clone(),
                title: stage.title.clone(),
                text: text.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentPersona, ScriptedService};

    fn stage(name: &str, template: &str) -> StageDefinition {
        StageDefinition::new(
            name,
            &crate::title_from_key(name),
            AgentPersona::new(&format!("[{}]", name), "", ""),
            template,
            "text",
        )
    }

    fn catalog() -> StageCatalog {
        StageCatalog::new(vec![
            stage("intake", "Idea: {{ idea }}"),
            stage("market", "Market for the product"),
            stage(
                "synthesis",
                "{% for s in prior_stages %}[{{ s.name }}] {{ s.text }}\n{% endfor %}",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_results_in_catalog_order() {
        let service = ScriptedService::always("ok")
            .respond_to("[intake]", "structured")
            .respond_to("[market]", "TAM: $150 million");
        let run = PipelineOrchestrator::new(&service).run(&Idea::new("Plant pot"), &catalog());

        let keys: Vec<&str> = run.stage_results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["intake", "market", "synthesis"]);
        assert!(run.failed_stages.is_empty());
        assert_eq!(run.summary_text(), "ok");
        assert!(run.finished_at >= run.started_at);
    }

    #[test]
    fn test_only_first_stage_sees_idea() {
        let service = ScriptedService::always("ok");
        PipelineOrchestrator::new(&service).run(&Idea::new("Plant pot"), &catalog());

        let calls = service.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].prompt.starts_with("Idea: Plant pot"));
        assert!(!calls[1].prompt.contains("Plant pot"));
    }

    #[test]
    fn test_synthesis_receives_all_prior_results() {
        let service = ScriptedService::always("summary")
            .respond_to("[intake]", "structured")
            .fail_on("[market]", "timeout");
        let run = PipelineOrchestrator::new(&service).run(&Idea::new("Plant pot"), &catalog());

        assert_eq!(run.failed_stages, vec!["market".to_string()]);
        assert_eq!(run.stage_results["market"], "Error in Market: timeout");

        let synthesis_prompt = &service.calls()[2].prompt;
        assert!(synthesis_prompt.contains("[intake] structured"));
        assert!(synthesis_prompt.contains("[market] Error in Market: timeout"));
    }

    #[test]
    fn test_quick_run_executes_first_stage_only() {
        let service = ScriptedService::always("structured idea");
        let run = PipelineOrchestrator::new(&service).run_quick(&Idea::new("Plant pot"), &catalog());

        assert_eq!(service.calls().len(), 1);
        assert_eq!(run.stage_results.len(), 1);
        assert_eq!(run.stage_results["intake"], "structured idea");
        assert!(run.synthesis_stage.is_none());
    }

    #[test]
    fn test_single_stage_catalog_gets_idea() {
        let catalog = StageCatalog::new(vec![stage("only", "Idea: {{ idea }}")]).unwrap();
        let service = ScriptedService::always("done");
        let run = PipelineOrchestrator::new(&service).run(&Idea::new("Kite"), &catalog);

        assert_eq!(run.stage_results.len(), 1);
        assert!(service.calls()[0].prompt.starts_with("Idea: Kite"));
    }
}
