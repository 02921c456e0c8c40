use std::path::Path;

use product_analysis_lib::extraction::extract_all;
use product_analysis_lib::pipeline::stage_keys;
use product_analysis_lib::report::{
    self, chart_specs, ChartError, ChartRenderer, ChartSpec, REPORT_TITLE,
};
use product_analysis_lib::StageResults;
use tempfile::TempDir;

/// Writes a tiny file per chart, failing on chart names it was told to
struct StubRenderer {
    failing: Vec<&'static str>,
}

impl ChartRenderer for StubRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), ChartError> {
        if self.failing.contains(&spec.file_name()) {
            return Err(ChartError::Render {
                chart: spec.file_name().to_string(),
                message: "font not found".to_string(),
            });
        }
        std::fs::write(path, [0x89, b'P', b'N', b'G']).map_err(|e| ChartError::Render {
            chart: spec.file_name().to_string(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn stage_results() -> StageResults {
    let mut results = StageResults::new();
    results.insert(
        stage_keys::MARKET_RESEARCH.to_string(),
        "TAM: $150 million".to_string(),
    );
    results.insert(
        stage_keys::COMPETITIVE_ANALYSIS.to_string(),
        "Acme holds 30% market share".to_string(),
    );
    results
}

#[test]
fn zero_charts_still_renders_sections_and_visualizations() {
    let temp_dir = TempDir::new().unwrap();
    let renderer = StubRenderer { failing: vec![] };

    let artifact = report::render(
        "Launch in Q3.",
        &stage_results(),
        &[],
        &renderer,
        &temp_dir.path().join("charts"),
    )
    .unwrap();

    assert!(artifact.chart_files.is_empty());
    assert!(artifact.html.contains(REPORT_TITLE));
    assert!(artifact.html.contains("Launch in Q3."));
    assert!(artifact.html.contains(r#"<section id="market_research">"#));
    assert!(artifact.html.contains(r#"<section id="competitive_analysis">"#));
    assert!(artifact.html.contains(r#"<section id="visualizations">"#));
    assert!(artifact.html.contains("No charts were generated."));
}

#[test]
fn every_chart_is_written_and_embedded() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("charts");
    let specs = chart_specs(extract_all(&stage_results()));

    let artifact = report::render(
        "Summary",
        &stage_results(),
        &specs,
        &StubRenderer { failing: vec![] },
        &output_dir,
    )
    .unwrap();

    assert_eq!(artifact.chart_files.len(), specs.len());
    assert!(artifact.chart_files.iter().all(|p| p.starts_with(&output_dir) && p.exists()));
    assert_eq!(artifact.html.matches("data:image/png;base64,").count(), specs.len());
    assert!(!artifact.html.contains("No charts were generated."));
}

#[test]
fn failing_charts_are_skipped_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let specs = chart_specs(extract_all(&stage_results()));
    let renderer = StubRenderer {
        failing: vec!["swot_analysis.png", "marketing_budget.png"],
    };

    let artifact =
        report::render("Summary", &stage_results(), &specs, &renderer, temp_dir.path()).unwrap();

    assert_eq!(
        artifact.skipped,
        vec!["swot_analysis.png".to_string(), "marketing_budget.png".to_string()]
    );
    assert_eq!(artifact.chart_files.len(), specs.len() - 2);
    assert!(!temp_dir.path().join("swot_analysis.png").exists());

    let path = report::write_report(&artifact, &temp_dir.path().join("product_report.html")).unwrap();
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains(&tera::escape_html("Market Size Analysis (TAM/SAM/SOM)")));
}
