//! Report renderer
//!
//! Turns a finished run into chart images plus one self-contained HTML file.
//! A chart that fails to render is logged and left out; the report itself
//! only fails on template or storage errors.

pub mod charts;
pub mod html;
mod opener;
pub mod plotting;

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::file_storage::{atomic_write, ensure_dir, StorageError};
use crate::models::StageResults;
use crate::pipeline::default_catalog;
use crate::utils::title_from_key;

pub use charts::{chart_specs, chart_title, ChartError, ChartKind, ChartRenderer, ChartSpec};
pub use html::{ChartImage, Section};
pub use opener::{find_opener, open_in_viewer};
pub use plotting::PlottersChartRenderer;

pub const REPORT_TITLE: &str = "Product Analysis Report";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to render report: {0}")]
    Template(String),

    #[error("Failed to open report: {0}")]
    Open(String),
}

/// The rendered report and what went into it
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub html: String,
    /// Chart images written to the output directory, in report order
    pub chart_files: Vec<PathBuf>,
    /// File names of charts that failed to render
    pub skipped: Vec<String>,
}

/// Section title for a stage key, from the stage catalog when it knows the key
pub fn section_title(key: &str) -> String {
    default_catalog()
        .get(key)
        .map(|stage| stage.title.clone())
        .unwrap_or_else(|| title_from_key(key))
}

/// Render every chart into `output_dir` and assemble the HTML report
pub fn render(
    summary: &str,
    stage_results: &StageResults,
    charts: &[ChartSpec],
    renderer: &dyn ChartRenderer,
    output_dir: &Path,
) -> Result<ReportArtifact, ReportError> {
    ensure_dir(output_dir)?;

    let mut images = Vec::new();
    let mut chart_files = Vec::new();
    let mut skipped = Vec::new();

    for spec in charts {
        match render_chart(spec, renderer, output_dir) {
            Ok((path, image)) => {
                log::info!("[Report] Chart written: {:?}", path);
                chart_files.push(path);
                images.push(image);
            }
            Err(message) => {
                log::warn!("[Report] Skipping chart {}: {}", spec.file_name(), message);
                skipped.push(spec.file_name().to_string());
            }
        }
    }

    let sections: Vec<Section> = stage_results
        .iter()
        .map(|(key, text)| Section {
            key: key.clone(),
            title: section_title(key),
            text: text.clone(),
        })
        .collect();

    let page = html::ReportPage {
        title: REPORT_TITLE,
        generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        summary,
        sections: &sections,
        charts: &images,
    };
    let html = html::render_page(&page).map_err(|e| ReportError::Template(e.to_string()))?;

    log::info!(
        "[Report] Assembled report: {} sections, {} charts, {} skipped",
        sections.len(),
        chart_files.len(),
        skipped.len()
    );

    Ok(ReportArtifact {
        html,
        chart_files,
        skipped,
    })
}

fn render_chart(
    spec: &ChartSpec,
    renderer: &dyn ChartRenderer,
    output_dir: &Path,
) -> Result<(PathBuf, ChartImage), String> {
    let path = output_dir.join(spec.file_name());
    renderer.render(spec, &path).map_err(|e| e.to_string())?;
    let bytes = std::fs::read(&path).map_err(|e| format!("failed to read {:?}: {}", path, e))?;
    let image = ChartImage {
        title: spec.title(),
        file_name: spec.file_name().to_string(),
        data_uri: html::data_uri(&path, &bytes),
        illustrative: spec.illustrative,
    };
    Ok((path, image))
}

/// Write the report HTML, returning the path written
pub fn write_report(artifact: &ReportArtifact, path: &Path) -> Result<PathBuf, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    atomic_write(path, artifact.html.as_bytes())?;
    log::info!("[Report] Report written to {:?}", path);
    Ok(path.to_path_buf())
}
