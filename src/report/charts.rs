//! Chart specifications and the rendering seam

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::extraction::{Category, ExtractedSeries};
use crate::utils::title_from_key;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to render chart '{chart}': {message}")]
    Render { chart: String, message: String },
}

/// The fixed set of report charts, one per extraction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    MarketSize,
    CompetitivePositioning,
    FinancialProjections,
    CustomerSegmentation,
    ImplementationTimeline,
    KpiDashboard,
    Swot,
    MarketingBudget,
}

impl ChartKind {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Market => ChartKind::MarketSize,
            Category::Competitive => ChartKind::CompetitivePositioning,
            Category::Financial => ChartKind::FinancialProjections,
            Category::Customer => ChartKind::CustomerSegmentation,
            Category::Technical => ChartKind::ImplementationTimeline,
            Category::Kpi => ChartKind::KpiDashboard,
            Category::Swot => ChartKind::Swot,
            Category::Marketing => ChartKind::MarketingBudget,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::MarketSize => "market_size_analysis.png",
            ChartKind::CompetitivePositioning => "competitive_positioning.png",
            ChartKind::FinancialProjections => "financial_projections.png",
            ChartKind::CustomerSegmentation => "customer_segmentation.png",
            ChartKind::ImplementationTimeline => "implementation_timeline.png",
            ChartKind::KpiDashboard => "kpi_dashboard.png",
            ChartKind::Swot => "swot_analysis.png",
            ChartKind::MarketingBudget => "marketing_budget.png",
        }
    }

    pub const ALL: [ChartKind; 8] = [
        ChartKind::MarketSize,
        ChartKind::CompetitivePositioning,
        ChartKind::FinancialProjections,
        ChartKind::CustomerSegmentation,
        ChartKind::ImplementationTimeline,
        ChartKind::KpiDashboard,
        ChartKind::Swot,
        ChartKind::MarketingBudget,
    ];
}

/// Display title for a chart file. Known chart files have fixed titles;
/// anything else is titled from its file stem.
pub fn chart_title(file_name: &str) -> String {
    let known = match file_name {
        "market_size_analysis.png" => Some("Market Size Analysis (TAM/SAM/SOM)"),
        "competitive_positioning.png" => Some("Competitive Positioning Map"),
        "financial_projections.png" => Some("Financial Projections"),
        "customer_segmentation.png" => Some("Customer Segmentation Analysis"),
        "implementation_timeline.png" => Some("Implementation Timeline"),
        "kpi_dashboard.png" => Some("KPI Dashboard"),
        "swot_analysis.png" => Some("SWOT Analysis"),
        "marketing_budget.png" => Some("Marketing Budget Allocation"),
        _ => None,
    };
    known
        .map(str::to_string)
        .unwrap_or_else(|| title_from_key(file_name))
}

/// Everything needed to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub series: ExtractedSeries,
    /// Every field fell back to its default
    pub illustrative: bool,
}

impl ChartSpec {
    pub fn new(series: ExtractedSeries) -> Self {
        Self {
            kind: ChartKind::for_category(series.category()),
            illustrative: series.is_fully_defaulted(),
            series,
        }
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    pub fn title(&self) -> String {
        chart_title(self.file_name())
    }
}

/// One spec per extracted series, in report order
pub fn chart_specs(series: Vec<ExtractedSeries>) -> Vec<ChartSpec> {
    series.into_iter().map(ChartSpec::new).collect()
}

/// Draws a chart spec into an image file
pub trait ChartRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), ChartError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{extract, extract_all};
    use crate::StageResults;

    #[test]
    fn test_chart_title_lookup_and_fallback() {
        assert_eq!(chart_title("kpi_dashboard.png"), "KPI Dashboard");
        assert_eq!(chart_title("churn_breakdown.png"), "Churn Breakdown");
    }

    #[test]
    fn test_file_names_are_unique() {
        for (i, a) in ChartKind::ALL.iter().enumerate() {
            for b in &ChartKind::ALL[i + 1..] {
                assert_ne!(a.file_name(), b.file_name());
            }
        }
    }

    #[test]
    fn test_spec_marks_defaulted_series_illustrative() {
        let defaulted = ChartSpec::new(extract(Category::Market, ""));
        let found = ChartSpec::new(extract(Category::Market, "TAM: $150 million"));

        assert_eq!(defaulted.kind, ChartKind::MarketSize);
        assert!(defaulted.illustrative);
        assert!(!found.illustrative);
        assert_eq!(found.title(), "Market Size Analysis (TAM/SAM/SOM)");
    }

    #[test]
    fn test_chart_specs_cover_every_category() {
        let specs = chart_specs(extract_all(&StageResults::new()));
        let kinds: Vec<ChartKind> = specs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
    }
}
