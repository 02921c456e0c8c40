//! Extraction layer
//!
//! Best-effort recovery of chart data from free-text stage results. Each
//! category module exposes `extract(text)`, which never fails: fields no
//! pattern matches keep their defaults, and an internal error returns the
//! full default set for that category. Every field carries its provenance
//! so the report can tell scraped numbers from placeholders.

pub mod competitive;
pub mod customer;
pub mod financial;
pub mod kpi;
pub mod market;
pub mod marketing;
mod matcher;
mod numbers;
pub mod swot;
pub mod technical;

pub use matcher::{Hit, Matcher, MatcherChain};

use serde::Serialize;
use thiserror::Error;

use crate::models::StageResults;
use crate::pipeline::stage_keys;

pub use competitive::CompetitiveSeries;
pub use customer::CustomerSeries;
pub use financial::FinancialSeries;
pub use kpi::KpiSeries;
pub use market::MarketSeries;
pub use marketing::MarketingSeries;
pub use swot::SwotSeries;
pub use technical::TechnicalSeries;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid pattern '{label}': {source}")]
    Pattern {
        label: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// A value together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Extracted<T> {
    /// Recovered from the stage text
    Found(T),
    /// Placeholder used because nothing matched
    Defaulted(T),
}

impl<T> Extracted<T> {
    /// `Found` when a value was recovered, otherwise the default
    pub fn or_default_with(found: Option<T>, default: impl FnOnce() -> T) -> Self {
        match found {
            Some(value) => Extracted::Found(value),
            None => Extracted::Defaulted(default()),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Extracted::Found(v) | Extracted::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Extracted::Found(v) | Extracted::Defaulted(v) => v,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Extracted::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        match self {
            Extracted::Found(v) => Extracted::Found(f(v)),
            Extracted::Defaulted(v) => Extracted::Defaulted(f(v)),
        }
    }
}

/// A labelled share or volume, one bar or slice of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

impl LabeledValue {
    pub fn new(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

pub(crate) fn labeled(pairs: &[(&str, f64)]) -> Vec<LabeledValue> {
    pairs
        .iter()
        .map(|(label, value)| LabeledValue::new(label, *value))
        .collect()
}

/// Per-field provenance of a category's series
pub trait Provenance {
    /// One flag per field, `true` when the field was found in the text
    fn field_flags(&self) -> Vec<bool>;

    fn found_fields(&self) -> usize {
        self.field_flags().into_iter().filter(|found| *found).count()
    }

    fn is_fully_defaulted(&self) -> bool {
        self.found_fields() == 0
    }
}

/// Chart categories, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Market,
    Competitive,
    Financial,
    Customer,
    Technical,
    Kpi,
    Swot,
    Marketing,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Market,
        Category::Competitive,
        Category::Financial,
        Category::Customer,
        Category::Technical,
        Category::Kpi,
        Category::Swot,
        Category::Marketing,
    ];

    /// Stage whose result feeds this category
    pub fn stage_key(self) -> &'static str {
        match self {
            Category::Market => stage_keys::MARKET_RESEARCH,
            Category::Competitive => stage_keys::COMPETITIVE_ANALYSIS,
            Category::Financial => stage_keys::FINANCIAL_PROJECTIONS,
            Category::Customer => stage_keys::CUSTOMER_SEGMENTATION,
            Category::Technical => stage_keys::TECHNICAL_FEASIBILITY,
            Category::Kpi => stage_keys::KPI_DEFINITION,
            Category::Swot => stage_keys::SWOT_ANALYSIS,
            Category::Marketing => stage_keys::MARKETING_STRATEGY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Market => "market",
            Category::Competitive => "competitive",
            Category::Financial => "financial",
            Category::Customer => "customer",
            Category::Technical => "technical",
            Category::Kpi => "kpi",
            Category::Swot => "swot",
            Category::Marketing => "marketing",
        }
    }
}

/// Structured data for one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", content = "series", rename_all = "snake_case")]
pub enum ExtractedSeries {
    Market(MarketSeries),
    Competitive(CompetitiveSeries),
    Financial(FinancialSeries),
    Customer(CustomerSeries),
    Technical(TechnicalSeries),
    Kpi(KpiSeries),
    Swot(SwotSeries),
    Marketing(MarketingSeries),
}

impl ExtractedSeries {
    pub fn category(&self) -> Category {
        match self {
            ExtractedSeries::Market(_) => Category::Market,
            ExtractedSeries::Competitive(_) => Category::Competitive,
            ExtractedSeries::Financial(_) => Category::Financial,
            ExtractedSeries::Customer(_) => Category::Customer,
            ExtractedSeries::Technical(_) => Category::Technical,
            ExtractedSeries::Kpi(_) => Category::Kpi,
            ExtractedSeries::Swot(_) => Category::Swot,
            ExtractedSeries::Marketing(_) => Category::Marketing,
        }
    }

    fn provenance(&self) -> &dyn Provenance {
        match self {
            ExtractedSeries::Market(s) => s,
            ExtractedSeries::Competitive(s) => s,
            ExtractedSeries::Financial(s) => s,
            ExtractedSeries::Customer(s) => s,
            ExtractedSeries::Technical(s) => s,
            ExtractedSeries::Kpi(s) => s,
            ExtractedSeries::Swot(s) => s,
            ExtractedSeries::Marketing(s) => s,
        }
    }

    pub fn found_fields(&self) -> usize {
        self.provenance().found_fields()
    }

    pub fn field_count(&self) -> usize {
        self.provenance().field_flags().len()
    }

    pub fn is_fully_defaulted(&self) -> bool {
        self.provenance().is_fully_defaulted()
    }
}

/// Extract one category from raw stage text
pub fn extract(category: Category, text: &str) -> ExtractedSeries {
    match category {
        Category::Market => ExtractedSeries::Market(market::extract(text)),
        Category::Competitive => ExtractedSeries::Competitive(competitive::extract(text)),
        Category::Financial => ExtractedSeries::Financial(financial::extract(text)),
        Category::Customer => ExtractedSeries::Customer(customer::extract(text)),
        Category::Technical => ExtractedSeries::Technical(technical::extract(text)),
        Category::Kpi => ExtractedSeries::Kpi(kpi::extract(text)),
        Category::Swot => ExtractedSeries::Swot(swot::extract(text)),
        Category::Marketing => ExtractedSeries::Marketing(marketing::extract(text)),
    }
}

/// Extract every category from the stage results of a run. Missing stages
/// are treated as empty text and yield defaults.
pub fn extract_all(stage_results: &StageResults) -> Vec<ExtractedSeries> {
    Category::ALL
        .iter()
        .map(|category| {
            let text = stage_results
                .get(category.stage_key())
                .map(String::as_str)
                .unwrap_or("");
            let series = extract(*category, text);
            log::info!(
                "[Extraction] {}: {} of {} fields found",
                category.as_str(),
                series.found_fields(),
                series.field_count()
            );
            series
        })
        .collect()
}

/// Collapse an extraction attempt into a value, logging and defaulting on error
pub(crate) fn or_defaults<T: Default>(category: Category, attempt: Result<T, ExtractionError>) -> T {
    match attempt {
        Ok(series) => series,
        Err(e) => {
            log::warn!(
                "[Extraction] {} extraction failed, using defaults: {}",
                category.as_str(),
                e
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_accessors() {
        let found = Extracted::or_default_with(Some(3), || 0);
        let defaulted = Extracted::or_default_with(None, || 7);

        assert!(found.is_found());
        assert_eq!(*found.value(), 3);
        assert!(!defaulted.is_found());
        assert_eq!(defaulted.map(|v| v * 2).into_value(), 14);
    }

    #[test]
    fn test_extracted_serializes_with_source_tag() {
        let json = serde_json::to_value(Extracted::Found(1.5)).unwrap();
        assert_eq!(json["source"], "found");
        assert_eq!(json["value"], 1.5);
    }

    #[test]
    fn test_category_stage_keys_are_distinct() {
        for (i, a) in Category::ALL.iter().enumerate() {
            for b in &Category::ALL[i + 1..] {
                assert_ne!(a.stage_key(), b.stage_key());
            }
        }
    }

    #[test]
    fn test_extract_all_on_empty_results_is_all_defaults() {
        let series = extract_all(&StageResults::new());

        assert_eq!(series.len(), Category::ALL.len());
        assert!(series.iter().all(|s| s.is_fully_defaulted()));
        let categories: Vec<Category> = series.iter().map(|s| s.category()).collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_extract_all_reads_stage_by_key() {
        let mut results = StageResults::new();
        results.insert(
            stage_keys::MARKET_RESEARCH.to_string(),
            "TAM: $150 million".to_string(),
        );

        let series = extract_all(&results);
        assert!(!series[0].is_fully_defaulted());
        assert!(series[1..].iter().all(|s| s.is_fully_defaulted()));
    }
}
