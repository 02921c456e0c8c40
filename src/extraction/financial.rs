//! Financial projection extraction
//!
//! First-year revenue and cost totals are spread over twelve months: revenue
//! ramps linearly (month i gets (i+1)/78 of the annual total), costs are flat.

use serde::Serialize;

use super::matcher::{Matcher, MatcherChain};
use super::numbers::{parse_number, round_to, thousands};
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DEFAULT_REVENUE: [f64; 12] = [
    10.0, 15.0, 25.0, 35.0, 50.0, 65.0, 80.0, 95.0, 110.0, 125.0, 140.0, 160.0,
];
const DEFAULT_COSTS: [f64; 12] = [
    30.0, 28.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0,
];
const DEFAULT_BREAK_EVEN_MONTH: u32 = 5;
const MAX_BREAK_EVEN_MONTH: f64 = 120.0;

/// Sum of the ramp weights 1..=12
const RAMP_TOTAL: f64 = 78.0;

/// Monthly figures in $000
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSeries {
    pub months: Vec<String>,
    pub revenue: Extracted<Vec<f64>>,
    pub costs: Extracted<Vec<f64>>,
    pub break_even_month: Extracted<u32>,
}

impl Default for FinancialSeries {
    fn default() -> Self {
        Self {
            months: month_labels(),
            revenue: Extracted::Defaulted(DEFAULT_REVENUE.to_vec()),
            costs: Extracted::Defaulted(DEFAULT_COSTS.to_vec()),
            break_even_month: Extracted::Defaulted(DEFAULT_BREAK_EVEN_MONTH),
        }
    }
}

impl FinancialSeries {
    /// Revenue minus costs, month by month
    pub fn profit(&self) -> Vec<f64> {
        self.revenue
            .value()
            .iter()
            .zip(self.costs.value())
            .map(|(revenue, cost)| round_to(revenue - cost, 2))
            .collect()
    }
}

impl Provenance for FinancialSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![
            self.revenue.is_found(),
            self.costs.is_found(),
            self.break_even_month.is_found(),
        ]
    }
}

fn month_labels() -> Vec<String> {
    MONTHS.iter().map(|m| m.to_string()).collect()
}

fn ramp(annual: f64) -> Vec<f64> {
    (0..12)
        .map(|i| round_to(annual * (i as f64 + 1.0) / RAMP_TOTAL, 2))
        .collect()
}

fn flat(annual: f64) -> Vec<f64> {
    vec![round_to(annual / 12.0, 2); 12]
}

fn annual_chain(label: &str) -> Result<MatcherChain<f64>, ExtractionError> {
    let first_year = r"(?:year[ \t]*1|first[ \t]+year|annual|yearly)";
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "first_year_then_label",
            &format!(
                r"(?i)\b{}[^\n$]{{0,40}}\b{}[^\n$]{{0,30}}\$[ \t]*%NUM%[ \t]*%UNIT%",
                first_year, label
            ),
            |caps| thousands(caps, 1, 2),
        )?,
        Matcher::new(
            "label_then_first_year",
            &format!(
                r"(?i)\b{}[^\n$]{{0,40}}{}[^\n$]{{0,20}}\$[ \t]*%NUM%[ \t]*%UNIT%",
                label, first_year
            ),
            |caps| thousands(caps, 1, 2),
        )?,
        Matcher::new(
            "label_amount",
            &format!(r"(?i)\b{}\b[^\n$]{{0,40}}\$[ \t]*%NUM%[ \t]*%UNIT%", label),
            |caps| thousands(caps, 1, 2),
        )?,
    ]))
}

fn break_even_chain() -> Result<MatcherChain<u32>, ExtractionError> {
    let label = r"(?i)break[- ]?even\b[^\n\d]{0,40}";
    let months = |factor: f64| {
        move |caps: &regex::Captures<'_>| {
            parse_number(caps.get(1)?.as_str())
                .map(|n| n * factor)
                .filter(|m| *m >= 1.0 && *m <= MAX_BREAK_EVEN_MONTH)
                .map(|m| m.round() as u32)
        }
    };
    Ok(MatcherChain::new(vec![
        Matcher::new("month_n", &format!(r"{}month[ \t]*%NUM%", label), months(1.0))?,
        Matcher::new("n_months", &format!(r"{}%NUM%[ \t]*months?\b", label), months(1.0))?,
        Matcher::new("year_n", &format!(r"{}year[ \t]*%NUM%", label), months(12.0))?,
        Matcher::new("n_years", &format!(r"{}%NUM%[ \t]*years?\b", label), months(12.0))?,
    ]))
}

fn try_extract(text: &str) -> Result<FinancialSeries, ExtractionError> {
    let revenue = annual_chain(r"(?:revenues?|sales)")?.first_match(text);
    let costs = annual_chain(r"(?:costs?|expenses|operating\s+expenses|burn)")?.first_match(text);
    let break_even = break_even_chain()?.first_match(text);

    Ok(FinancialSeries {
        months: month_labels(),
        revenue: Extracted::or_default_with(revenue.map(ramp), || DEFAULT_REVENUE.to_vec()),
        costs: Extracted::or_default_with(costs.map(flat), || DEFAULT_COSTS.to_vec()),
        break_even_month: Extracted::or_default_with(break_even, || DEFAULT_BREAK_EVEN_MONTH),
    })
}

pub fn extract(text: &str) -> FinancialSeries {
    or_defaults(Category::Financial, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_figures_spread_over_months() {
        let text = "Year 1 revenue: $780K\nOperating costs of $1.2 million per year\nWe expect to break even in month 9.";
        let series = extract(text);

        assert_eq!(series.revenue.value()[0], 10.0);
        assert_eq!(series.revenue.value()[11], 120.0);
        assert_eq!(series.costs.value(), &vec![100.0; 12]);
        assert_eq!(*series.break_even_month.value(), 9);
        assert_eq!(series.found_fields(), 3);
    }

    #[test]
    fn test_break_even_in_years() {
        let series = extract("Break-even expected within 2 years.");
        assert_eq!(series.break_even_month, Extracted::Found(24));
        assert!(!series.revenue.is_found());
    }

    #[test]
    fn test_break_even_months_phrase() {
        let series = extract("Breakeven after 18 months of operation");
        assert_eq!(*series.break_even_month.value(), 18);
    }

    #[test]
    fn test_profit_is_revenue_minus_cost() {
        let series = FinancialSeries::default();
        let profit = series.profit();
        assert_eq!(profit[0], -20.0);
        assert_eq!(profit[11], 80.0);
    }

    #[test]
    fn test_defaults() {
        let series = extract("");
        assert!(series.is_fully_defaulted());
        assert_eq!(series.months.len(), 12);
        assert_eq!(series.revenue.value().len(), 12);
        assert_eq!(*series.break_even_month.value(), DEFAULT_BREAK_EVEN_MONTH);
    }
}
