//! KPI extraction
//!
//! Six fixed metrics. For each one a target chain and a current-value chain
//! run against the text; values failing the metric's validation are ignored.

use serde::Serialize;

use super::matcher::{Matcher, MatcherChain};
use super::numbers::{parse_number, round_to, unit_multiplier};
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    Currency,
    Count,
    Percent,
    /// Rating out of 5
    Score,
}

impl KpiKind {
    fn accepts(self, value: f64, scaled: bool) -> bool {
        match self {
            KpiKind::Currency | KpiKind::Count => value > 0.0,
            KpiKind::Percent => !scaled && (0.0..=100.0).contains(&value),
            KpiKind::Score => !scaled && value > 0.0 && value <= 5.0,
        }
    }
}

struct KpiSpec {
    key: &'static str,
    label: &'static str,
    pattern: &'static str,
    unit: &'static str,
    current: f64,
    target: f64,
    kind: KpiKind,
    lower_is_better: bool,
}

const SPECS: [KpiSpec; 6] = [
    KpiSpec {
        key: "revenue",
        label: "Monthly Revenue",
        pattern: r"(?:(?:monthly\s+)?revenue|mrr|arr)",
        unit: "$",
        current: 85_000.0,
        target: 100_000.0,
        kind: KpiKind::Currency,
        lower_is_better: false,
    },
    KpiSpec {
        key: "users",
        label: "Active Users",
        pattern: r"(?:(?:active\s+)?users|customers|subscribers)",
        unit: "",
        current: 2_450.0,
        target: 3_000.0,
        kind: KpiKind::Count,
        lower_is_better: false,
    },
    KpiSpec {
        key: "conversion",
        label: "Conversion Rate",
        pattern: r"conversion(?:\s+rate)?",
        unit: "%",
        current: 3.2,
        target: 4.0,
        kind: KpiKind::Percent,
        lower_is_better: false,
    },
    KpiSpec {
        key: "retention",
        label: "Customer Retention",
        pattern: r"retention(?:\s+rate)?",
        unit: "%",
        current: 78.0,
        target: 85.0,
        kind: KpiKind::Percent,
        lower_is_better: false,
    },
    KpiSpec {
        key: "satisfaction",
        label: "Customer Satisfaction",
        pattern: r"(?:(?:customer\s+)?satisfaction(?:\s+score)?|csat)",
        unit: "/5",
        current: 4.2,
        target: 4.5,
        kind: KpiKind::Score,
        lower_is_better: false,
    },
    KpiSpec {
        key: "churn",
        label: "Churn Rate",
        pattern: r"churn(?:\s+rate)?",
        unit: "%",
        current: 8.5,
        target: 6.0,
        kind: KpiKind::Percent,
        lower_is_better: true,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetric {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub kind: KpiKind,
    pub current: Extracted<f64>,
    pub target: Extracted<f64>,
    /// Progress is target/current rather than current/target
    pub lower_is_better: bool,
}

impl KpiMetric {
    fn defaulted(spec: &KpiSpec) -> Self {
        Self {
            key: spec.key.to_string(),
            label: spec.label.to_string(),
            unit: spec.unit.to_string(),
            kind: spec.kind,
            current: Extracted::Defaulted(spec.current),
            target: Extracted::Defaulted(spec.target),
            lower_is_better: spec.lower_is_better,
        }
    }

    /// Progress towards the target in percent, clamped to 0..=100
    pub fn progress(&self) -> f64 {
        let (current, target) = (*self.current.value(), *self.target.value());
        let (numerator, denominator) = if self.lower_is_better {
            (target, current)
        } else {
            (current, target)
        };
        if denominator <= 0.0 {
            return 0.0;
        }
        round_to((numerator / denominator * 100.0).clamp(0.0, 100.0), 1)
    }

    /// Format a value of this metric for display
    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            KpiKind::Currency if value >= 1e6 => format!("${:.1}M", value / 1e6),
            KpiKind::Currency if value >= 1e3 => format!("${:.0}K", value / 1e3),
            KpiKind::Currency => format!("${:.0}", value),
            KpiKind::Count => format!("{:.0}", value),
            KpiKind::Percent => format!("{:.1}%", value),
            KpiKind::Score => format!("{:.1}/5", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSeries {
    pub metrics: Vec<KpiMetric>,
}

impl Default for KpiSeries {
    fn default() -> Self {
        Self {
            metrics: SPECS.iter().map(KpiMetric::defaulted).collect(),
        }
    }
}

impl KpiSeries {
    pub fn get(&self, key: &str) -> Option<&KpiMetric> {
        self.metrics.iter().find(|m| m.key == key)
    }
}

impl Provenance for KpiSeries {
    fn field_flags(&self) -> Vec<bool> {
        self.metrics
            .iter()
            .flat_map(|m| [m.current.is_found(), m.target.is_found()])
            .collect()
    }
}

/// Parse a number group with its scale group, validated for the metric kind
fn kpi_value(
    caps: &regex::Captures<'_>,
    number_group: usize,
    scale_group: usize,
    kind: KpiKind,
) -> Option<f64> {
    let number = parse_number(caps.get(number_group)?.as_str())?;
    let scale = caps
        .get(scale_group)
        .and_then(|m| unit_multiplier(m.as_str()));
    let value = number * scale.unwrap_or(1.0);
    Some(value).filter(|v| kind.accepts(*v, scale.is_some()))
}

fn target_chain(spec: &KpiSpec) -> Result<MatcherChain<f64>, ExtractionError> {
    let label = spec.pattern;
    let kind = spec.kind;
    let value = move |n: usize, s: usize| move |caps: &regex::Captures<'_>| kpi_value(caps, n, s, kind);
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "label_target",
            &format!(
                r"(?i)\b{}\b[^\n]{{0,40}}?\b(?:target|goal)\b[^\d\n]{{0,20}}\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "target_label",
            &format!(
                r"(?i)\b(?:target|goal)\b[^\n\d]{{0,20}}?\b{}\b[^\d\n]{{0,20}}\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "label_direction",
            &format!(
                r"(?i)\b{}\b[^\n\d]{{0,40}}?\b(?:to|reach|above|below|exceed|at\s+least)\b[^\d\n]{{0,10}}\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "label_from_to",
            &format!(
                r"(?i)\b{}\b[^\n\d]{{0,40}}?\bfrom[ \t]+\$?%NUM%[ \t]*%SCALE%[^\n\d]{{0,10}}?\bto[ \t]+\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(3, 4),
        )?,
    ]))
}

fn current_chain(spec: &KpiSpec) -> Result<MatcherChain<f64>, ExtractionError> {
    let label = spec.pattern;
    let kind = spec.kind;
    let value = move |n: usize, s: usize| move |caps: &regex::Captures<'_>| kpi_value(caps, n, s, kind);
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "value_then_current",
            &format!(
                r"(?i)\b{}\b[^\n\d]{{0,20}}?\$?%NUM%[ \t]*%SCALE%[^\n\d]{{0,20}}?\bcurrent(?:ly)?\b",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "label_current",
            &format!(
                r"(?i)\b{}\b[^\n]{{0,40}}?\b(?:current(?:ly)?|baseline)\b[^\d\n]{{0,20}}\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "current_label",
            &format!(
                r"(?i)\bcurrent(?:ly)?\b[^\n\d]{{0,20}}?\b{}\b[^\d\n]{{0,20}}\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "label_from",
            &format!(
                r"(?i)\b{}\b[^\n\d]{{0,40}}?\bfrom[ \t]+\$?%NUM%[ \t]*%SCALE%",
                label
            ),
            value(1, 2),
        )?,
        Matcher::new(
            "value_before_target",
            &format!(
                r"(?i)\b{}\b[^\n\d]{{0,20}}?\$?%NUM%[ \t]*%SCALE%[^\n\d]{{0,30}}?\b(?:target|goal)\b",
                label
            ),
            value(1, 2),
        )?,
    ]))
}

fn extract_metric(spec: &KpiSpec, text: &str) -> Result<KpiMetric, ExtractionError> {
    let target = target_chain(spec)?.first_match(text);
    let current = current_chain(spec)?.first_match(text);
    Ok(KpiMetric {
        current: Extracted::or_default_with(current, || spec.current),
        target: Extracted::or_default_with(target, || spec.target),
        ..KpiMetric::defaulted(spec)
    })
}

fn try_extract(text: &str) -> Result<KpiSeries, ExtractionError> {
    let metrics = SPECS
        .iter()
        .map(|spec| extract_metric(spec, text))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(KpiSeries { metrics })
}

pub fn extract(text: &str) -> KpiSeries {
    or_defaults(Category::Kpi, try_extract(text))
}
