//! Customer segmentation extraction

use serde::Serialize;

use super::matcher::{Hit, Matcher};
use super::numbers::{clean_label, parse_number, percent};
use super::{labeled, or_defaults, Category, Extracted, ExtractionError, LabeledValue, Provenance};

pub const MAX_SEGMENTS: usize = 8;
/// Minimum distinct entries before a breakdown counts as found
const MIN_BREAKDOWN: usize = 2;
/// Minimum funnel stages mentioned before the funnel counts as found
const MIN_FUNNEL_STAGES: usize = 3;

pub const FUNNEL_STAGES: [&str; 5] = ["Awareness", "Interest", "Consideration", "Purchase", "Retention"];
const DEFAULT_FUNNEL: [f64; 5] = [100.0, 70.0, 45.0, 25.0, 20.0];

/// Words that mark a line as something other than a customer segment
const NON_SEGMENT_WORDS: [&str; 16] = [
    "awareness",
    "interest",
    "consideration",
    "purchase",
    "retention",
    "conversion",
    "churn",
    "growth",
    "margin",
    "share",
    "rate",
    "revenue",
    "income",
    "total",
    "age",
    "ages",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSeries {
    /// Segment shares in percent
    pub segments: Extracted<Vec<LabeledValue>>,
    pub age_groups: Extracted<Vec<LabeledValue>>,
    pub income_levels: Extracted<Vec<LabeledValue>>,
    /// Funnel volume per stage, relative to 100 at awareness
    pub funnel: Extracted<Vec<LabeledValue>>,
}

impl Default for CustomerSeries {
    fn default() -> Self {
        Self {
            segments: Extracted::Defaulted(default_segments()),
            age_groups: Extracted::Defaulted(default_age_groups()),
            income_levels: Extracted::Defaulted(default_income_levels()),
            funnel: Extracted::Defaulted(default_funnel()),
        }
    }
}

impl Provenance for CustomerSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![
            self.segments.is_found(),
            self.age_groups.is_found(),
            self.income_levels.is_found(),
            self.funnel.is_found(),
        ]
    }
}

fn default_segments() -> Vec<LabeledValue> {
    labeled(&[
        ("Tech Enthusiasts", 25.0),
        ("Business Professionals", 35.0),
        ("Cost-Conscious Users", 20.0),
        ("Premium Seekers", 15.0),
        ("Early Adopters", 5.0),
    ])
}

fn default_age_groups() -> Vec<LabeledValue> {
    labeled(&[
        ("18-25", 20.0),
        ("26-35", 40.0),
        ("36-45", 25.0),
        ("46-55", 10.0),
        ("55+", 5.0),
    ])
}

fn default_income_levels() -> Vec<LabeledValue> {
    labeled(&[
        ("<$50K", 15.0),
        ("$50K-$75K", 30.0),
        ("$75K-$100K", 35.0),
        ("$100K+", 20.0),
    ])
}

fn default_funnel() -> Vec<LabeledValue> {
    FUNNEL_STAGES
        .iter()
        .zip(DEFAULT_FUNNEL)
        .map(|(stage, value)| LabeledValue::new(stage, value))
        .collect()
}

fn is_segment_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    label.len() >= 3
        && !lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| NON_SEGMENT_WORDS.contains(&word))
}

fn segment_matcher() -> Result<Matcher<LabeledValue>, ExtractionError> {
    Matcher::new(
        "segment",
        r"(?m)^[ \t]*(?:[-*•+][ \t]*|\d+[.)][ \t]*)?\**([A-Za-z][A-Za-z&/' -]{2,40}?)\**[ \t]*(?::|[-–][ \t]|\()[^\n%]{0,30}?%NUM%[ \t]*%",
        |caps| {
            let label = clean_label(caps.get(1)?.as_str());
            if !is_segment_label(&label) {
                return None;
            }
            Some(LabeledValue {
                label,
                value: percent(caps, 2)?,
            })
        },
    )
}

fn age_matchers() -> Result<Vec<Matcher<LabeledValue>>, ExtractionError> {
    Ok(vec![
        Matcher::new(
            "age_range",
            r"\b(\d{2})[ \t]*[-–][ \t]*(\d{2})\b[^\n\d%]{0,30}?%NUM%[ \t]*%",
            |caps| {
                let low: u32 = caps.get(1)?.as_str().parse().ok()?;
                let high: u32 = caps.get(2)?.as_str().parse().ok()?;
                if low >= high || low < 10 {
                    return None;
                }
                Some(LabeledValue {
                    label: format!("{}-{}", low, high),
                    value: percent(caps, 3)?,
                })
            },
        )?,
        Matcher::new(
            "age_open",
            r"\b(\d{2})[ \t]*\+[^\n\d%]{0,30}?%NUM%[ \t]*%",
            |caps| {
                let low: u32 = caps.get(1)?.as_str().parse().ok()?;
                Some(LabeledValue {
                    label: format!("{}+", low),
                    value: percent(caps, 2)?,
                })
            },
        )?,
    ])
}

fn income_matcher() -> Result<Matcher<LabeledValue>, ExtractionError> {
    Matcher::new(
        "income",
        r"(?i)((?:<|under[ \t]+|below[ \t]+|over[ \t]+|above[ \t]+)?\$[\d,.]+k?(?:[ \t]*[-–][ \t]*\$?[\d,.]+k?)?\+?)[ \t]*(?::|[-–][ \t]|\()?[^\n\d%$]{0,30}?%NUM%[ \t]*%",
        |caps| {
            Some(LabeledValue {
                label: clean_label(caps.get(1)?.as_str()),
                value: percent(caps, 2)?,
            })
        },
    )
}

fn funnel_matcher() -> Result<Matcher<(usize, f64)>, ExtractionError> {
    Matcher::new(
        "funnel_stage",
        r"(?i)\b(awareness|interest|consideration|purchase|retention)\b[^\n\d]{0,30}?%NUM%",
        |caps| {
            let stage = caps.get(1)?.as_str().to_lowercase();
            let index = FUNNEL_STAGES
                .iter()
                .position(|s| s.to_lowercase() == stage)?;
            let value = parse_number(caps.get(2)?.as_str())?;
            Some((index, value)).filter(|(_, v)| (0.0..=100.0).contains(v))
        },
    )
}

/// Unique labels in text order, capped
fn breakdown(mut hits: Vec<Hit<LabeledValue>>) -> Option<Vec<LabeledValue>> {
    hits.sort_by_key(|hit| hit.start);
    let mut values: Vec<LabeledValue> = Vec::new();
    for hit in hits {
        if values.len() >= MAX_SEGMENTS {
            break;
        }
        if !values
            .iter()
            .any(|v| v.label.eq_ignore_ascii_case(&hit.value.label))
        {
            values.push(hit.value);
        }
    }
    Some(values).filter(|v| v.len() >= MIN_BREAKDOWN)
}

fn funnel(text: &str, matcher: &Matcher<(usize, f64)>) -> Option<Vec<LabeledValue>> {
    let mut values: [Option<f64>; 5] = [None; 5];
    for hit in matcher.hits(text) {
        let (index, value) = hit.value;
        values[index].get_or_insert(value);
    }
    if values.iter().flatten().count() < MIN_FUNNEL_STAGES {
        return None;
    }
    Some(
        FUNNEL_STAGES
            .iter()
            .enumerate()
            .map(|(i, stage)| LabeledValue::new(stage, values[i].unwrap_or(DEFAULT_FUNNEL[i])))
            .collect(),
    )
}

fn try_extract(text: &str) -> Result<CustomerSeries, ExtractionError> {
    let segments = breakdown(segment_matcher()?.hits(text));
    let ages = breakdown(
        age_matchers()?
            .iter()
            .flat_map(|matcher| matcher.hits(text))
            .collect(),
    );
    let incomes = breakdown(income_matcher()?.hits(text));
    let funnel_stages = funnel(text, &funnel_matcher()?);

    Ok(CustomerSeries {
        segments: Extracted::or_default_with(segments, default_segments),
        age_groups: Extracted::or_default_with(ages, default_age_groups),
        income_levels: Extracted::or_default_with(incomes, default_income_levels),
        funnel: Extracted::or_default_with(funnel_stages, default_funnel),
    })
}

pub fn extract(text: &str) -> CustomerSeries {
    or_defaults(Category::Customer, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[LabeledValue]) -> Vec<&str> {
        values.iter().map(|v| v.label.as_str()).collect()
    }

    #[test]
    fn test_segments_from_list() {
        let text = "Target segments:\n\
                    - **Busy Parents**: 40% of users\n\
                    - Remote Workers (25%)\n\
                    - Cost-Conscious Students - 35%\n\
                    - Churn rate: 5%\n";
        let series = extract(text);

        assert!(series.segments.is_found());
        assert_eq!(
            labels(series.segments.value()),
            vec!["Busy Parents", "Remote Workers", "Cost-Conscious Students"]
        );
        assert_eq!(series.segments.value()[1].value, 25.0);
    }

    #[test]
    fn test_single_segment_is_not_enough() {
        let series = extract("- Gamers: 60%");
        assert!(!series.segments.is_found());
        assert_eq!(series.segments.value().len(), 5);
    }

    #[test]
    fn test_age_groups() {
        let text = "Age 18-24: 30%\nAge 25-34 - 45%\n55+: 10%";
        let series = extract(text);

        assert_eq!(labels(series.age_groups.value()), vec!["18-24", "25-34", "55+"]);
        assert_eq!(series.age_groups.value()[1].value, 45.0);
    }

    #[test]
    fn test_income_levels() {
        let text = "Income: <$50K: 10%, $50K-$100K: 60%, $100K+: 30%";
        let series = extract(text);

        assert!(series.income_levels.is_found());
        assert_eq!(
            labels(series.income_levels.value()),
            vec!["<$50K", "$50K-$100K", "$100K+"]
        );
    }

    #[test]
    fn test_funnel_fills_missing_stages() {
        let text = "Awareness 100, Interest 60, Purchase 15";
        let series = extract(text);
        let funnel = series.funnel.value();

        assert!(series.funnel.is_found());
        assert_eq!(funnel[1].value, 60.0);
        assert_eq!(funnel[2].value, 45.0);
        assert_eq!(funnel[3].value, 15.0);
    }

    #[test]
    fn test_defaults() {
        let series = extract("Error in Customer Segmentation: timeout");
        assert_eq!(series, CustomerSeries::default());
    }
}
