//! Number and unit parsing shared by the category extractors

use regex::Captures;

/// A number with optional thousands separators and decimals
pub const NUM: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";

/// An optional magnitude word or suffix following an amount
pub const UNIT: &str = r"(trillion|billion|million|thousand|bn|mn|[tbmk])?\b";

/// Magnitude suffix for KPI values
pub const SCALE: &str = r"(million|thousand|billion|[kmb])?\b";

/// Substitute the `%NUM%`, `%UNIT%` and `%SCALE%` placeholders
pub fn expand_placeholders(pattern: &str) -> String {
    pattern
        .replace("%NUM%", NUM)
        .replace("%UNIT%", UNIT)
        .replace("%SCALE%", SCALE)
}

/// Parse "1,250.5" into 1250.5
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Multiplier for a magnitude word, `None` when there is no unit
pub fn unit_multiplier(unit: &str) -> Option<f64> {
    match unit.to_lowercase().as_str() {
        "trillion" | "t" => Some(1e12),
        "billion" | "bn" | "b" => Some(1e9),
        "million" | "mn" | "m" => Some(1e6),
        "thousand" | "k" => Some(1e3),
        _ => None,
    }
}

/// Absolute amount from a number group and an optional unit group.
/// A bare number is taken as-is.
pub fn absolute_amount(caps: &Captures<'_>, number_group: usize, unit_group: usize) -> Option<f64> {
    let value = parse_number(caps.get(number_group)?.as_str())?;
    let multiplier = caps
        .get(unit_group)
        .and_then(|m| unit_multiplier(m.as_str()))
        .unwrap_or(1.0);
    Some(value * multiplier)
}

/// Bare amounts at or above this are whole dollars, not millions
const BARE_MILLIONS_LIMIT: f64 = 10_000.0;

/// Dollar amount in millions. A small bare number without thousands
/// separators is read as already being in millions ("TAM: $150"); any other
/// bare number is whole dollars ("$500,000" is 0.5).
pub fn millions(caps: &Captures<'_>, number_group: usize, unit_group: usize) -> Option<f64> {
    let has_unit = caps
        .get(unit_group)
        .map(|m| unit_multiplier(m.as_str()).is_some())
        .unwrap_or(false);
    let separated = caps
        .get(number_group)
        .map(|m| m.as_str().contains(','))
        .unwrap_or(false);
    let amount = absolute_amount(caps, number_group, unit_group)?;
    let value = if has_unit || separated || amount >= BARE_MILLIONS_LIMIT {
        amount / 1e6
    } else {
        amount
    };
    Some(value).filter(|v| *v > 0.0)
}

/// Dollar amount in thousands
pub fn thousands(caps: &Captures<'_>, number_group: usize, unit_group: usize) -> Option<f64> {
    absolute_amount(caps, number_group, unit_group)
        .map(|amount| amount / 1e3)
        .filter(|v| *v > 0.0)
}

/// A percentage in 0..=100
pub fn percent(caps: &Captures<'_>, group: usize) -> Option<f64> {
    parse_number(caps.get(group)?.as_str()).filter(|v| (0.0..=100.0).contains(v))
}

/// Round for display and comparison
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Strip markdown emphasis and surrounding punctuation from a label
pub fn clean_label(raw: &str) -> String {
    raw.replace("**", "")
        .replace("__", "")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | ':' | '-' | '.' | ','))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
