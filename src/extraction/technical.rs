//! Implementation timeline and complexity extraction

use serde::Serialize;

use super::matcher::{Matcher, MatcherChain};
use super::numbers::{clean_label, parse_number};
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};

pub const MAX_PHASES: usize = 8;
const MIN_PHASES: usize = 2;
const DEFAULT_COMPLEXITY: f64 = 6.0;

const PHASE_STOP_WORDS: [&str; 5] = ["total", "overall", "timeline", "duration", "complexity"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    /// Offset from project start
    pub start_day: u32,
    pub duration_days: u32,
    /// Percent complete
    pub progress: f64,
}

impl Phase {
    fn new(name: &str, start_day: u32, duration_days: u32, progress: f64) -> Self {
        Self {
            name: name.to_string(),
            start_day,
            duration_days,
            progress,
        }
    }

    pub fn end_day(&self) -> u32 {
        self.start_day + self.duration_days
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSeries {
    pub phases: Extracted<Vec<Phase>>,
    /// Technical complexity on a 0-10 scale
    pub complexity: Extracted<f64>,
}

impl Default for TechnicalSeries {
    fn default() -> Self {
        Self {
            phases: Extracted::Defaulted(default_phases()),
            complexity: Extracted::Defaulted(DEFAULT_COMPLEXITY),
        }
    }
}

impl Provenance for TechnicalSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![self.phases.is_found(), self.complexity.is_found()]
    }
}

fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new("Market Research", 0, 30, 100.0),
        Phase::new("Product Design", 14, 45, 80.0),
        Phase::new("Development Phase 1", 45, 60, 60.0),
        Phase::new("Testing & QA", 91, 30, 40.0),
        Phase::new("Marketing Campaign", 105, 45, 20.0),
        Phase::new("Beta Launch", 121, 30, 0.0),
        Phase::new("Full Launch", 152, 15, 0.0),
    ]
}

/// A phase name with its duration in days
struct PhaseMention {
    name: String,
    duration_days: u32,
}

fn unit_days(unit: &str) -> Option<f64> {
    let unit = unit.to_lowercase();
    if unit.starts_with("day") {
        Some(1.0)
    } else if unit.starts_with("week") {
        Some(7.0)
    } else if unit.starts_with("month") {
        Some(30.0)
    } else {
        None
    }
}

fn phase_matcher() -> Result<Matcher<PhaseMention>, ExtractionError> {
    Matcher::new(
        "phase_duration",
        r"(?im)^[ \t]*(?:[-*•+][ \t]*|\d+[.)][ \t]*)?(?:\*\*)?(?:phase[ \t]*\d+[ \t]*(?::|[-–])[ \t]*)?([a-z][a-z0-9&/' ]{2,40}?)(?:\*\*)?[ \t]*(?::|[-–][ \t]|\()[^\n\d]{0,30}?(\d+)(?:[ \t]*[-–][ \t]*(\d+))?[ \t]*(days?|weeks?|months?)\b",
        |caps| {
            let name = clean_label(caps.get(1)?.as_str());
            let lower = name.to_lowercase();
            if PHASE_STOP_WORDS.iter().any(|word| lower.contains(word)) {
                return None;
            }
            // Ranges take their upper bound
            let amount = caps
                .get(3)
                .or_else(|| caps.get(2))
                .and_then(|m| parse_number(m.as_str()))?;
            let days = (amount * unit_days(caps.get(4)?.as_str())?).round();
            if days < 1.0 || days > 3650.0 {
                return None;
            }
            Some(PhaseMention {
                name,
                duration_days: days as u32,
            })
        },
    )
}

fn complexity_level(word: &str) -> Option<f64> {
    let word = word.to_lowercase();
    let word = word.split_whitespace().collect::<Vec<_>>().join(" ");
    match word.as_str() {
        "low" => Some(3.0),
        "medium" | "moderate" => Some(5.0),
        "high" => Some(8.0),
        "very high" => Some(9.0),
        _ => None,
    }
}

fn complexity_chain() -> Result<MatcherChain<f64>, ExtractionError> {
    let levels = r"(very[ \t]+high|high|medium|moderate|low)";
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "complexity_score",
            r"(?i)complexity[^\n\d]{0,30}?%NUM%[ \t]*/[ \t]*10\b",
            |caps| parse_number(caps.get(1)?.as_str()).filter(|v| (0.0..=10.0).contains(v)),
        )?,
        Matcher::new(
            "level_complexity",
            &format!(r"(?i)\b{}\b[ \t]+(?:technical[ \t]+)?complexity", levels),
            |caps| complexity_level(caps.get(1)?.as_str()),
        )?,
        Matcher::new(
            "complexity_level",
            &format!(r"(?i)complexity[^\n\d]{{0,20}}?\b{}\b", levels),
            |caps| complexity_level(caps.get(1)?.as_str()),
        )?,
    ]))
}

fn try_extract(text: &str) -> Result<TechnicalSeries, ExtractionError> {
    let mut phases: Vec<Phase> = Vec::new();
    let mut next_start = 0;
    for hit in phase_matcher()?.hits(text) {
        if phases.len() >= MAX_PHASES {
            break;
        }
        let mention = hit.value;
        if phases.iter().any(|p| p.name.eq_ignore_ascii_case(&mention.name)) {
            continue;
        }
        phases.push(Phase::new(&mention.name, next_start, mention.duration_days, 0.0));
        next_start += mention.duration_days;
    }
    let phases = Some(phases).filter(|p| p.len() >= MIN_PHASES);
    let complexity = complexity_chain()?.first_match(text);

    Ok(TechnicalSeries {
        phases: Extracted::or_default_with(phases, default_phases),
        complexity: Extracted::or_default_with(complexity, || DEFAULT_COMPLEXITY),
    })
}

pub fn extract(text: &str) -> TechnicalSeries {
    or_defaults(Category::Technical, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_phases() {
        let text = "Implementation plan:\n\
                    Phase 1: Prototype (3-4 weeks)\n\
                    Phase 2: Manufacturing setup - 2 months\n\
                    - **Pilot launch**: 10 days\n\
                    Total duration: 3 months\n";
        let series = extract(text);
        let phases = series.phases.value();

        assert!(series.phases.is_found());
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0], Phase::new("Prototype", 0, 28, 0.0));
        assert_eq!(phases[1].name, "Manufacturing setup");
        assert_eq!(phases[1].start_day, 28);
        assert_eq!(phases[1].duration_days, 60);
        assert_eq!(phases[2].start_day, 88);
        assert_eq!(phases[2].end_day(), 98);
    }

    #[test]
    fn test_complexity_score_and_words() {
        assert_eq!(
            extract("Technical complexity: 7/10").complexity,
            Extracted::Found(7.0)
        );
        assert_eq!(
            *extract("This is a high complexity build").complexity.value(),
            8.0
        );
        assert_eq!(
            *extract("Complexity is moderate overall").complexity.value(),
            5.0
        );
    }

    #[test]
    fn test_single_phase_is_not_a_timeline() {
        let series = extract("Beta: 6 weeks");
        assert!(!series.phases.is_found());
        assert_eq!(series.phases.value().len(), 7);
    }

    #[test]
    fn test_defaults() {
        let series = extract("");
        assert_eq!(series, TechnicalSeries::default());
        assert_eq!(series.phases.value()[6].end_day(), 167);
    }
}
