//! SWOT quadrant extraction

use serde::Serialize;

use super::matcher::{Hit, Matcher};
use super::numbers::clean_label;
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};
use crate::utils::truncate_chars;

pub const MAX_ITEMS: usize = 6;
pub const MAX_ITEM_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Strengths,
        Quadrant::Weaknesses,
        Quadrant::Opportunities,
        Quadrant::Threats,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Quadrant::Strengths => "Strengths",
            Quadrant::Weaknesses => "Weaknesses",
            Quadrant::Opportunities => "Opportunities",
            Quadrant::Threats => "Threats",
        }
    }

    fn from_heading(word: &str) -> Option<Self> {
        let word = word.to_lowercase();
        if word.starts_with("strength") {
            Some(Quadrant::Strengths)
        } else if word.starts_with("weakness") {
            Some(Quadrant::Weaknesses)
        } else if word.starts_with("opportunit") {
            Some(Quadrant::Opportunities)
        } else if word.starts_with("threat") {
            Some(Quadrant::Threats)
        } else {
            None
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotSeries {
    pub strengths: Extracted<Vec<String>>,
    pub weaknesses: Extracted<Vec<String>>,
    pub opportunities: Extracted<Vec<String>>,
    pub threats: Extracted<Vec<String>>,
}

impl Default for SwotSeries {
    fn default() -> Self {
        let items = |list: &[&str]| Extracted::Defaulted(list.iter().map(|s| s.to_string()).collect());
        Self {
            strengths: items(&[
                "Innovative product concept",
                "Clear value proposition",
                "Lean initial cost structure",
            ]),
            weaknesses: items(&[
                "Limited brand awareness",
                "Small founding team",
                "Unproven revenue model",
            ]),
            opportunities: items(&[
                "Growing target market",
                "Underserved customer segments",
                "Partnership potential",
            ]),
            threats: items(&[
                "Established competitors",
                "Changing regulations",
                "Economic uncertainty",
            ]),
        }
    }
}

impl SwotSeries {
    pub fn quadrant(&self, quadrant: Quadrant) -> &Extracted<Vec<String>> {
        match quadrant {
            Quadrant::Strengths => &self.strengths,
            Quadrant::Weaknesses => &self.weaknesses,
            Quadrant::Opportunities => &self.opportunities,
            Quadrant::Threats => &self.threats,
        }
    }
}

impl Provenance for SwotSeries {
    fn field_flags(&self) -> Vec<bool> {
        Quadrant::ALL
            .iter()
            .map(|q| self.quadrant(*q).is_found())
            .collect()
    }
}

struct Heading {
    quadrant: Quadrant,
    inline: Option<String>,
}

fn heading_matcher() -> Result<Matcher<Heading>, ExtractionError> {
    Matcher::new(
        "swot_heading",
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?(?:\*\*)?[ \t]*(strengths?|weakness(?:es)?|opportunit(?:y|ies)|threats?)\b(?:\*\*)?[ \t]*(?:\([a-z]\))?[ \t]*(?:\*\*)?[ \t]*(?::(?:\*\*)?[ \t]*(.*))?$",
        |caps| {
            Some(Heading {
                quadrant: Quadrant::from_heading(caps.get(1)?.as_str())?,
                inline: caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty()),
            })
        },
    )
}

fn bullet_matcher() -> Result<Matcher<String>, ExtractionError> {
    Matcher::new(
        "swot_bullet",
        r"(?m)^[ \t]*(?:[-*•+]|\d+[.)])[ \t]+(.+)$",
        |caps| clean_item(caps.get(1)?.as_str()),
    )
}

fn clean_item(raw: &str) -> Option<String> {
    let item = clean_label(raw);
    Some(truncate_chars(&item, MAX_ITEM_CHARS)).filter(|s| !s.is_empty())
}

fn section_items(section: &str, inline: Option<&str>, bullets: &Matcher<String>) -> Vec<String> {
    let mut items: Vec<String> = bullets
        .hits(section)
        .into_iter()
        .map(|hit| hit.value)
        .take(MAX_ITEMS)
        .collect();
    if items.is_empty() {
        if let Some(inline) = inline {
            items = inline
                .split(|c: char| c == ',' || c == ';')
                .filter_map(clean_item)
                .take(MAX_ITEMS)
                .collect();
        }
    }
    items
}

fn try_extract(text: &str) -> Result<SwotSeries, ExtractionError> {
    let bullets = bullet_matcher()?;
    let headings: Vec<Hit<Heading>> = heading_matcher()?.hits(text);

    let mut found: [Option<Vec<String>>; 4] = Default::default();
    for (i, heading) in headings.iter().enumerate() {
        let slot = &mut found[heading.value.quadrant.index()];
        if slot.is_some() {
            continue;
        }
        let section_end = headings
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(text.len());
        let section = &text[heading.end..section_end];
        let items = section_items(section, heading.value.inline.as_deref(), &bullets);
        if !items.is_empty() {
            *slot = Some(items);
        }
    }

    let defaults = SwotSeries::default();
    let [strengths, weaknesses, opportunities, threats] = found;
    let pick = |found: Option<Vec<String>>, default: &Extracted<Vec<String>>| {
        Extracted::or_default_with(found, || default.value().clone())
    };
    Ok(SwotSeries {
        strengths: pick(strengths, &defaults.strengths),
        weaknesses: pick(weaknesses, &defaults.weaknesses),
        opportunities: pick(opportunities, &defaults.opportunities),
        threats: pick(threats, &defaults.threats),
    })
}

pub fn extract(text: &str) -> SwotSeries {
    or_defaults(Category::Swot, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_sections_with_bullets() {
        let text = "## SWOT Analysis\n\
                    ### Strengths\n\
                    - **Unique design**: patented hinge\n\
                    - Low production cost\n\
                    ### Weaknesses\n\
                    1. Small team\n\
                    ### Opportunities (O)\n\
                    * Export markets\n\
                    ### Threats\n\
                    - Cheap imitations\n";
        let series = extract(text);

        assert_eq!(
            series.strengths,
            Extracted::Found(vec![
                "Unique design: patented hinge".to_string(),
                "Low production cost".to_string(),
            ])
        );
        assert_eq!(series.weaknesses.value(), &vec!["Small team".to_string()]);
        assert_eq!(series.opportunities.value(), &vec!["Export markets".to_string()]);
        assert_eq!(series.threats.value(), &vec!["Cheap imitations".to_string()]);
        assert_eq!(series.found_fields(), 4);
    }

    #[test]
    fn test_inline_comma_list() {
        let text = "Strengths: speed, price, design\nThreats: regulation";
        let series = extract(text);

        assert_eq!(series.strengths.value().len(), 3);
        assert_eq!(series.threats.value(), &vec!["regulation".to_string()]);
        assert!(!series.weaknesses.is_found());
    }

    #[test]
    fn test_items_are_capped_and_truncated() {
        let mut text = String::from("**Opportunities:**\n");
        for i in 0..10 {
            text.push_str(&format!("- Opportunity {} {}\n", i, "x".repeat(100)));
        }
        let series = extract(&text);
        let items = series.opportunities.value();

        assert_eq!(items.len(), MAX_ITEMS);
        assert!(items.iter().all(|item| item.chars().count() <= MAX_ITEM_CHARS));
    }

    #[test]
    fn test_sentence_starting_with_keyword_is_not_a_heading() {
        let series = extract("Strengths include a loyal community.");
        assert!(series.is_fully_defaulted());
    }
}
