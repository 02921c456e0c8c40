//! Competitive positioning extraction

use serde::Serialize;

use super::matcher::{Matcher, MatcherChain};
use super::numbers::{clean_label, parse_number, percent, round_to};
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};

pub const OUR_PRODUCT: &str = "Our Product";
pub const MAX_COMPETITORS: usize = 6;
/// Score used for a found competitor whose price or feature score is missing
pub const NEUTRAL_SCORE: f64 = 50.0;

const LIST_PREFIX: &str = r"^[ \t]*(?:[-*•+][ \t]*|\d+[.)][ \t]*)?\**";
const NAME: &str = r"([A-Za-z][\w&.' ]{1,40}?)";
const NAME_SEPARATOR: &str = r"\**[ \t]*(?::|[-–][ \t])";

/// A product positioned on the price/features map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    /// Relative price, 0-100
    pub price: f64,
    /// Feature richness, 0-100
    pub features: f64,
    /// Market share in percent
    pub market_share: f64,
}

impl Competitor {
    fn new(name: &str, price: f64, features: f64, market_share: f64) -> Self {
        Self {
            name: name.to_string(),
            price,
            features,
            market_share,
        }
    }

    fn our_product() -> Self {
        Self::new(OUR_PRODUCT, 50.0, 85.0, 0.0)
    }
}

/// Competitors with "Our Product" always first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveSeries {
    pub competitors: Extracted<Vec<Competitor>>,
}

impl Default for CompetitiveSeries {
    fn default() -> Self {
        Self {
            competitors: Extracted::Defaulted(vec![
                Competitor::our_product(),
                Competitor::new("Competitor A", 80.0, 70.0, 25.0),
                Competitor::new("Competitor B", 60.0, 60.0, 20.0),
                Competitor::new("Competitor C", 40.0, 45.0, 15.0),
                Competitor::new("Competitor D", 90.0, 90.0, 30.0),
            ]),
        }
    }
}

impl Provenance for CompetitiveSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![self.competitors.is_found()]
    }
}

#[derive(Debug, Clone)]
struct Mention {
    name: String,
    share: f64,
}

fn mention(caps: &regex::Captures<'_>) -> Option<Mention> {
    let name = clean_label(caps.get(1)?.as_str());
    if !is_competitor_name(&name) {
        return None;
    }
    Some(Mention {
        name,
        share: percent(caps, 2)?,
    })
}

fn is_competitor_name(name: &str) -> bool {
    if name.len() < 2 {
        return false;
    }
    let lower = name.to_lowercase();
    !lower
        .split_whitespace()
        .any(|word| word == "our" || word.contains("market") || word.contains("total"))
}

fn mention_chain() -> Result<MatcherChain<Mention>, ExtractionError> {
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "name_then_share",
            &format!(
                r"(?m){}{}{}[^\n]*?%NUM%[ \t]*%[ \t]*(?i:(?:of[ \t]+(?:the[ \t]+)?)?(?:market[ \t]+)?share)",
                LIST_PREFIX, NAME, NAME_SEPARATOR
            ),
            mention,
        )?,
        Matcher::new(
            "name_then_market_share",
            &format!(
                r"(?m){}{}{}[^\n]*?(?i:market[ \t]+share)[^\d\n]{{0,20}}%NUM%[ \t]*%",
                LIST_PREFIX, NAME, NAME_SEPARATOR
            ),
            mention,
        )?,
        Matcher::new(
            "holds_share",
            r"\b([A-Z][\w&.']*(?:[ \t]+[A-Z][\w&.']*){0,3})[ \t]+(?i:holds|has|controls|commands|captures)[ \t]+(?i:about[ \t]+|around[ \t]+|roughly[ \t]+|approximately[ \t]+|~)?%NUM%[ \t]*%[ \t]+(?i:of[ \t]+the[ \t]+market)",
            mention,
        )?,
    ]))
}

/// Scores read from the line a competitor is mentioned on
struct Scored {
    mention: Mention,
    /// Raw dollar price
    price: Option<f64>,
    features: Option<f64>,
}

struct LineScores {
    price: Matcher<f64>,
    features: Matcher<f64>,
}

impl LineScores {
    fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            // A "$2B revenue" style amount is not a price
            price: Matcher::new("price", r"(?i)\$[ \t]*%NUM%[ \t]*%UNIT%", |caps| {
                if caps.get(2).is_some() {
                    return None;
                }
                parse_number(caps.get(1)?.as_str()).filter(|v| *v > 0.0)
            })?,
            features: Matcher::new("features", r"%NUM%[ \t]*/[ \t]*10\b", |caps| {
                parse_number(caps.get(1)?.as_str())
                    .filter(|v| *v <= 10.0)
                    .map(|v| v * 10.0)
            })?,
        })
    }

    fn score(&self, line: &str, mention: Mention) -> Scored {
        Scored {
            mention,
            price: self.price.first_hit(line).map(|h| h.value),
            features: self.features.first_hit(line).map(|h| h.value),
        }
    }
}

/// Map raw prices onto the 0-100 price axis. Prices already within 0-100 are
/// kept; otherwise every price is scaled so the most expensive sits at 100.
fn relative_prices(raw: &[Option<f64>]) -> Vec<f64> {
    let max = raw.iter().flatten().copied().fold(0.0_f64, f64::max);
    let scale = if max > 100.0 { 100.0 / max } else { 1.0 };
    raw.iter()
        .map(|price| match price {
            Some(p) => round_to((p * scale).clamp(0.0, 100.0), 1),
            None => NEUTRAL_SCORE,
        })
        .collect()
}

fn into_competitors(scored: Vec<Scored>) -> Vec<Competitor> {
    let raw: Vec<Option<f64>> = scored.iter().map(|s| s.price).collect();
    scored
        .into_iter()
        .zip(relative_prices(&raw))
        .map(|(s, price)| Competitor {
            name: s.mention.name,
            price,
            features: s.features.unwrap_or(NEUTRAL_SCORE),
            market_share: s.mention.share,
        })
        .collect()
}

fn line_around(text: &str, offset: usize) -> &str {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    &text[start..end]
}

fn try_extract(text: &str) -> Result<CompetitiveSeries, ExtractionError> {
    let chain = mention_chain()?;
    let scores = LineScores::new()?;

    let mut found: Vec<Scored> = Vec::new();
    for hit in chain.all_hits(text) {
        if found.len() >= MAX_COMPETITORS {
            break;
        }
        let duplicate = found
            .iter()
            .any(|s| s.mention.name.eq_ignore_ascii_case(&hit.value.name));
        if duplicate {
            continue;
        }
        let line = line_around(text, hit.start);
        found.push(scores.score(line, hit.value));
    }

    if found.is_empty() {
        return Ok(CompetitiveSeries::default());
    }

    let mut competitors = vec![Competitor::our_product()];
    competitors.extend(into_competitors(found));
    Ok(CompetitiveSeries {
        competitors: Extracted::Found(competitors),
    })
}

pub fn extract(text: &str) -> CompetitiveSeries {
    or_defaults(Category::Competitive, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(series: &CompetitiveSeries) -> Vec<String> {
        series
            .competitors
            .value()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn test_list_of_competitors() {
        let text = "Key competitors:\n\
                    - **Acme Corp**: 35% market share, premium at $90, features 8/10\n\
                    - Globex - 20% share, $40 per month\n";
        let series = extract(text);

        assert!(series.competitors.is_found());
        let competitors = series.competitors.value();
        assert_eq!(names(&series), vec![OUR_PRODUCT, "Acme Corp", "Globex"]);
        assert_eq!(competitors[1].market_share, 35.0);
        assert_eq!(competitors[1].price, 90.0);
        assert_eq!(competitors[1].features, 80.0);
        assert_eq!(competitors[2].price, 40.0);
        assert_eq!(competitors[2].features, NEUTRAL_SCORE);
    }

    #[test]
    fn test_dollar_prices_are_scaled_onto_axis() {
        let text = "- Acme: 30% market share, $450 per seat\n\
                    - Globex: 20% market share, $225 per seat\n\
                    - Initech: 10% market share\n";
        let series = extract(text);
        let competitors = series.competitors.value();

        assert_eq!(competitors[1].price, 100.0);
        assert_eq!(competitors[2].price, 50.0);
        assert_eq!(competitors[3].price, NEUTRAL_SCORE);
        assert!(competitors
            .iter()
            .all(|c| (0.0..=100.0).contains(&c.price)));
    }

    #[test]
    fn test_relative_prices() {
        assert_eq!(relative_prices(&[Some(90.0), None]), vec![90.0, NEUTRAL_SCORE]);
        assert_eq!(relative_prices(&[Some(1000.0), Some(250.0)]), vec![100.0, 25.0]);
        assert!(relative_prices(&[]).is_empty());
    }

    #[test]
    fn test_holds_share_sentence() {
        let series = extract("Initech holds about 40% of the market today.");
        assert_eq!(names(&series), vec![OUR_PRODUCT, "Initech"]);
        assert_eq!(series.competitors.value()[1].market_share, 40.0);
    }

    #[test]
    fn test_market_share_after_name() {
        let series = extract("1. Hooli - market share: 12%");
        assert_eq!(series.competitors.value()[1].name, "Hooli");
        assert_eq!(series.competitors.value()[1].market_share, 12.0);
    }

    #[test]
    fn test_rejects_aggregate_names() {
        let text = "Total market: 100% share\nOur product: 0% share\n";
        let series = extract(text);
        assert_eq!(series, CompetitiveSeries::default());
    }

    #[test]
    fn test_duplicates_and_cap() {
        let mut text = String::from("Acme: 10% market share\nacme: 12% market share\n");
        for i in 0..10 {
            text.push_str(&format!("Vendor{}: {}% market share\n", i, i + 1));
        }
        let series = extract(&text);
        let competitors = series.competitors.value();

        assert_eq!(competitors.len(), MAX_COMPETITORS + 1);
        assert_eq!(competitors[1].market_share, 10.0);
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        let series = extract("No competitor data available.");
        assert!(series.is_fully_defaulted());
        assert_eq!(series.competitors.value().len(), 5);
        assert_eq!(series.competitors.value()[0].name, OUR_PRODUCT);
    }
}
