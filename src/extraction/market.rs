//! Market size extraction (TAM / SAM / SOM)

use serde::Serialize;

use super::matcher::{Matcher, MatcherChain};
use super::numbers::{millions, round_to};
use super::{or_defaults, Category, Extracted, ExtractionError, Provenance};

/// Yearly compounding applied to the base TAM
pub const GROWTH_RATE: f64 = 0.25;
pub const PROJECTION_YEARS: usize = 5;
/// Serviceable market as a share of TAM
pub const SAM_SHARE: f64 = 0.25;
/// Obtainable market as a share of TAM
pub const SOM_SHARE: f64 = 0.05;

const DEFAULT_TAM: [f64; 5] = [100.0, 120.0, 145.0, 175.0, 210.0];
const DEFAULT_SAM: [f64; 5] = [25.0, 35.0, 50.0, 70.0, 95.0];
const DEFAULT_SOM: [f64; 5] = [5.0, 8.0, 15.0, 25.0, 40.0];

/// Market size projections in $M
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSeries {
    pub years: Vec<String>,
    pub tam: Extracted<Vec<f64>>,
    pub sam: Extracted<Vec<f64>>,
    pub som: Extracted<Vec<f64>>,
}

impl Default for MarketSeries {
    fn default() -> Self {
        Self {
            years: year_labels(),
            tam: Extracted::Defaulted(DEFAULT_TAM.to_vec()),
            sam: Extracted::Defaulted(DEFAULT_SAM.to_vec()),
            som: Extracted::Defaulted(DEFAULT_SOM.to_vec()),
        }
    }
}

impl MarketSeries {
    /// Project five years from a base TAM in $M
    pub fn from_base_tam(base: f64) -> Self {
        let tam = project(base);
        let sam = tam.iter().map(|v| round_to(v * SAM_SHARE, 4)).collect();
        let som = tam.iter().map(|v| round_to(v * SOM_SHARE, 4)).collect();
        Self {
            years: year_labels(),
            tam: Extracted::Found(tam),
            sam: Extracted::Found(sam),
            som: Extracted::Found(som),
        }
    }
}

impl Provenance for MarketSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![self.tam.is_found(), self.sam.is_found(), self.som.is_found()]
    }
}

fn year_labels() -> Vec<String> {
    (1..=PROJECTION_YEARS).map(|y| format!("Year {}", y)).collect()
}

fn project(base: f64) -> Vec<f64> {
    (0..PROJECTION_YEARS)
        .map(|year| round_to(base * (1.0 + GROWTH_RATE).powi(year as i32), 4))
        .collect()
}

fn base_tam_chain() -> Result<MatcherChain<f64>, ExtractionError> {
    let label = r"\b(?:TAM|total\s+addressable\s+market)\b";
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "tam_dollar",
            &format!(r"(?i){}[^$\n]{{0,40}}\$\s*%NUM%\s*%UNIT%", label),
            |caps| millions(caps, 1, 2),
        )?,
        Matcher::new(
            "tam_unit",
            &format!(r"(?i){}[^\d\n]{{0,40}}%NUM%\s*%UNIT%", label),
            |caps| caps.get(2).and_then(|_| millions(caps, 1, 2)),
        )?,
        Matcher::new(
            "market_size_dollar",
            r"(?i)\bmarket\s+size\b[^$\n]{0,40}\$\s*%NUM%\s*%UNIT%",
            |caps| millions(caps, 1, 2),
        )?,
    ]))
}

fn try_extract(text: &str) -> Result<MarketSeries, ExtractionError> {
    let chain = base_tam_chain()?;
    Ok(match chain.first_match(text) {
        Some(base) => MarketSeries::from_base_tam(base),
        None => MarketSeries::default(),
    })
}

pub fn extract(text: &str) -> MarketSeries {
    or_defaults(Category::Market, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tam_in_millions_projects_growth() {
        let series = extract("TAM: $150 million");
        let tam = series.tam.value();

        assert!(series.tam.is_found());
        assert_eq!(&tam[..3], &[150.0, 187.5, 234.375]);
        assert_eq!(tam.len(), PROJECTION_YEARS);
        assert_eq!(series.sam.value()[0], 37.5);
        assert_eq!(series.som.value()[0], 7.5);
    }

    #[test]
    fn test_long_label_and_billion_unit() {
        let series = extract("The Total Addressable Market (TAM) is roughly $2.5 billion.");
        assert_eq!(series.tam.value()[0], 2500.0);
    }

    #[test]
    fn test_unit_without_dollar_sign() {
        let series = extract("TAM estimated at 40 million USD");
        assert_eq!(series.tam.value()[0], 40.0);
    }

    #[test]
    fn test_bare_dollar_tam_is_whole_dollars() {
        let series = extract("Our TAM: $500,000 in year one.");
        assert!(series.tam.is_found());
        assert_eq!(series.tam.value()[0], 0.5);

        let series = extract("TAM: $2,000,000");
        assert_eq!(series.tam.value()[0], 2.0);
    }

    #[test]
    fn test_market_size_fallback() {
        let series = extract("Overall market size: $80M and growing");
        assert_eq!(series.tam.value()[0], 80.0);
    }

    #[test]
    fn test_no_mentions_yields_defaults() {
        let series = extract("Error in Market Research: connection refused");
        assert_eq!(series, MarketSeries::default());
        assert!(series.is_fully_defaulted());
        assert_eq!(series.years[4], "Year 5");
    }

    #[test]
    fn test_earliest_mention_wins() {
        let series = extract("Market size: $90M. Later on, TAM: $150 million.");
        assert_eq!(series.tam.value()[0], 90.0);
    }
}
