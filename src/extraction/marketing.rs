//! Marketing budget extraction

use serde::Serialize;

use super::matcher::{Hit, Matcher, MatcherChain};
use super::numbers::{percent, thousands};
use super::{labeled, or_defaults, Category, Extracted, ExtractionError, LabeledValue, Provenance};

const MIN_CHANNELS: usize = 2;
const DEFAULT_BUDGET_THOUSANDS: f64 = 500.0;

/// Channel keywords and the name each maps to. Longer phrases come first.
const CHANNELS: [(&str, &str); 9] = [
    (
        r"digital\s+advertising|paid\s+(?:ads|advertising|search|media)|google\s+ads|ppc|online\s+ads|advertising",
        "Digital Advertising",
    ),
    (r"content\s+marketing|content|seo|blogging", "Content Marketing"),
    (r"influencer\s+marketing|influencers?", "Influencer Marketing"),
    (r"social\s+media(?:\s+marketing)?|social", "Social Media"),
    (r"email\s+marketing|e-?mail|newsletters?", "Email Marketing"),
    (r"events|trade\s+shows|conferences|webinars", "Events"),
    (r"public\s+relations|pr|press", "Public Relations"),
    (r"partnerships?|affiliates?", "Partnerships"),
    (r"referrals?(?:\s+programs?)?", "Referral Programs"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingSeries {
    /// Share of budget per channel in percent
    pub channels: Extracted<Vec<LabeledValue>>,
    /// Total budget in $000
    pub budget_thousands: Extracted<f64>,
}

impl Default for MarketingSeries {
    fn default() -> Self {
        Self {
            channels: Extracted::Defaulted(default_channels()),
            budget_thousands: Extracted::Defaulted(DEFAULT_BUDGET_THOUSANDS),
        }
    }
}

impl MarketingSeries {
    /// Budget per channel in $000
    pub fn allocation(&self) -> Vec<LabeledValue> {
        let budget = *self.budget_thousands.value();
        self.channels
            .value()
            .iter()
            .map(|c| LabeledValue::new(&c.label, budget * c.value / 100.0))
            .collect()
    }
}

impl Provenance for MarketingSeries {
    fn field_flags(&self) -> Vec<bool> {
        vec![self.channels.is_found(), self.budget_thousands.is_found()]
    }
}

fn default_channels() -> Vec<LabeledValue> {
    labeled(&[
        ("Digital Advertising", 30.0),
        ("Content Marketing", 20.0),
        ("Social Media", 20.0),
        ("Email Marketing", 10.0),
        ("Events", 10.0),
        ("Public Relations", 10.0),
    ])
}

fn channel_matchers() -> Result<Vec<Matcher<LabeledValue>>, ExtractionError> {
    CHANNELS
        .iter()
        .map(|(keywords, name)| {
            let name = *name;
            Matcher::new(
                "channel_share",
                &format!(r"(?i)\b(?:{})\b[^\n\d%]{{0,30}}?%NUM%[ \t]*%", keywords),
                move |caps| {
                    Some(LabeledValue {
                        label: name.to_string(),
                        value: percent(caps, 1)?,
                    })
                },
            )
        })
        .collect()
}

fn budget_chain() -> Result<MatcherChain<f64>, ExtractionError> {
    Ok(MatcherChain::new(vec![
        Matcher::new(
            "budget_amount",
            r"(?i)\b(?:marketing\s+)?budget\b[^\n$\d]{0,40}\$[ \t]*%NUM%[ \t]*%UNIT%",
            |caps| thousands(caps, 1, 2),
        )?,
        Matcher::new(
            "amount_budget",
            r"(?i)\$[ \t]*%NUM%[ \t]*%UNIT%[^\n\d$]{0,30}?\b(?:marketing\s+)?budget\b",
            |caps| thousands(caps, 1, 2),
        )?,
    ]))
}

fn try_extract(text: &str) -> Result<MarketingSeries, ExtractionError> {
    let mut hits: Vec<Hit<LabeledValue>> = channel_matchers()?
        .iter()
        .flat_map(|matcher| matcher.hits(text))
        .collect();
    hits.sort_by_key(|hit| hit.start);

    let mut channels: Vec<LabeledValue> = Vec::new();
    for hit in hits {
        if !channels.iter().any(|c| c.label == hit.value.label) {
            channels.push(hit.value);
        }
    }
    let channels = Some(channels).filter(|c| c.len() >= MIN_CHANNELS);
    let budget = budget_chain()?.first_match(text);

    Ok(MarketingSeries {
        channels: Extracted::or_default_with(channels, default_channels),
        budget_thousands: Extracted::or_default_with(budget, || DEFAULT_BUDGET_THOUSANDS),
    })
}

pub fn extract(text: &str) -> MarketingSeries {
    or_defaults(Category::Marketing, try_extract(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_and_budget() {
        let text = "Total marketing budget: $250K for year one.\n\
                    - Paid ads: 40%\n\
                    - SEO and blogging - 25%\n\
                    - Influencers (20%)\n\
                    - PR: 15%\n";
        let series = extract(text);

        let labels: Vec<&str> = series
            .channels
            .value()
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Digital Advertising",
                "Content Marketing",
                "Influencer Marketing",
                "Public Relations"
            ]
        );
        assert_eq!(series.budget_thousands, Extracted::Found(250.0));
        assert_eq!(series.allocation()[0].value, 100.0);
    }

    #[test]
    fn test_first_mention_of_a_channel_wins() {
        let series = extract("Email: 10%, Social media: 30%, email newsletter 50%");
        let channels = series.channels.value();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].value, 10.0);
    }

    #[test]
    fn test_defaults() {
        let series = extract("Focus on word of mouth.");
        assert_eq!(series, MarketingSeries::default());
        let total: f64 = series.channels.value().iter().map(|c| c.value).sum();
        assert_eq!(total, 100.0);
    }
}
