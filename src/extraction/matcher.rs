//! Ordered regex matchers with field mappers

use regex::{Captures, Regex};

use super::numbers::expand_placeholders;
use super::ExtractionError;

type Mapper<T> = Box<dyn Fn(&Captures<'_>) -> Option<T>>;

/// A candidate value and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<T> {
    pub start: usize,
    pub end: usize,
    pub value: T,
}

/// One pattern plus the function turning its captures into a value.
///
/// Patterns may use the `%NUM%`, `%UNIT%` and `%SCALE%` placeholders from
/// [`super::numbers`]. A mapper returning `None` rejects the match and the
/// matcher moves on to the next one.
pub struct Matcher<T> {
    label: &'static str,
    pattern: Regex,
    mapper: Mapper<T>,
}

impl<T> Matcher<T> {
    pub fn new<F>(label: &'static str, pattern: &str, mapper: F) -> Result<Self, ExtractionError>
    where
        F: Fn(&Captures<'_>) -> Option<T> + 'static,
    {
        let expanded = expand_placeholders(pattern);
        let pattern = Regex::new(&expanded)
            .map_err(|source| ExtractionError::Pattern { label, source })?;
        Ok(Self {
            label,
            pattern,
            mapper: Box::new(mapper),
        })
    }

    /// Every accepted match, in text order
    pub fn hits(&self, text: &str) -> Vec<Hit<T>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                (self.mapper)(&caps).map(|value| Hit {
                    start: whole.start(),
                    end: whole.end(),
                    value,
                })
            })
            .collect()
    }

    /// The earliest accepted match
    pub fn first_hit(&self, text: &str) -> Option<Hit<T>> {
        self.pattern.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            (self.mapper)(&caps).map(|value| Hit {
                start: whole.start(),
                end: whole.end(),
                value,
            })
        })
    }
}

/// Matchers for one field, in priority order
pub struct MatcherChain<T> {
    matchers: Vec<Matcher<T>>,
}

impl<T> MatcherChain<T> {
    pub fn new(matchers: Vec<Matcher<T>>) -> Self {
        Self { matchers }
    }

    /// The candidate occurring earliest in the text. Candidates starting at
    /// the same offset are ranked by matcher order.
    pub fn first_match(&self, text: &str) -> Option<T> {
        self.best_hit(text).map(|(label, hit)| {
            log::debug!(
                "[Extraction] Matcher '{}' hit at {}..{}",
                label,
                hit.start,
                hit.end
            );
            hit.value
        })
    }

    /// The winning hit and the label of the matcher that produced it
    pub fn best_hit(&self, text: &str) -> Option<(&'static str, Hit<T>)> {
        let mut best: Option<(&'static str, Hit<T>)> = None;
        for matcher in &self.matchers {
            if let Some(hit) = matcher.first_hit(text) {
                let better = best
                    .as_ref()
                    .map_or(true, |(_, current)| hit.start < current.start);
                if better {
                    best = Some((matcher.label, hit));
                }
            }
        }
        best
    }

    /// Every candidate from every matcher, sorted by offset then matcher order
    pub fn all_hits(&self, text: &str) -> Vec<Hit<T>> {
        let mut ranked: Vec<(usize, Hit<T>)> = self
            .matchers
            .iter()
            .enumerate()
            .flat_map(|(order, matcher)| {
                matcher
                    .hits(text)
                    .into_iter()
                    .map(move |hit| (order, hit))
            })
            .collect();
        ranked.sort_by(|(order_a, a), (order_b, b)| {
            a.start.cmp(&b.start).then(order_a.cmp(order_b))
        });
        ranked.into_iter().map(|(_, hit)| hit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_matcher(label: &'static str, pattern: &str) -> Matcher<String> {
        Matcher::new(label, pattern, |caps| Some(format!("{}", &caps[1]))).unwrap()
    }

    #[test]
    fn test_earliest_occurrence_wins_over_matcher_order() {
        let chain = MatcherChain::new(vec![
            number_matcher("late", r"second (\d+)"),
            number_matcher("early", r"first (\d+)"),
        ]);

        assert_eq!(
            chain.first_match("first 1 then second 2").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_matcher_order_breaks_ties() {
        let chain = MatcherChain::new(vec![
            number_matcher("specific", r"TAM: \$(\d+) million"),
            number_matcher("generic", r"TAM: \$(\d+)"),
        ]);

        assert_eq!(chain.first_match("TAM: $150 million").as_deref(), Some("150"));
    }

    #[test]
    fn test_best_hit_reports_winning_matcher() {
        let chain = MatcherChain::new(vec![
            number_matcher("specific", r"TAM: \$(\d+) million"),
            number_matcher("generic", r"TAM: \$(\d+)"),
        ]);

        let (label, hit) = chain.best_hit("TAM: $150 million").unwrap();
        assert_eq!(label, "specific");
        assert_eq!(hit.start, 0);

        let (label, _) = chain.best_hit("TAM: $150").unwrap();
        assert_eq!(label, "generic");
        assert!(chain.best_hit("no figures").is_none());
    }

    #[test]
    fn test_rejected_match_falls_through() {
        let matcher = Matcher::new("even", r"(\d+)", |caps| {
            caps[1].parse::<u32>().ok().filter(|n| n % 2 == 0)
        })
        .unwrap();

        let hit = matcher.first_hit("3 5 8 10").unwrap();
        assert_eq!(hit.value, 8);
        assert_eq!(hit.start, 4);
        assert_eq!(matcher.hits("3 5 8 10").len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = Matcher::<String>::new("broken", r"(unclosed", |_| None);
        assert!(matches!(result, Err(ExtractionError::Pattern { label: "broken", .. })));
    }

    #[test]
    fn test_all_hits_sorted_by_offset() {
        let chain = MatcherChain::new(vec![
            number_matcher("b", r"b(\d)"),
            number_matcher("a", r"a(\d)"),
        ]);
        let hits: Vec<String> = chain
            .all_hits("a1 b2 a3")
            .into_iter()
            .map(|h| h.value)
            .collect();
        assert_eq!(hits, vec!["1", "2", "3"]);
    }
}
