//! Response Matching
//!
//! Scans a response table in order and stops at the first group whose
//! stimulus is either contained in the message or fuzzily close enough to
//! it. Messages longer than two tokens are compared in symbolized form on
//! both sides; short ones by their lower-cased raw text.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::trace;

use crate::corpus::{ResponseGroup, ResponseTable};
use crate::fuzzy::{Bitap, SimilarityScorer};
use crate::nlp::{FeatureExtractor, Message};

/// Threshold used for the near-exact pass of the exhaustive scan
pub const STRICT_THRESHOLD: f64 = 1.0;

/// Token count above which symbolized forms are compared
const SYMBOLIZE_ABOVE: usize = 2;

/// Stimulus matcher
pub struct Matcher {
    extractor: Arc<dyn FeatureExtractor>,
    scorer: Box<dyn SimilarityScorer>,
}

impl Matcher {
    /// Matcher scoring with the default [`Bitap`]
    pub fn new(extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self::with_scorer(extractor, Box::new(Bitap::default()))
    }

    pub fn with_scorer(extractor: Arc<dyn FeatureExtractor>, scorer: Box<dyn SimilarityScorer>) -> Self {
        Self { extractor, scorer }
    }

    /// Reply from the first matching group, `None` when nothing matches
    ///
    /// A fuzzy hit needs `similarity > threshold`; a reply is never the stimulus.
    pub fn find<R: Rng + ?Sized>(
        &self,
        message: &Message,
        table: &ResponseTable,
        threshold: f64,
        rng: &mut R,
    ) -> Option<String> {
        let symbolize = message.tokens.len() > SYMBOLIZE_ABOVE;
        let candidate = if symbolize {
            canonical(&message.symbol_text, &message.text)
        } else {
            message.text.trim().to_lowercase()
        };
        if candidate.is_empty() {
            return None;
        }

        for group in table {
            if self.matches(&candidate, group, symbolize, threshold) {
                return group.replies().choose(rng).cloned();
            }
        }
        None
    }

    fn matches(&self, candidate: &str, group: &ResponseGroup, symbolize: bool, threshold: f64) -> bool {
        let stimulus = if symbolize {
            canonical(&self.extractor.symbolize(group.stimulus()), group.stimulus())
        } else {
            group.stimulus().trim().to_lowercase()
        };
        if stimulus.is_empty() {
            return false;
        }

        if candidate.contains(&stimulus) {
            trace!("'{}' contains stimulus '{}'", candidate, stimulus);
            return true;
        }

        match self.scorer.similarity(candidate, &stimulus) {
            Some(score) if score > threshold => {
                trace!("'{}' ~ '{}' ({:.3} > {:.3})", candidate, stimulus, score, threshold);
                true
            }
            _ => false,
        }
    }
}

/// Symbolized form, or the lower-cased raw text when symbolizing removed everything
fn canonical(symbolized: &str, raw: &str) -> String {
    let symbolized = symbolized.trim();
    if symbolized.is_empty() {
        raw.trim().to_lowercase()
    } else {
        symbolized.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::BasicExtractor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FixedScorer(f64);

    impl SimilarityScorer for FixedScorer {
        fn similarity(&self, _pattern: &str, _text: &str) -> Option<f64> {
            Some(self.0)
        }
    }

    fn group(entries: &[&str]) -> ResponseGroup {
        ResponseGroup::from_entries(entries.iter().map(|e| e.to_string()).collect()).unwrap()
    }

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(BasicExtractor::default()))
    }

    fn fixed(score: f64) -> Matcher {
        Matcher::with_scorer(Arc::new(BasicExtractor::default()), Box::new(FixedScorer(score)))
    }

    #[test]
    fn test_substring_match_on_short_message() {
        let table = vec![group(&["bye", "see you"]), group(&["hello", "hi there!", "hey!"])];
        let message = Message::new("Hello", "bob").with_tokens(&["Hello"]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let reply = matcher().find(&message, &table, 0.68, &mut rng).unwrap();
            assert!(reply == "hi there!" || reply == "hey!");
        }
    }

    #[test]
    fn test_symbolized_match_on_long_message() {
        let extractor = BasicExtractor::default();
        let text = "Tell me a joke about the computers";
        let message = extractor.extract(text, "bob");
        assert!(message.tokens.len() > 2);

        let table = vec![group(&["a joke about computers", "Bits are funny"])];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            matcher().find(&message, &table, 0.99, &mut rng),
            Some("Bits are funny".to_string())
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let table = vec![group(&["weather", "It is sunny"])];
        let message = Message::new("rain", "bob").with_tokens(&["rain"]);
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(fixed(0.68).find(&message, &table, 0.68, &mut rng), None);
        assert_eq!(
            fixed(0.680_001).find(&message, &table, 0.68, &mut rng),
            Some("It is sunny".to_string())
        );
    }

    #[test]
    fn test_never_returns_stimulus() {
        let table = vec![group(&["ping", "pong", "pang", "pung"])];
        let message = Message::new("ping", "bob").with_tokens(&["ping"]);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let reply = matcher().find(&message, &table, 0.68, &mut rng).unwrap();
            assert_ne!(reply, "ping");
        }
    }

    #[test]
    fn test_first_matching_group_wins() {
        let table = vec![group(&["hello", "first"]), group(&["hello there", "second"])];
        let message = Message::new("hello there", "bob").with_tokens(&["hello", "there"]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            matcher().find(&message, &table, 0.68, &mut rng),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        let table = vec![group(&["astronomy", "Stars!"])];
        let message = Message::new("xyz", "bob").with_tokens(&["xyz"]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(matcher().find(&message, &table, 0.68, &mut rng), None);
        assert_eq!(matcher().find(&message, &Vec::new(), 0.68, &mut rng), None);
    }
}
