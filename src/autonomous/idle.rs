//! Idle chatter
//!
//! After a random quiet period the bot picks one of its interest
//! categories, one group of that category, and recites a random-length
//! prefix of the group's replies.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

use crate::corpus::LanguageDataset;

#[derive(Debug, Clone)]
pub struct IdleChatter {
    categories: Vec<String>,
    min_interval: Duration,
    max_interval: Duration,
}

impl IdleChatter {
    pub fn new(categories: Vec<String>, min_interval: Duration, max_interval: Duration) -> Self {
        Self {
            categories: categories.into_iter().map(|c| c.to_lowercase()).collect(),
            min_interval,
            max_interval: max_interval.max(min_interval),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Uniform draw from `[min, max)`; exactly `min` when the bounds coincide
    pub fn next_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_interval <= self.min_interval {
            return self.min_interval;
        }
        let secs = rng.gen_range(self.min_interval.as_secs_f64()..self.max_interval.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Lines to emit; empty when the chosen category is absent from the dataset
    pub fn chatter<R: Rng + ?Sized>(&self, dataset: &LanguageDataset, rng: &mut R) -> Vec<String> {
        let Some(category) = self.categories.choose(rng) else {
            debug!("No interest categories configured");
            return Vec::new();
        };
        let Some(group) = dataset.table(category).and_then(|table| table.choose(rng)) else {
            warn!("Interest category '{}' has no response groups", category);
            return Vec::new();
        };

        let replies = group.replies();
        let cut = rng.gen_range(0..replies.len()).max(1);
        debug!("Idle chatter from '{}': {} line(s)", category, cut);
        replies[..cut].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ResponseGroup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn group(entries: &[&str]) -> ResponseGroup {
        ResponseGroup::from_entries(entries.iter().map(|e| e.to_string()).collect()).unwrap()
    }

    fn chatter(categories: &[&str]) -> IdleChatter {
        IdleChatter::new(
            categories.iter().map(|c| c.to_string()).collect(),
            Duration::from_secs(120),
            Duration::from_secs(480),
        )
    }

    #[test]
    fn test_interval_within_bounds() {
        let idle = chatter(&["humor"]);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let interval = idle.next_interval(&mut rng);
            assert!(interval >= Duration::from_secs(120));
            assert!(interval < Duration::from_secs(480));
        }

        let fixed = IdleChatter::new(vec![], Duration::from_secs(30), Duration::from_secs(30));
        assert_eq!(fixed.next_interval(&mut rng), Duration::from_secs(30));
    }

    #[test]
    fn test_single_reply_group() {
        let mut dataset = LanguageDataset::new();
        dataset.insert("humor", vec![group(&["knock knock", "who's there?"])]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            chatter(&["humor"]).chatter(&dataset, &mut rng),
            vec!["who's there?".to_string()]
        );
    }

    #[test]
    fn test_missing_category_emits_nothing() {
        let dataset = LanguageDataset::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(chatter(&["sports"]).chatter(&dataset, &mut rng).is_empty());
        assert!(chatter(&[]).chatter(&dataset, &mut rng).is_empty());
    }
}
