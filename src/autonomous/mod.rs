//! Autonomous Behavior
//!
//! Two independently timed behaviors that speak without being spoken to:
//! - **Idle chatter**: after a random quiet period, recite a snippet from an
//!   interest category, then draw a fresh period
//! - **Feed digest**: on a fixed period, summarize every configured feed
//!
//! The scheduler only keeps the timers; the bot's event loop waits on them
//! alongside inbound events so everything runs on one task.

mod feeds;
mod idle;
mod timer;

pub use feeds::{parse_feed, Feed, FeedDigest, FeedError, FeedItem, FeedProvider, HttpFeedProvider};
pub use idle::IdleChatter;
pub use timer::{wait_until, IdleTimer};

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use crate::config::BotConfig;
use crate::corpus::LanguageDataset;

/// Owner of the idle timer and the feed period
pub struct AutonomyScheduler {
    idle: IdleChatter,
    timer: IdleTimer,
    feed_period: Duration,
    digest: FeedDigest,
}

impl AutonomyScheduler {
    pub fn new(config: &BotConfig, provider: Arc<dyn FeedProvider>) -> Self {
        let (min, max) = config.idle_bounds();
        Self {
            idle: IdleChatter::new(config.idle_categories.clone(), min, max),
            timer: IdleTimer::new(),
            feed_period: config.feed_interval(),
            digest: FeedDigest::new(provider, config.feed_item_limit),
        }
    }

    /// Replace the pending idle deadline with a freshly drawn one
    pub fn reset_idle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let after = self.idle.next_interval(rng);
        self.timer.schedule(after);
        debug!("Idle chatter in {:.0}s", after.as_secs_f64());
        after
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Chatter lines once the idle deadline has passed; a fired timer is rescheduled
    pub fn fire_idle<R: Rng + ?Sized>(
        &mut self,
        dataset: Option<&LanguageDataset>,
        rng: &mut R,
    ) -> Vec<String> {
        if !self.timer.fire() {
            return Vec::new();
        }
        let lines = match dataset {
            Some(dataset) => self.idle.chatter(dataset, &mut *rng),
            None => Vec::new(),
        };
        self.reset_idle(rng);
        lines
    }

    /// Repeating feed ticker, first tick one full period from now
    pub fn feed_ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.feed_period, self.feed_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    pub async fn digest_feeds(&self, urls: &[String]) -> Vec<String> {
        self.digest.run(urls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ResponseGroup;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct NoFeeds;

    #[async_trait]
    impl FeedProvider for NoFeeds {
        async fn fetch(&self, _url: &str) -> Result<Feed, FeedError> {
            Err(FeedError::NotAFeed)
        }
    }

    fn config() -> BotConfig {
        BotConfig {
            min_idle_secs: 10.0,
            max_idle_secs: 20.0,
            idle_categories: vec!["humor".to_string()],
            ..BotConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_fires_and_reschedules() {
        let mut scheduler = AutonomyScheduler::new(&config(), Arc::new(NoFeeds));
        let mut rng = StdRng::seed_from_u64(9);
        let mut dataset = LanguageDataset::new();
        dataset.insert(
            "humor",
            vec![ResponseGroup::from_entries(vec!["joke".to_string(), "ha".to_string()]).unwrap()],
        );

        assert!(scheduler.fire_idle(Some(&dataset), &mut rng).is_empty());

        scheduler.reset_idle(&mut rng);
        let first = scheduler.idle_deadline().unwrap();
        assert!(scheduler.fire_idle(Some(&dataset), &mut rng).is_empty());

        wait_until(Some(first)).await;
        assert_eq!(scheduler.fire_idle(Some(&dataset), &mut rng), vec!["ha".to_string()]);
        assert!(scheduler.idle_deadline().unwrap() > first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_ticker_waits_a_full_period() {
        let scheduler = AutonomyScheduler::new(&config(), Arc::new(NoFeeds));
        let start = Instant::now();
        let mut ticker = scheduler.feed_ticker();
        ticker.tick().await;
        assert!(Instant::now() - start >= Duration::from_secs(900));
    }
}
