//! Autonomous Behavior Integration Tests
//!
//! Idle chatter snippets and feed digests.

use async_trait::async_trait;
use murmur::autonomous::{Feed, FeedDigest, FeedError, FeedItem, FeedProvider, IdleChatter};
use murmur::corpus::{LanguageDataset, ResponseGroup};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn group(entries: &[&str]) -> ResponseGroup {
    ResponseGroup::from_entries(entries.iter().map(|e| e.to_string()).collect()).unwrap()
}

/// Serves canned feeds; unknown URLs fail
struct StaticFeeds {
    feeds: HashMap<String, Feed>,
}

#[async_trait]
impl FeedProvider for StaticFeeds {
    async fn fetch(&self, url: &str) -> Result<Feed, FeedError> {
        self.feeds.get(url).cloned().ok_or(FeedError::Status(404))
    }
}

fn news_feed(count: usize) -> Feed {
    Feed {
        title: "Daily News".to_string(),
        items: (1..=count)
            .map(|i| FeedItem::new(&format!("Story {}", i), &format!("https://news.example.org/{}", i)))
            .collect(),
    }
}

#[test]
fn test_idle_snippet_is_reply_prefix() {
    let mut dataset = LanguageDataset::new();
    dataset.insert(
        "humor",
        vec![
            group(&["joke one", "a", "b", "c"]),
            group(&["joke two", "x", "y", "z"]),
        ],
    );
    let idle = IdleChatter::new(
        vec!["humor".to_string()],
        Duration::from_secs(120),
        Duration::from_secs(480),
    );

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let lines = idle.chatter(&dataset, &mut rng);
        assert!((1..=2).contains(&lines.len()), "got {} lines", lines.len());
        assert!(!lines.iter().any(|l| l.starts_with("joke")));

        let expected: &[&str] = if lines[0] == "a" { &["a", "b"] } else { &["x", "y"] };
        assert_eq!(lines, expected[..lines.len()]);
    }
}

#[tokio::test]
async fn test_feed_digest_respects_limit_and_order() {
    let provider = StaticFeeds {
        feeds: HashMap::from([("https://news.example.org/rss".to_string(), news_feed(5))]),
    };
    let digest = FeedDigest::new(Arc::new(provider), 3);

    let lines = digest.run(&["https://news.example.org/rss".to_string()]).await;
    assert_eq!(
        lines,
        vec![
            "📰 Latest entries on Daily News:".to_string(),
            "- Story 1: https://news.example.org/1".to_string(),
            "- Story 2: https://news.example.org/2".to_string(),
            "- Story 3: https://news.example.org/3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failing_feed_does_not_stop_others() {
    let provider = StaticFeeds {
        feeds: HashMap::from([("https://news.example.org/rss".to_string(), news_feed(1))]),
    };
    let digest = FeedDigest::new(Arc::new(provider), 3);

    let urls = vec![
        "https://broken.example.org/rss".to_string(),
        "https://news.example.org/rss".to_string(),
    ];
    let lines = digest.run(&urls).await;
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "I have a problem with https://broken.example.org/rss: server answered 404"
    );
    assert_eq!(lines[1], "📰 Latest entries on Daily News:");
}
