//! Feed Digests
//!
//! Periodic summary of the configured RSS/Atom feeds. Each feed is fetched
//! in configured order; a failing feed contributes a single diagnostic line
//! and never stops the remaining ones.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

static DOCUMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(rss|feed|rdf:RDF)\b").unwrap());
static ITEM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(item|entry)\b[^>]*>(.*?)</(?:item|entry)>").unwrap());
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").unwrap());
static LINK_TEXT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").unwrap());
static LINK_HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).unwrap());
static CDATA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// Feed fetch and parse failures
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(u16),

    #[error("not an RSS or Atom document")]
    NotAFeed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

impl FeedItem {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
        }
    }
}

/// Parsed feed, items in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub items: Vec<FeedItem>,
}

/// Source of feed contents
#[async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Feed, FeedError>;
}

/// Fetches feeds over HTTP
pub struct HttpFeedProvider {
    client: reqwest::Client,
}

impl HttpFeedProvider {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("murmur/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedProvider for HttpFeedProvider {
    async fn fetch(&self, url: &str) -> Result<Feed, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_feed(&body)
    }
}

/// Extract the channel title and item title/link pairs of an RSS or Atom body
pub fn parse_feed(body: &str) -> Result<Feed, FeedError> {
    if !DOCUMENT_PATTERN.is_match(body) {
        return Err(FeedError::NotAFeed);
    }

    let head_end = ITEM_PATTERN.find(body).map_or(body.len(), |m| m.start());
    let title = first_capture(&TITLE_PATTERN, &body[..head_end]).unwrap_or_default();

    let items = ITEM_PATTERN
        .captures_iter(body)
        .filter_map(|caps| {
            let inner = caps.get(2)?.as_str();
            let title = first_capture(&TITLE_PATTERN, inner).unwrap_or_default();
            let link = first_capture(&LINK_TEXT_PATTERN, inner)
                .filter(|l| !l.is_empty())
                .or_else(|| first_capture(&LINK_HREF_PATTERN, inner))?;
            Some(FeedItem { title, link })
        })
        .collect();

    Ok(Feed { title, items })
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_text(m.as_str()))
}

fn decode_text(raw: &str) -> String {
    let unwrapped = CDATA_PATTERN.replace_all(raw, "$1");
    unwrapped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Turns configured feeds into chat lines
#[derive(Clone)]
pub struct FeedDigest {
    provider: Arc<dyn FeedProvider>,
    item_limit: usize,
}

impl FeedDigest {
    pub fn new(provider: Arc<dyn FeedProvider>, item_limit: usize) -> Self {
        Self {
            provider,
            item_limit,
        }
    }

    /// Lines for every feed, in configured order
    pub async fn run(&self, urls: &[String]) -> Vec<String> {
        let mut lines = Vec::new();
        for url in urls {
            match self.provider.fetch(url).await {
                Ok(feed) => {
                    debug!("Feed {}: {} items", url, feed.items.len());
                    lines.extend(self.format(url, &feed));
                }
                Err(e) => {
                    warn!("Feed {} failed: {}", url, e);
                    lines.push(format!("I have a problem with {}: {}", url, e));
                }
            }
        }
        info!("Feed digest: {} feeds, {} lines", urls.len(), lines.len());
        lines
    }

    fn format(&self, url: &str, feed: &Feed) -> Vec<String> {
        let title = if feed.title.is_empty() { url } else { feed.title.as_str() };
        let mut lines = vec![format!("📰 Latest entries on {}:", title)];
        lines.extend(
            feed.items
                .iter()
                .take(self.item_limit)
                .map(|item| format!("- {}: {}", item.title, item.link)),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>Planet &amp; Friends</title>
<link>https://planet.example.org</link>
<item><title><![CDATA[First <post>]]></title><link>https://planet.example.org/1</link></item>
<item><title>Second</title><link>https://planet.example.org/2</link></item>
</channel></rss>"#;

    const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
<title>Atom Log</title>
<entry><title>Hello</title><link rel="alternate" href="https://log.example.org/hello"/></entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let feed = parse_feed(RSS).unwrap();
        assert_eq!(feed.title, "Planet & Friends");
        assert_eq!(
            feed.items,
            vec![
                FeedItem::new("First <post>", "https://planet.example.org/1"),
                FeedItem::new("Second", "https://planet.example.org/2"),
            ]
        );
    }

    #[test]
    fn test_parse_atom() {
        let feed = parse_feed(ATOM).unwrap();
        assert_eq!(feed.title, "Atom Log");
        assert_eq!(feed.items, vec![FeedItem::new("Hello", "https://log.example.org/hello")]);
    }

    #[test]
    fn test_parse_rejects_html() {
        assert!(matches!(
            parse_feed("<html><title>nope</title></html>"),
            Err(FeedError::NotAFeed)
        ));
    }
}
