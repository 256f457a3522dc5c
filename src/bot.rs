//! Bot
//!
//! Facade tying the engine, the autonomous scheduler and the listing
//! aggregator to a transport. Everything runs on a single task: inbound
//! events, the idle deadline, the feed ticker and shutdown are multiplexed
//! in one `select!` loop, so no component ever runs concurrently with
//! another and no locking is needed around the corpus or the listing buffer.
//!
//! ```text
//! transport ──► Event ──► Bot::handle ──► ConversationEngine ──► BotDelegate::send
//!                            │
//!                            ├── idle deadline ──► IdleChatter
//!                            ├── feed ticker ────► FeedDigest
//!                            └── listing events ─► FileListingAggregator
//! ```

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::autonomous::{wait_until, AutonomyScheduler, FeedProvider};
use crate::config::BotConfig;
use crate::corpus::Corpus;
use crate::delegate::BotDelegate;
use crate::engine::{is_command, CommandOutcome, ConversationEngine};
use crate::files::{FileEntry, FileListingAggregator, ListingState};
use crate::nlp::FeatureExtractor;

/// Range of the pause before a conversational reply, in seconds
const TYPING_DELAY_SECS: std::ops::Range<f64> = 2.0..6.0;

/// Inbound transport events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Chat { nick: String, text: String },
    UserJoined { nick: String },
    UserLeft { nick: String },
    /// A subscribed directory changed
    DirectoryChanged { path: String },
    /// One file of the listing in progress
    FileEntry {
        path: PathBuf,
        modified_at: DateTime<Utc>,
    },
    /// End of the listing in progress
    FileListDone,
}

impl Event {
    pub fn chat(nick: &str, text: &str) -> Self {
        Event::Chat {
            nick: nick.to_string(),
            text: text.to_string(),
        }
    }
}

/// Shared collaborators handed to the bot at construction
#[derive(Clone)]
pub struct BotContext {
    pub config: Arc<BotConfig>,
    pub corpus: Arc<Corpus>,
    pub extractor: Arc<dyn FeatureExtractor>,
    pub delegate: Arc<dyn BotDelegate>,
    pub feeds: Arc<dyn FeedProvider>,
}

pub struct Bot {
    context: BotContext,
    engine: ConversationEngine,
    scheduler: AutonomyScheduler,
    listing: FileListingAggregator,
    pending_listings: VecDeque<String>,
    rng: StdRng,
}

impl Bot {
    pub fn new(context: BotContext) -> Self {
        Self::with_rng(context, StdRng::from_entropy())
    }

    /// Bot drawing every random choice from `rng`
    pub fn with_rng(context: BotContext, rng: StdRng) -> Self {
        let engine = ConversationEngine::new(
            context.corpus.clone(),
            context.config.clone(),
            context.extractor.clone(),
        );
        let scheduler = AutonomyScheduler::new(&context.config, context.feeds.clone());
        Self {
            context,
            engine,
            scheduler,
            listing: FileListingAggregator::new(),
            pending_listings: VecDeque::new(),
            rng,
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &AutonomyScheduler {
        &self.scheduler
    }

    pub fn listing_state(&self) -> ListingState {
        self.listing.state()
    }

    /// Directories waiting for the current listing to finish
    pub fn pending_listings(&self) -> usize {
        self.pending_listings.len()
    }

    /// Subscribe to watched directories and arm the idle timer
    pub async fn start(&mut self) {
        for directory in &self.context.config.watched_directories {
            self.context.delegate.subscribe_to_directory(directory).await;
        }
        self.scheduler.reset_idle(&mut self.rng);
    }

    /// Process one inbound event
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Chat { nick, text } => self.on_chat(&nick, &text).await,
            Event::UserJoined { nick } => self.on_join(&nick).await,
            Event::UserLeft { nick } => debug!("{} left", nick),
            Event::DirectoryChanged { path } => {
                debug!("Directory changed: {}", path);
                self.request_listing(path).await;
            }
            Event::FileEntry { path, modified_at } => {
                if let Err(e) = self.listing.add(FileEntry::new(path, modified_at)) {
                    error!("Dropping listing event: {}", e);
                }
            }
            Event::FileListDone => self.on_listing_done().await,
        }
    }

    /// Emit idle chatter if the idle deadline has passed
    pub async fn on_idle(&mut self) {
        let dataset = self.context.corpus.language(&self.context.config.primary_language);
        let lines = self.scheduler.fire_idle(dataset, &mut self.rng);
        if !lines.is_empty() {
            info!("Idle chatter: {} line(s)", lines.len());
        }
        for line in lines {
            self.send(&line).await;
        }
    }

    /// Digest every configured feed now
    pub async fn digest_feeds(&mut self) {
        let lines = self.scheduler.digest_feeds(&self.context.config.feeds).await;
        for line in lines {
            self.send(&line).await;
        }
    }

    /// Event loop; returns when the event stream closes or shutdown is signalled
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>, mut shutdown: watch::Receiver<bool>) {
        self.start().await;
        let mut feeds = self.scheduler.feed_ticker();
        let feeds_enabled = !self.context.config.feeds.is_empty();
        info!("{} is listening", self.context.config.nick);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => {
                        info!("Event stream closed");
                        break;
                    }
                },
                _ = wait_until(self.scheduler.idle_deadline()) => self.on_idle().await,
                _ = feeds.tick(), if feeds_enabled => self.digest_feeds().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("{} shutting down", self.context.config.nick);
                        break;
                    }
                }
            }
        }
    }

    async fn on_chat(&mut self, nick: &str, text: &str) {
        if nick == self.context.config.nick {
            return;
        }
        self.scheduler.reset_idle(&mut self.rng);

        if is_command(text) {
            self.on_command(text).await;
            return;
        }

        let message = self.context.extractor.extract(text, nick);
        if let Some(reply) = self.engine.process(&message, &mut self.rng) {
            self.send_paced(&reply).await;
        }
    }

    async fn on_command(&mut self, text: &str) {
        match self.engine.process_command(text) {
            Some(CommandOutcome::Reply(reply)) => self.send(&reply).await,
            Some(CommandOutcome::DigestFeeds) => self.digest_feeds().await,
            Some(CommandOutcome::ListDirectories(directories)) => {
                for directory in directories {
                    self.request_listing(directory).await;
                }
            }
            None => {}
        }
    }

    async fn on_join(&mut self, nick: &str) {
        if nick == self.context.config.nick {
            return;
        }
        if let Some(greeting) = self.engine.greet(&mut self.rng) {
            self.send_paced(&format!("{} {}", greeting, nick)).await;
        }
    }

    /// Queue a listing; only one listing collects at a time
    async fn request_listing(&mut self, path: String) {
        if !self.pending_listings.contains(&path) {
            self.pending_listings.push_back(path);
        }
        if !self.listing.is_collecting() {
            self.start_next_listing().await;
        }
    }

    async fn start_next_listing(&mut self) {
        if let Some(path) = self.pending_listings.pop_front() {
            self.listing.begin();
            self.context.delegate.list_directory(&path).await;
        }
    }

    async fn on_listing_done(&mut self) {
        let config = self.context.config.clone();
        match self.listing.finalize(config.recent_files_limit) {
            Ok(digest) => {
                for line in digest.lines(&config.file_link_scheme) {
                    self.send(&line).await;
                }
            }
            Err(e) => error!("Dropping listing terminator: {}", e),
        }
        self.start_next_listing().await;
    }

    async fn send_paced(&mut self, text: &str) {
        if self.context.config.typing_delay {
            let pause = Duration::from_secs_f64(self.rng.gen_range(TYPING_DELAY_SECS));
            tokio::time::sleep(pause).await;
        }
        self.send(text).await;
    }

    async fn send(&self, text: &str) {
        debug!("Sending: {}", text);
        self.context.delegate.send(text).await;
    }
}
