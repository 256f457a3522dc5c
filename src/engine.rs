//! Conversation Engine
//!
//! Turns an analyzed [`Message`] into at most one reply by walking a fixed
//! cascade of category lookups over the message's language dataset:
//!
//! 1. every lemma, in extraction order
//! 2. every neighbor of every token, in token order
//! 3. the `greetings` category
//! 4. the `conversations` category
//! 5. every category of the dataset, first at the strict threshold and then
//!    at the configured one
//!
//! The first reply produced anywhere ends the cascade.
//!
//! Slash commands (`/help`, `/feeds`, `/files`) bypass the corpus entirely.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::BotConfig;
use crate::corpus::{Corpus, LanguageDataset};
use crate::matcher::{Matcher, STRICT_THRESHOLD};
use crate::nlp::{language_name, FeatureExtractor, Message};
use crate::resolver::CategoryResolver;

pub const GREETINGS_CATEGORY: &str = "greetings";
pub const CONVERSATIONS_CATEGORY: &str = "conversations";

pub const HELP_TEXT: &str = "/help show this help message\n\
/feeds show the latest feeds entries\n\
/files show latest indexed files";

pub const NO_FEEDS_NOTICE: &str = "Sorry, no RSS feed has been configured yet";
pub const NO_DIRECTORIES_NOTICE: &str = "Sorry, no watched directory has been configured yet";

/// What a recognized slash command asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Send this text
    Reply(String),
    /// Run a feed digest now
    DigestFeeds,
    /// Request a listing of each directory
    ListDirectories(Vec<String>),
}

/// Corpus-driven reply selection
pub struct ConversationEngine {
    corpus: Arc<Corpus>,
    config: Arc<BotConfig>,
    resolver: CategoryResolver,
    matcher: Matcher,
}

impl ConversationEngine {
    pub fn new(corpus: Arc<Corpus>, config: Arc<BotConfig>, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self::with_matcher(
            corpus,
            config,
            extractor.clone(),
            Matcher::new(extractor),
        )
    }

    pub fn with_matcher(
        corpus: Arc<Corpus>,
        config: Arc<BotConfig>,
        extractor: Arc<dyn FeatureExtractor>,
        matcher: Matcher,
    ) -> Self {
        Self {
            corpus,
            config,
            resolver: CategoryResolver::new(extractor),
            matcher,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Reply to a message, or `None` when nothing in the corpus fits
    pub fn process<R: Rng + ?Sized>(&self, message: &Message, rng: &mut R) -> Option<String> {
        let code = match message.language_code() {
            Ok(code) => code,
            Err(e) => {
                debug!("No reply to '{}': {}", message.text, e);
                return None;
            }
        };
        let dataset = self.dataset_for(code)?;
        let threshold = self.config.fuzzy_threshold;

        for lemma in &message.lemmas {
            if let Some(reply) = self.try_category(dataset, lemma, message, threshold, rng) {
                trace!("Matched on lemma '{}'", lemma);
                return Some(reply);
            }
        }

        for token in &message.token_neighbors {
            for neighbor in &token.neighbors {
                if let Some(reply) = self.try_category(dataset, &neighbor.word, message, threshold, rng) {
                    trace!("Matched on neighbor '{}' of '{}'", neighbor.word, token.token);
                    return Some(reply);
                }
            }
        }

        for category in [GREETINGS_CATEGORY, CONVERSATIONS_CATEGORY] {
            if let Some(reply) = self.try_category(dataset, category, message, threshold, rng) {
                trace!("Matched in '{}'", category);
                return Some(reply);
            }
        }

        for category in dataset.category_names() {
            for pass in [STRICT_THRESHOLD, threshold] {
                if let Some(reply) = self.try_category(dataset, category, message, pass, rng) {
                    trace!("Matched in '{}' scanning at {:.2}", category, pass);
                    return Some(reply);
                }
            }
        }

        debug!("No reply found for '{}'", message.text);
        None
    }

    /// Random reply of the first group the `greetings` key resolves to.
    /// The caller addresses it to the newcomer.
    pub fn greet<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let dataset = self.corpus.language(&self.config.primary_language)?;
        let group = self.resolver.resolve(dataset, GREETINGS_CATEGORY)?.first()?;
        group.replies().choose(rng).cloned()
    }

    /// Dispatch a slash command; unknown commands yield `None`
    pub fn process_command(&self, text: &str) -> Option<CommandOutcome> {
        let command = text.trim();

        match command {
            "/help" => Some(CommandOutcome::Reply(HELP_TEXT.to_string())),
            "/feeds" => {
                if self.config.feeds.is_empty() {
                    Some(CommandOutcome::Reply(NO_FEEDS_NOTICE.to_string()))
                } else {
                    Some(CommandOutcome::DigestFeeds)
                }
            }
            "/files" => {
                if self.config.watched_directories.is_empty() {
                    Some(CommandOutcome::Reply(NO_DIRECTORIES_NOTICE.to_string()))
                } else {
                    Some(CommandOutcome::ListDirectories(
                        self.config.watched_directories.clone(),
                    ))
                }
            }
            _ => {
                debug!("Ignoring unknown command {}", command);
                None
            }
        }
    }

    /// Dataset for a language code, falling back to the primary language
    fn dataset_for(&self, code: &str) -> Option<&LanguageDataset> {
        let code = code.to_lowercase();
        language_name(&code)
            .and_then(|name| self.corpus.language(name))
            .or_else(|| self.corpus.language(&code))
            .or_else(|| self.corpus.language(&self.config.primary_language))
    }

    fn try_category<R: Rng + ?Sized>(
        &self,
        dataset: &LanguageDataset,
        key: &str,
        message: &Message,
        threshold: f64,
        rng: &mut R,
    ) -> Option<String> {
        let table = self.resolver.resolve(dataset, key)?;
        self.matcher.find(message, table, threshold, rng)
    }
}

/// Whether chat text is a slash command rather than conversation
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}
