//! Murmur
//!
//! Corpus-driven chat bot: replies by resolving what was said to a category
//! of a multilingual stimulus/response corpus, and talks on its own when the
//! room goes quiet or a feed has news.
//!
//! # Features
//!
//! - **Category Cascade**: lemmas, word neighbors, greetings, then every category
//! - **Fuzzy Matching**: Bitap scoring with a strict-then-loose exhaustive pass
//! - **Multilingual Corpus**: YAML / JSON / TOML category files per language
//! - **Idle Chatter**: random-interval snippets from interest categories
//! - **Feed Digests**: periodic RSS / Atom summaries
//! - **File Digests**: newest files of watched directories
//!
//! # Architecture
//!
//! ```text
//! Transport ──► Event ──► Bot ──► ConversationEngine ──► Matcher
//!                          │            │                  (Bitap)
//!                          │            └── CategoryResolver
//!                          │                 (thesaurus neighbors)
//!                          ├── AutonomyScheduler (idle + feeds)
//!                          ├── FileListingAggregator
//!                          └── BotDelegate (send / subscribe / list)
//! ```

pub mod autonomous;
pub mod bot;
pub mod config;
pub mod console;
pub mod corpus;
pub mod delegate;
pub mod engine;
pub mod files;
pub mod fuzzy;
pub mod matcher;
pub mod nlp;
pub mod resolver;

pub use autonomous::{AutonomyScheduler, Feed, FeedDigest, FeedError, FeedItem, FeedProvider, HttpFeedProvider, IdleChatter, IdleTimer};
pub use bot::{Bot, BotContext, Event};
pub use config::BotConfig;
pub use console::ConsoleTransport;
pub use corpus::{Corpus, CorpusLoader, LanguageDataset, LoadError, ResponseGroup, ResponseTable};
pub use delegate::{BotDelegate, DelegateCall, NullDelegate, RecordingDelegate};
pub use engine::{CommandOutcome, ConversationEngine};
pub use files::{FileDigest, FileEntry, FileListingAggregator, ListingState, ProtocolViolation};
pub use fuzzy::{Bitap, SimilarityScorer};
pub use matcher::Matcher;
pub use nlp::{BasicExtractor, FeatureError, FeatureExtractor, Message, Neighbor, Thesaurus};
pub use resolver::CategoryResolver;
