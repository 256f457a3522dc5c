//! Configuration management
//!
//! Bot settings live in a JSON file (default `~/.murmur/murmur.json`).
//! Every key is optional; a missing file is created with the defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Categories the idle chatter picks from when nothing is configured
/// Longest idle or feed period accepted (one year)
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 3600);

pub const DEFAULT_IDLE_CATEGORIES: &[&str] = &[
    "humor",
    "literature",
    "sports",
    "science",
    "emotion",
    "computers",
    "history",
];

/// Bot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Dataset used for greetings, idle chatter and unknown language codes
    pub primary_language: String,

    /// Nickname the bot speaks under
    pub nick: String,

    /// Fuzzy similarity a stimulus must exceed to match (0..1)
    pub fuzzy_threshold: f64,

    /// Lower bound of the idle chatter interval, in seconds
    pub min_idle_secs: f64,

    /// Upper bound (exclusive) of the idle chatter interval, in seconds
    pub max_idle_secs: f64,

    /// Categories the idle chatter draws from
    pub idle_categories: Vec<String>,

    /// Seconds between two feed digests
    pub feed_check_secs: u64,

    /// Items shown per feed in a digest
    pub feed_item_limit: usize,

    /// Files shown per directory digest
    pub recent_files_limit: usize,

    /// RSS / Atom feed URLs, digested in this order
    pub feeds: Vec<String>,

    /// Directories to subscribe to and list
    pub watched_directories: Vec<String>,

    /// Pause 2-6 seconds before conversational replies
    pub typing_delay: bool,

    /// URL scheme used for links in file digests
    pub file_link_scheme: String,

    /// Root of the multilingual corpus (one sub-directory per language)
    pub corpus_path: PathBuf,

    /// Optional word-neighbor table for synonym expansion
    pub thesaurus_path: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            primary_language: "english".to_string(),
            nick: "Murmur".to_string(),
            fuzzy_threshold: 0.68,
            min_idle_secs: 120.0,
            max_idle_secs: 480.0,
            idle_categories: DEFAULT_IDLE_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            feed_check_secs: 900,
            feed_item_limit: 3,
            recent_files_limit: 5,
            feeds: Vec::new(),
            watched_directories: Vec::new(),
            typing_delay: true,
            file_link_scheme: "file".to_string(),
            corpus_path: app_dir().join("corpus"),
            thesaurus_path: None,
        }
    }
}

impl BotConfig {
    /// Load configuration from a JSON file, writing the defaults first if it is missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                warn!("Could not write default config to {}: {}", path.display(), e);
            } else {
                info!("Wrote default config to {}", path.display());
            }
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&raw).with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply environment overrides (`MURMUR_CORPUS`, `MURMUR_NICK`)
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("MURMUR_CORPUS") {
            self.corpus_path = PathBuf::from(path);
        }
        if let Ok(nick) = std::env::var("MURMUR_NICK") {
            self.nick = nick;
        }
        self.normalize();
    }

    /// Reject settings the scheduler and matcher cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            bail!("fuzzy_threshold must be within [0, 1], got {}", self.fuzzy_threshold);
        }
        let min = period("min_idle_secs", self.min_idle_secs)?;
        let max = period("max_idle_secs", self.max_idle_secs)?;
        if min > max {
            bail!(
                "invalid idle bounds: min {} / max {}",
                self.min_idle_secs,
                self.max_idle_secs
            );
        }
        if self.feed_check_secs == 0 {
            bail!("feed_check_secs must be positive");
        }
        if Duration::from_secs(self.feed_check_secs) > MAX_PERIOD {
            bail!(
                "feed_check_secs must not exceed {}, got {}",
                MAX_PERIOD.as_secs(),
                self.feed_check_secs
            );
        }
        Ok(())
    }

    /// Feed period, capped at [`MAX_PERIOD`]
    pub fn feed_interval(&self) -> Duration {
        Duration::from_secs(self.feed_check_secs).min(MAX_PERIOD)
    }

    /// Idle bounds; values `validate` would reject are clamped into `[0, MAX_PERIOD]`
    pub fn idle_bounds(&self) -> (Duration, Duration) {
        let clamp = |secs: f64| Duration::try_from_secs_f64(secs).map_or(MAX_PERIOD, |d| d.min(MAX_PERIOD));
        let min = clamp(self.min_idle_secs.max(0.0));
        let max = clamp(self.max_idle_secs.max(0.0));
        (min.min(max), max)
    }

    /// Lower-case names and expand `~` in paths
    fn normalize(&mut self) {
        self.primary_language = self.primary_language.to_lowercase();
        self.idle_categories = self.idle_categories.iter().map(|c| c.to_lowercase()).collect();
        self.corpus_path = expand(&self.corpus_path);
        self.thesaurus_path = self.thesaurus_path.as_deref().map(expand);
    }
}

/// `secs` as a duration no longer than [`MAX_PERIOD`]
fn period(name: &str, secs: f64) -> Result<Duration> {
    let duration = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", name, secs))?;
    if duration > MAX_PERIOD {
        bail!("{} must not exceed {}, got {}", name, MAX_PERIOD.as_secs(), secs);
    }
    Ok(duration)
}

/// Application directory (`~/.murmur`)
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".murmur")
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    app_dir().join("murmur.json")
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
