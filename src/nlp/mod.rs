//! Linguistic Features
//!
//! The conversation engine never looks at raw text alone: it consumes a
//! [`Message`] feature bundle produced by a [`FeatureExtractor`]. The
//! extractor also provides the two text services the engine needs at match
//! time, `symbolize` (canonical form of a stimulus) and `neighbors`
//! (nearest words for synonym expansion of category names).

mod basic;

pub use basic::{BasicExtractor, Thesaurus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Words that open a question
const QUESTION_PREFIXES: &[&str] = &[
    "how", "what", "who", "where", "when", "which", "why", "whose", "do", "did", "does",
];

/// Feature extraction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("could not determine the language of the message")]
    UnknownLanguage,
}

/// A nearby word and its embedding distance (smaller is closer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub word: String,
    pub distance: f64,
}

impl Neighbor {
    pub fn new(word: &str, distance: f64) -> Self {
        Self {
            word: word.to_string(),
            distance,
        }
    }
}

/// Neighbors of one message token, closest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenNeighbors {
    pub token: String,
    pub neighbors: Vec<Neighbor>,
}

/// Incoming utterance plus everything extracted from it
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    /// Dominant language code (`en`, `fr`, ...)
    pub language: Option<String>,
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
    /// Same order as `tokens`
    pub token_neighbors: Vec<TokenNeighbors>,
    /// Paragraph sentiment in `[-1, 1]`
    pub sentiment: f64,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub places: Vec<String>,
    pub interjections: Vec<String>,
    /// Lemmatized, function-word-free, lower-cased form
    pub symbol_text: String,
}

impl Message {
    /// Bare message with no extracted features
    pub fn new(text: &str, sender: &str) -> Self {
        Self {
            text: text.to_string(),
            sender: sender.to_string(),
            timestamp: Utc::now(),
            language: None,
            tokens: Vec::new(),
            lemmas: Vec::new(),
            token_neighbors: Vec::new(),
            sentiment: 0.0,
            persons: Vec::new(),
            organizations: Vec::new(),
            places: Vec::new(),
            interjections: Vec::new(),
            symbol_text: text.to_lowercase(),
        }
    }

    pub fn with_language(mut self, code: &str) -> Self {
        self.language = Some(code.to_string());
        self
    }

    /// Set tokens; lemmas default to the lower-cased tokens
    pub fn with_tokens(mut self, tokens: &[&str]) -> Self {
        self.tokens = tokens.iter().map(|t| t.to_string()).collect();
        self.lemmas = tokens.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn with_lemmas(mut self, lemmas: &[&str]) -> Self {
        self.lemmas = lemmas.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_neighbors(mut self, token: &str, neighbors: Vec<Neighbor>) -> Self {
        self.token_neighbors.push(TokenNeighbors {
            token: token.to_string(),
            neighbors,
        });
        self
    }

    pub fn with_symbol_text(mut self, symbol_text: &str) -> Self {
        self.symbol_text = symbol_text.to_string();
        self
    }

    /// Language code, or why there is none
    pub fn language_code(&self) -> Result<&str, FeatureError> {
        self.language.as_deref().ok_or(FeatureError::UnknownLanguage)
    }

    pub fn is_positive(&self) -> bool {
        self.sentiment > 0.0
    }

    pub fn is_interrogative(&self) -> bool {
        let text = self.text.trim().to_lowercase();
        if text.ends_with('?') {
            return true;
        }
        QUESTION_PREFIXES.iter().any(|p| text.starts_with(p))
    }

    pub fn is_interjection(&self) -> bool {
        !self.interjections.is_empty()
    }
}

/// Text-to-features capability
pub trait FeatureExtractor: Send + Sync {
    /// Extract the full feature bundle of an utterance
    fn extract(&self, text: &str, sender: &str) -> Message;

    /// Canonical matching form: function words dropped, lemmatized, lower-cased
    fn symbolize(&self, text: &str) -> String;

    /// Up to `limit` nearest words, closest first
    fn neighbors(&self, word: &str, limit: usize) -> Vec<Neighbor>;
}

/// Dataset name for a detected language code
///
/// A code that already names a dataset passes through; unknown codes yield `None`.
pub fn language_name(code: &str) -> Option<&'static str> {
    match code.to_lowercase().as_str() {
        "en" | "english" => Some("english"),
        "fr" | "french" => Some("french"),
        "es" | "sp" | "spanish" => Some("spanish"),
        "de" | "german" => Some("german"),
        "ja" | "jp" | "japanese" => Some("japanese"),
        _ => None,
    }
}

/// Language code for a dataset name, the inverse of [`language_name`]
pub fn language_code(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "english" | "en" => Some("en"),
        "french" | "fr" => Some("fr"),
        "spanish" | "es" | "sp" => Some("es"),
        "german" | "de" => Some("de"),
        "japanese" | "ja" | "jp" => Some("ja"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_names() {
        assert_eq!(language_name("en"), Some("english"));
        assert_eq!(language_name("FR"), Some("french"));
        assert_eq!(language_name("sp"), Some("spanish"));
        assert_eq!(language_name("jp"), Some("japanese"));
        assert_eq!(language_name("german"), Some("german"));
        assert_eq!(language_name("pt"), None);

        assert_eq!(language_code("French"), Some("fr"));
        assert_eq!(language_code("klingon"), None);
    }

    #[test]
    fn test_message_flags() {
        let question = Message::new("what time is it", "bob");
        assert!(question.is_interrogative());
        assert!(Message::new("Is it late?", "bob").is_interrogative());
        assert!(!Message::new("It is late.", "bob").is_interrogative());

        let mut happy = Message::new("great", "bob");
        happy.sentiment = 0.5;
        assert!(happy.is_positive());
    }

    #[test]
    fn test_missing_language() {
        let message = Message::new("...", "bob");
        assert_eq!(message.language_code(), Err(FeatureError::UnknownLanguage));
        assert_eq!(message.with_language("en").language_code(), Ok("en"));
    }
}
