//! Lexicon-based feature extractor
//!
//! Small, deterministic stand-in for a real NLP toolkit: stop-word voting for
//! language detection, suffix rules for English lemmas, word lists for
//! sentiment and interjections, capitalization heuristics for named
//! entities, and an optional thesaurus file for word neighbors.

use super::{FeatureExtractor, Message, Neighbor, TokenNeighbors};
use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*").unwrap());

static CJK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Hiragana}\p{Katakana}\p{Han}]").unwrap());

/// Determiners, prepositions, conjunctions and particles per language
static FUNCTION_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every",
            "of", "in", "on", "at", "to", "for", "with", "by", "from", "about", "into", "onto",
            "over", "under", "after", "before", "between", "through", "during", "without",
            "and", "or", "but", "nor", "so", "yet", "if", "because", "as", "than", "whether",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "l", "un", "une", "des", "du", "de", "d", "à", "au", "aux", "en",
            "dans", "sur", "sous", "pour", "par", "avec", "sans", "et", "ou", "mais", "donc",
            "ni", "car", "que", "qu", "ce", "cette", "ces",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "un", "una", "unos", "unas", "de", "del", "a", "al", "en",
            "con", "por", "para", "sin", "sobre", "y", "o", "pero", "que", "este", "esta",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "den", "dem", "des", "ein", "eine", "einen", "einem", "einer",
            "in", "im", "an", "am", "auf", "mit", "von", "zu", "zum", "zur", "für", "aus", "bei",
            "nach", "und", "oder", "aber", "denn",
        ],
    ),
];

/// Frequent words that vote for a language on top of its function words
static LANGUAGE_MARKERS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "i", "you", "he", "she", "we", "they", "is", "are", "was", "am", "be", "have",
            "do", "not", "what", "how", "who", "hello", "hi", "thanks", "yes", "my", "your", "it",
        ],
    ),
    (
        "fr",
        &[
            "je", "tu", "il", "elle", "nous", "vous", "est", "suis", "sont", "pas", "bonjour",
            "merci", "oui", "non", "comment", "quoi", "salut",
        ],
    ),
    (
        "es",
        &[
            "yo", "tú", "él", "ella", "es", "estoy", "son", "hola", "gracias", "sí", "no",
            "cómo", "qué", "muy",
        ],
    ),
    (
        "de",
        &[
            "ich", "du", "er", "sie", "wir", "ist", "bin", "sind", "nicht", "hallo", "danke",
            "ja", "nein", "wie", "was", "guten",
        ],
    ),
];

static POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "like", "nice", "happy", "awesome", "excellent", "thanks", "thank",
    "wonderful", "fun", "cool", "glad", "beautiful", "best", "amazing", "enjoy", "perfect",
];

static NEGATIVE_WORDS: &[&str] = &[
    "bad", "hate", "sad", "terrible", "awful", "angry", "worst", "boring", "ugly", "stupid",
    "horrible", "wrong", "annoying", "broken", "hurt",
];

static INTERJECTIONS: &[&str] = &[
    "hello", "hi", "hey", "wow", "oh", "ouch", "oops", "yay", "hmm", "bye", "ah", "ha", "haha",
    "lol", "ugh",
];

static IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("is", "be"), ("am", "be"), ("are", "be"), ("was", "be"), ("were", "be"), ("been", "be"),
    ("being", "be"), ("has", "have"), ("had", "have"), ("does", "do"), ("did", "do"),
    ("done", "do"), ("went", "go"), ("gone", "go"), ("better", "good"), ("best", "good"),
    ("children", "child"), ("men", "man"), ("women", "woman"), ("mice", "mouse"),
    ("feet", "foot"), ("teeth", "tooth"), ("people", "person"), ("made", "make"),
    ("said", "say"), ("thought", "think"),
];

static PLACE_PREPOSITIONS: &[&str] = &["in", "at", "from", "to"];

/// Word -> neighbors table used for synonym expansion
#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    entries: HashMap<String, Vec<Neighbor>>,
}

impl Thesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{"word": {"neighbor": distance, ...}, ...}`
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading thesaurus {}", path.display()))?;
        let table: HashMap<String, HashMap<String, f64>> =
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

        let mut thesaurus = Self::new();
        for (word, neighbors) in table {
            for (neighbor, distance) in neighbors {
                thesaurus.insert(&word, &neighbor, distance);
            }
        }
        debug!("Thesaurus loaded: {} words", thesaurus.entries.len());
        Ok(thesaurus)
    }

    /// Record a neighbor, keeping the list ordered by distance then word
    pub fn insert(&mut self, word: &str, neighbor: &str, distance: f64) {
        let list = self.entries.entry(word.to_lowercase()).or_default();
        list.push(Neighbor::new(&neighbor.to_lowercase(), distance));
        list.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.word.cmp(&b.word))
        });
    }

    pub fn with(mut self, word: &str, neighbor: &str, distance: f64) -> Self {
        self.insert(word, neighbor, distance);
        self
    }

    pub fn lookup(&self, word: &str, limit: usize) -> Vec<Neighbor> {
        self.entries
            .get(&word.to_lowercase())
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}

/// Token with its byte span in the source text
struct Span<'a> {
    text: &'a str,
    start: usize,
}

/// Built-in [`FeatureExtractor`]
#[derive(Debug, Clone)]
pub struct BasicExtractor {
    thesaurus: Thesaurus,
    fallback_language: String,
}

impl BasicExtractor {
    /// Latin-script text with no stop-word votes is tagged `fallback_language`
    pub fn new(thesaurus: Thesaurus, fallback_language: &str) -> Self {
        Self {
            thesaurus,
            fallback_language: fallback_language.to_string(),
        }
    }

    /// Detect the dominant language code
    pub fn detect_language(&self, text: &str) -> Option<String> {
        if CJK_PATTERN.is_match(text) {
            return Some("ja".to_string());
        }

        let words: Vec<String> = WORD_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        if !words.iter().any(|w| w.chars().any(char::is_alphabetic)) {
            return None;
        }

        let mut best: Option<(&str, usize)> = None;
        for (code, function_words) in FUNCTION_WORDS {
            let markers = lookup_list(LANGUAGE_MARKERS, code);
            let votes = words
                .iter()
                .filter(|w| function_words.contains(&w.as_str()) || markers.contains(&w.as_str()))
                .count();
            if votes > 0 && best.map_or(true, |(_, top)| votes > top) {
                best = Some((*code, votes));
            }
        }

        Some(
            best.map(|(code, _)| code.to_string())
                .unwrap_or_else(|| self.fallback_language.clone()),
        )
    }

    fn spans<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        WORD_PATTERN
            .find_iter(text)
            .map(|m| Span {
                text: m.as_str(),
                start: m.start(),
            })
            .collect()
    }

    fn sentiment(tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }
        let mut polarity = 0i32;
        for token in tokens {
            let lower = token.to_lowercase();
            if POSITIVE_WORDS.contains(&lower.as_str()) {
                polarity += 1;
            } else if NEGATIVE_WORDS.contains(&lower.as_str()) {
                polarity -= 1;
            }
        }
        (polarity as f64 / tokens.len() as f64).clamp(-1.0, 1.0)
    }

    /// Persons, organizations and places by capitalization
    fn entities(text: &str, spans: &[Span<'_>]) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut persons = Vec::new();
        let mut organizations = Vec::new();
        let mut places = Vec::new();
        let mut current_person: Vec<&str> = Vec::new();

        for (index, span) in spans.iter().enumerate() {
            let word = span.text;
            let mut chars = word.chars();
            let capitalized = chars.next().is_some_and(char::is_uppercase);
            let all_caps = word.chars().count() >= 2
                && word.chars().all(|c| c.is_alphabetic() && c.is_uppercase());
            let after_preposition = index > 0
                && PLACE_PREPOSITIONS.contains(&spans[index - 1].text.to_lowercase().as_str());

            let is_person = capitalized
                && !all_caps
                && !after_preposition
                && word.chars().count() > 1
                && !starts_sentence(text, span.start);

            if is_person {
                current_person.push(word);
                continue;
            }
            if !current_person.is_empty() {
                persons.push(current_person.join(" "));
                current_person.clear();
            }

            if all_caps {
                organizations.push(word.to_string());
            } else if capitalized && after_preposition {
                places.push(word.to_string());
            }
        }
        if !current_person.is_empty() {
            persons.push(current_person.join(" "));
        }

        (persons, organizations, places)
    }
}

impl Default for BasicExtractor {
    fn default() -> Self {
        Self::new(Thesaurus::new(), "en")
    }
}

impl FeatureExtractor for BasicExtractor {
    fn extract(&self, text: &str, sender: &str) -> Message {
        let spans = self.spans(text);
        let tokens: Vec<String> = spans.iter().map(|s| s.text.to_string()).collect();
        let language = self.detect_language(text);
        let code = language.as_deref().unwrap_or(&self.fallback_language);

        let lemmas = tokens
            .iter()
            .map(|t| lemmatize(code, &t.to_lowercase()))
            .collect();
        let token_neighbors = tokens
            .iter()
            .map(|t| TokenNeighbors {
                token: t.clone(),
                neighbors: self.neighbors(t, 5),
            })
            .collect();
        let interjections = tokens
            .iter()
            .filter(|t| INTERJECTIONS.contains(&t.to_lowercase().as_str()))
            .cloned()
            .collect();
        let (persons, organizations, places) = Self::entities(text, &spans);

        Message {
            text: text.to_string(),
            sender: sender.to_string(),
            timestamp: Utc::now(),
            sentiment: Self::sentiment(&tokens),
            symbol_text: self.symbolize(text),
            language,
            tokens,
            lemmas,
            token_neighbors,
            persons,
            organizations,
            places,
            interjections,
        }
    }

    fn symbolize(&self, text: &str) -> String {
        let code = self
            .detect_language(text)
            .unwrap_or_else(|| self.fallback_language.clone());
        let function_words = lookup_list(FUNCTION_WORDS, &code);

        WORD_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| !function_words.contains(&w.as_str()))
            .filter(|w| !w.chars().all(|c| c.is_numeric()))
            .map(|w| lemmatize(&code, &w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn neighbors(&self, word: &str, limit: usize) -> Vec<Neighbor> {
        self.thesaurus.lookup(word, limit)
    }
}

fn lookup_list(table: &'static [(&'static str, &'static [&'static str])], code: &str) -> &'static [&'static str] {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// True when only whitespace or sentence punctuation precedes `start`
fn starts_sentence(text: &str, start: usize) -> bool {
    match text[..start].trim_end().chars().last() {
        None => true,
        Some(c) => matches!(c, '.' | '!' | '?' | '\n' | ':' | '"' | '«'),
    }
}

/// Lemma of a lower-cased word; only English has rules
fn lemmatize(code: &str, word: &str) -> String {
    if code != "en" {
        return word.to_string();
    }
    if let Some((_, lemma)) = IRREGULAR_LEMMAS.iter().find(|(form, _)| *form == word) {
        return lemma.to_string();
    }

    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 4 && word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    if len > 5 && word.ends_with("ing") {
        let stem = &word[..word.len() - 3];
        let mut tail = stem.chars().rev();
        if let (Some(last), Some(before)) = (tail.next(), tail.next()) {
            if last == before && !matches!(last, 'l' | 's' | 'z') {
                return stem[..stem.len() - last.len_utf8()].to_string();
            }
        }
        return stem.to_string();
    }
    word.to_string()
}
