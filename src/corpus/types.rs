//! Corpus Type Definitions

use std::collections::{BTreeMap, BTreeSet};

/// A group needs a stimulus and at least one reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response group needs a stimulus and at least one reply, got {0} entries")]
pub struct InvalidGroup(pub usize);

/// One stimulus pattern and the replies it can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseGroup {
    stimulus: String,
    replies: Vec<String>,
}

impl ResponseGroup {
    /// Build from the raw corpus row: element 0 is the stimulus, the rest are replies
    pub fn from_entries(entries: Vec<String>) -> Result<Self, InvalidGroup> {
        if entries.len() < 2 {
            return Err(InvalidGroup(entries.len()));
        }
        let mut entries = entries.into_iter();
        let stimulus = entries.next().unwrap_or_default();
        Ok(Self {
            stimulus,
            replies: entries.collect(),
        })
    }

    pub fn stimulus(&self) -> &str {
        &self.stimulus
    }

    /// Candidate replies, never empty
    pub fn replies(&self) -> &[String] {
        &self.replies
    }
}

impl TryFrom<Vec<String>> for ResponseGroup {
    type Error = InvalidGroup;

    fn try_from(entries: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

/// Ordered response groups of one category
pub type ResponseTable = Vec<ResponseGroup>;

/// All categories of one language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageDataset {
    categories: BTreeMap<String, ResponseTable>,
}

impl LanguageDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a category (name is lower-cased)
    pub fn insert(&mut self, category: &str, table: ResponseTable) {
        self.categories.insert(category.to_lowercase(), table);
    }

    /// Case-insensitive category lookup
    pub fn table(&self, category: &str) -> Option<&ResponseTable> {
        self.categories.get(&category.to_lowercase())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(&category.to_lowercase())
    }

    /// Category names in stable (sorted) order
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Language name -> dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    languages: BTreeMap<String, LanguageDataset>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a language (name is lower-cased)
    pub fn insert(&mut self, language: &str, dataset: LanguageDataset) {
        self.languages.insert(language.to_lowercase(), dataset);
    }

    /// Case-insensitive language lookup
    pub fn language(&self, language: &str) -> Option<&LanguageDataset> {
        self.languages.get(&language.to_lowercase())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Category names available for a language (empty when the language is unknown)
    pub fn categories(&self, language: &str) -> BTreeSet<&str> {
        self.language(language)
            .map(|dataset| dataset.category_names().collect())
            .unwrap_or_default()
    }

    pub fn table(&self, language: &str, category: &str) -> Option<&ResponseTable> {
        self.language(language)?.table(category)
    }

    /// Number of response groups across all languages
    pub fn group_count(&self) -> usize {
        self.languages
            .values()
            .flat_map(|dataset| dataset.categories.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
