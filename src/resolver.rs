//! Category Resolution
//!
//! Maps a candidate key (a lemma, a neighbor word, a fixed category name)
//! to a response table of a language dataset. Near-synonyms of the key are
//! tried first, closest first, so a speaker saying "joke" still reaches a
//! "humor" category when the thesaurus relates the two.

use std::sync::Arc;
use tracing::trace;

use crate::corpus::{LanguageDataset, ResponseTable};
use crate::nlp::FeatureExtractor;

/// How many neighbors of a key are considered
pub const NEIGHBOR_LIMIT: usize = 5;

/// Resolves keys to response tables through synonym expansion
#[derive(Clone)]
pub struct CategoryResolver {
    extractor: Arc<dyn FeatureExtractor>,
}

impl CategoryResolver {
    pub fn new(extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self { extractor }
    }

    /// Table for `key`: first neighbor present in the dataset wins, then the key itself
    pub fn resolve<'a>(&self, dataset: &'a LanguageDataset, key: &str) -> Option<&'a ResponseTable> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        let mut neighbors = self.extractor.neighbors(&key, NEIGHBOR_LIMIT);
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        for neighbor in neighbors.iter().take(NEIGHBOR_LIMIT) {
            let name = neighbor.word.to_lowercase();
            if let Some(table) = dataset.table(&name) {
                trace!("Key '{}' resolved to neighbor category '{}'", key, name);
                return Some(table);
            }
        }

        dataset.table(&key)
    }
}
