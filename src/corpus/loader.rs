//! Corpus Loader
//!
//! Walks `<root>/<language>/<category>.<ext>` and parses every category file.
//! A broken category file is logged and skipped; only an unreadable root
//! aborts the load.

use super::types::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors raised while reading the corpus
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed category file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("unsupported category file {0}")]
    UnsupportedFormat(PathBuf),
}

/// On-disk encodings a category file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Yaml,
    Json,
    Toml,
}

impl CorpusFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Category document: `conversations` is a list of `[stimulus, reply, ...]` rows
#[derive(Debug, Deserialize)]
struct CategoryDocument {
    #[serde(default)]
    conversations: Vec<Vec<Scalar>>,
}

/// Corpus rows sometimes contain bare numbers or booleans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => s,
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

/// Loader for corpus directories
pub struct CorpusLoader;

impl CorpusLoader {
    /// Load every language and category under `root`
    pub async fn load(root: &Path) -> Result<Corpus, LoadError> {
        let mut corpus = Corpus::new();

        for language_path in visible_entries(root).await? {
            if !language_path.is_dir() {
                continue;
            }
            let Some(language) = file_stem(&language_path) else {
                continue;
            };

            let files = match visible_entries(&language_path).await {
                Ok(files) => files,
                Err(e) => {
                    warn!("Skipping language {}: {}", language, e);
                    continue;
                }
            };

            let mut dataset = LanguageDataset::new();
            for file in files {
                if CorpusFormat::from_path(&file).is_none() {
                    debug!("Ignoring non-corpus file {}", file.display());
                    continue;
                }
                let Some(category) = file_stem(&file) else {
                    continue;
                };

                match Self::load_category(&file).await {
                    Ok(table) => dataset.insert(&category, table),
                    Err(e) => warn!("Skipping category {}/{}: {}", language, category, e),
                }
            }

            debug!("Language {}: {} categories", language, dataset.len());
            corpus.insert(&language, dataset);
        }

        info!(
            "Loaded corpus from {}: {} languages, {} response groups",
            root.display(),
            corpus.languages().count(),
            corpus.group_count()
        );
        Ok(corpus)
    }

    /// Load a single category file
    pub async fn load_category(path: &Path) -> Result<ResponseTable, LoadError> {
        let format = CorpusFormat::from_path(path)
            .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse_category(&content, format).map_err(|message| LoadError::Malformed {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse category content; rows with fewer than two entries are dropped
    pub fn parse_category(content: &str, format: CorpusFormat) -> Result<ResponseTable, String> {
        let document: CategoryDocument = match format {
            CorpusFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
            CorpusFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
            CorpusFormat::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
        };

        let mut table = ResponseTable::with_capacity(document.conversations.len());
        for (index, row) in document.conversations.into_iter().enumerate() {
            let entries: Vec<String> = row.into_iter().map(String::from).collect();
            match ResponseGroup::from_entries(entries) {
                Ok(group) => table.push(group),
                Err(e) => warn!("Dropping row {}: {}", index, e),
            }
        }
        Ok(table)
    }
}

/// Non-hidden directory entries, sorted by name
async fn visible_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let unreadable = |source: std::io::Error| LoadError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut reader = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut paths = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(unreadable)? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
}
