//! Directory Listing Aggregation
//!
//! A listing arrives as a stream of per-file events closed by a terminator.
//! The aggregator collects them between `begin` and `finalize`, then keeps
//! only the most recently modified entries for the digest.

use chrono::{DateTime, Utc};
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Listing events received out of sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("file entry received while no listing is in progress")]
    AddWhileIdle,

    #[error("listing terminator received while no listing is in progress")]
    FinalizeWhileIdle,
}

/// One listed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub modified_at: DateTime<Utc>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, modified_at: DateTime<Utc>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            modified_at,
        }
    }

    /// `<scheme>:///<percent-encoded path>`
    pub fn link(&self, scheme: &str) -> String {
        match Url::from_file_path(&self.path) {
            Ok(url) => {
                let rest = url.as_str().trim_start_matches("file:");
                format!("{}:{}", scheme, rest)
            }
            Err(()) => format!(
                "{}:///{}",
                scheme,
                self.path.display().to_string().trim_start_matches('/')
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Idle,
    Collecting,
}

impl ListingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingState::Idle => "idle",
            ListingState::Collecting => "collecting",
        }
    }
}

/// Newest entries of a finished listing, most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Parent directory of the most recent entry
    pub directory: Option<PathBuf>,
    pub entries: Vec<FileEntry>,
}

impl FileDigest {
    /// Header plus one line per entry; nothing for an empty listing
    pub fn lines(&self, scheme: &str) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let directory = self
            .directory
            .as_deref()
            .map(Path::display)
            .map(|d| d.to_string())
            .unwrap_or_default();

        let mut lines = vec![format!("📂 Latest files added to « {} » :", directory)];
        lines.extend(
            self.entries
                .iter()
                .map(|entry| format!("- {}: {}", entry.name, entry.link(scheme))),
        );
        lines
    }
}

/// `Idle -> Collecting -> Idle` accumulator for streamed listings
#[derive(Debug)]
pub struct FileListingAggregator {
    state: ListingState,
    buffer: Vec<FileEntry>,
}

impl Default for FileListingAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileListingAggregator {
    pub fn new() -> Self {
        Self {
            state: ListingState::Idle,
            buffer: Vec::new(),
        }
    }

    pub fn state(&self) -> ListingState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == ListingState::Collecting
    }

    /// Start collecting; an unfinished listing is discarded
    pub fn begin(&mut self) {
        if self.is_collecting() {
            warn!(
                "Restarting listing, discarding {} collected entries",
                self.buffer.len()
            );
        }
        self.buffer.clear();
        self.state = ListingState::Collecting;
    }

    pub fn add(&mut self, entry: FileEntry) -> Result<(), ProtocolViolation> {
        if !self.is_collecting() {
            return Err(ProtocolViolation::AddWhileIdle);
        }
        self.buffer.push(entry);
        Ok(())
    }

    /// Keep the `limit` newest entries and return to idle
    pub fn finalize(&mut self, limit: usize) -> Result<FileDigest, ProtocolViolation> {
        if !self.is_collecting() {
            return Err(ProtocolViolation::FinalizeWhileIdle);
        }

        let mut entries = std::mem::take(&mut self.buffer);
        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        let directory = entries
            .first()
            .and_then(|newest| newest.path.parent())
            .map(Path::to_path_buf);
        debug!("Listing finished: {} entries, keeping {}", entries.len(), limit);
        entries.truncate(limit);

        self.state = ListingState::Idle;
        Ok(FileDigest { directory, entries })
    }
}
