//! Console Transport
//!
//! Local stand-in for a chat server: stdin lines become chat events from the
//! local user, replies are printed to stdout, directory listings come from
//! the local filesystem and subscriptions are served by native file system
//! notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bot::Event;
use crate::delegate::BotDelegate;

/// stdio + local filesystem transport
pub struct ConsoleTransport {
    events: mpsc::Sender<Event>,
    bot_nick: String,
    // Dropping a watcher ends its subscription
    watchers: Mutex<Vec<RecommendedWatcher>>,
}

impl ConsoleTransport {
    pub fn new(events: mpsc::Sender<Event>, bot_nick: &str) -> Self {
        Self {
            events,
            bot_nick: bot_nick.to_string(),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Number of live directory subscriptions
    pub fn watched(&self) -> usize {
        self.watchers.lock().len()
    }

    /// Forward stdin lines as chat from `user`; the task ends at EOF
    pub fn read_stdin(&self, user: &str) -> JoinHandle<()> {
        let events = self.events.clone();
        let user = user.to_string();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        if events.send(Event::chat(&user, text)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!("stdin read error: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl BotDelegate for ConsoleTransport {
    async fn send(&self, text: &str) {
        println!("<{}> {}", self.bot_nick, text);
    }

    async fn subscribe_to_directory(&self, path: &str) {
        match create_watcher(Path::new(path), self.events.clone()) {
            Ok(watcher) => {
                info!("Watching {}", path);
                self.watchers.lock().push(watcher);
            }
            Err(e) => warn!("failed to watch {}: {}", path, e),
        }
    }

    async fn list_directory(&self, path: &str) {
        let events = self.events.clone();
        let directory = PathBuf::from(path);

        tokio::spawn(async move {
            match list_files(&directory).await {
                Ok(files) => {
                    debug!("Listing {}: {} files", directory.display(), files.len());
                    for (path, modified_at) in files {
                        if events.send(Event::FileEntry { path, modified_at }).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("Cannot list {}: {}", directory.display(), e),
            }
            let _ = events.send(Event::FileListDone).await;
        });
    }
}

/// Non-hidden regular files directly inside `directory`, with modification times
pub async fn list_files(directory: &Path) -> std::io::Result<Vec<(PathBuf, DateTime<Utc>)>> {
    let mut reader = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((entry.path(), DateTime::<Utc>::from(modified)));
    }

    files.sort();
    Ok(files)
}

/// Watcher forwarding every change inside `directory` as `DirectoryChanged`
fn create_watcher(directory: &Path, sender: mpsc::Sender<Event>) -> notify::Result<RecommendedWatcher> {
    let label = directory.display().to_string();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) if event.kind.is_access() => {}
            Ok(_) => {
                // Dropped while the bot is backlogged
                let _ = sender.try_send(Event::DirectoryChanged { path: label.clone() });
            }
            Err(e) => warn!("watch error on {}: {}", label, e),
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(directory, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
