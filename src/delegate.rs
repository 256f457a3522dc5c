//! Bot Delegate
//!
//! The capabilities the bot asks of its transport. Every method has a no-op
//! default so a transport implements only what it supports.

use async_trait::async_trait;
use parking_lot::Mutex;

/// Outbound requests from the bot to its transport
#[async_trait]
pub trait BotDelegate: Send + Sync {
    /// Emit a chat message
    async fn send(&self, _text: &str) {}

    /// Start watching a directory for changes
    async fn subscribe_to_directory(&self, _path: &str) {}

    /// Enumerate a directory; entries come back as listing events
    async fn list_directory(&self, _path: &str) {}
}

/// Delegate that ignores every request
#[derive(Debug, Default)]
pub struct NullDelegate;

#[async_trait]
impl BotDelegate for NullDelegate {}

/// A request captured by [`RecordingDelegate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateCall {
    Send(String),
    Subscribe(String),
    List(String),
}

/// Delegate that records every request in order
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    calls: Mutex<Vec<DelegateCall>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DelegateCall> {
        self.calls.lock().clone()
    }

    /// Texts passed to `send`, in order
    pub fn sent(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DelegateCall::Send(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl BotDelegate for RecordingDelegate {
    async fn send(&self, text: &str) {
        self.calls.lock().push(DelegateCall::Send(text.to_string()));
    }

    async fn subscribe_to_directory(&self, path: &str) {
        self.calls.lock().push(DelegateCall::Subscribe(path.to_string()));
    }

    async fn list_directory(&self, path: &str) {
        self.calls.lock().push(DelegateCall::List(path.to_string()));
    }
}
