//! Work item type carried by the dispatch queue.

use std::fmt;
use std::time::Duration;

/// Anything that can be ordered by the dispatch heap.
///
/// Larger values are served first.
pub trait Prioritized {
    fn priority(&self) -> i64;
}

/// Opaque identifier of the connection a work item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientHandle(u64);

impl ClientHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ClientHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// One unit of pending work.
///
/// The queue orders items by `priority` and otherwise treats them as opaque:
/// `path` and `delay` are carried for the consumer, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub client_handle: ClientHandle,
    pub path: String,
    pub priority: i64,
    /// How long the consumer should wait before acting on the item.
    pub delay: Option<Duration>,
}

impl WorkItem {
    pub fn new(client_handle: impl Into<ClientHandle>, path: impl Into<String>, priority: i64) -> Self {
        Self {
            client_handle: client_handle.into(),
            path: path.into(),
            priority,
            delay: None,
        }
    }

    /// Attach a consumer-side delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Prioritized for WorkItem {
    fn priority(&self) -> i64 {
        self.priority
    }
}

impl<T> Prioritized for (T, i64) {
    fn priority(&self) -> i64 {
        self.1
    }
}
