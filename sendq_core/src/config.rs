use std::time::Duration;

use serde::Deserialize;

/// Admission limits for a [`CallQueue`](crate::CallQueue)
///
/// The defaults mirror the Telegram Bot API broadcast limit: 30 calls
/// per second, with at most 100 deferred calls before enqueue starts
/// rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Calls admitted per window
    pub max_calls_per_window: u32,

    /// Window length in milliseconds
    pub window_ms: u64,

    /// Maximum number of deferred (admitted but not yet started) calls
    pub max_queue_size: usize,
}

impl QueueConfig {
    /// Window length as a [`Duration`]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_calls_per_window: 30, window_ms: 1000, max_queue_size: 100 }
    }
}
