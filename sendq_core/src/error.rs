/// Result type for queue admission and settlement
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors originated by the call queue itself
///
/// Failures of the operations handed to the queue are never wrapped:
/// the queue carries the operation's own output (typically the caller's
/// `Result`) through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The backlog is at `max_queue_size`; the operation was never invoked
    #[error("call queue is full")]
    Overflow,

    /// The queue was dropped while the call was still waiting for a token
    #[error("call queue was dropped before the call ran")]
    Dropped,
}
