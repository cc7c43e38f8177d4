pub mod config;
pub mod error;
pub mod queue;

pub use config::QueueConfig;
pub use error::QueueError;
pub use error::Result;
pub use queue::CallQueue;
pub use queue::CallQueueBuilder;
