use std::path::Path;

use config::Config;
use config::ConfigError;
use config::File;
use sendq_core::QueueConfig;
use serde::Deserialize;

/// On-disk configuration for the send worker
///
/// The queue limits are flattened at the top level, so a config file
/// reads as one flat table:
///
/// ```toml
/// max_calls_per_window = 30
/// window_ms = 1000
/// max_queue_size = 100
/// send_count = 60
/// send_latency_ms = 5
/// ```
#[derive(Debug, Deserialize)]
pub struct WorkerConfigFile {
    #[serde(flatten)]
    pub queue: QueueConfig,
    /// Synthetic sends issued by the demo worker
    pub send_count: Option<u64>,
    /// Simulated per-send latency in milliseconds
    pub send_latency_ms: Option<u64>,
}

impl Default for WorkerConfigFile {
    fn default() -> Self {
        Self { queue: QueueConfig::default(), send_count: Some(60), send_latency_ms: Some(5) }
    }
}

pub fn load_worker_config<P: AsRef<Path>>(path: P) -> Result<WorkerConfigFile, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).build()?;

    config.try_deserialize()
}

/// Load worker config with fallback to default
pub fn load_worker_config_or_default(path: &str) -> WorkerConfigFile {
    match load_worker_config(path) {
        Ok(config) => {
            tracing::info!("Loaded worker config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load worker config from {}: {}. Using defaults.", path, err);
            WorkerConfigFile::default()
        }
    }
}
