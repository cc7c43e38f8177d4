use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use sendq_app::config_loader;
use sendq_app::shutdown;
use sendq_core::CallQueue;
use sendq_core::QueueError;
use tracing::info;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let _guard = sendq_app::tracing_setup::init("send_worker", "./logs", tracing::Level::INFO, true);

    // Load worker configuration from file (with fallback to defaults)
    let config_file = config_loader::load_worker_config_or_default("config/send_worker.toml");
    let send_count = config_file.send_count.unwrap_or(60);
    let send_latency = Duration::from_millis(config_file.send_latency_ms.unwrap_or(5));
    let queue_config = config_file.queue;

    info!(
        "Starting send worker: {} sends at {}/{}ms, backlog bound {}",
        send_count, queue_config.max_calls_per_window, queue_config.window_ms, queue_config.max_queue_size
    );

    let running = Arc::new(AtomicBool::new(true));
    shutdown::setup(running.clone())?;

    let queue = CallQueue::new(queue_config);
    queue.start();

    let begun = Instant::now();
    let mut calls = Vec::new();
    for seq in 0..send_count {
        if !running.load(Ordering::Relaxed) {
            warn!("Shutdown requested, stopping enqueue at send {seq}");
            break;
        }

        // Stand-in for the outbound chat-API call
        calls.push(queue.enqueue(move || async move {
            tokio::time::sleep(send_latency).await;
            seq
        }));
    }

    let mut sent = 0u64;
    let mut rejected = 0u64;
    for call in calls {
        match call.await {
            Ok(_) => sent += 1,
            Err(QueueError::Overflow) => rejected += 1,
            Err(err) => warn!("Send failed: {err}"),
        }
    }

    queue.stop();
    info!("Completed {sent} sends ({rejected} rejected by backpressure) in {:?}, backlog {}", begun.elapsed(), queue.len());

    Ok(())
}
