//! Property tests over the call queue's admission model
//!
//! Each case drives a real queue on a paused current-thread runtime, so
//! window ticks advance deterministically in virtual time.

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;
use sendq_core::CallQueue;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_time().start_paused(true).build().expect("test runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every admitted call settles exactly once, invocations follow
    /// enqueue order, and no window sees more dispatches than the limit.
    #[test]
    fn admitted_calls_settle_in_fifo_order(total in 1usize..32, limit in 1u32..6, window_ms in 10u64..80) {
        let rt = runtime();
        rt.block_on(async move {
            let queue = CallQueue::builder()
                .max_calls_per_window(limit)
                .window(Duration::from_millis(window_ms))
                .max_queue_size(total)
                .build();
            queue.start();

            let begun = tokio::time::Instant::now();
            let invocations = Arc::new(Mutex::new(Vec::new()));

            let mut calls = Vec::new();
            for seq in 0..total {
                let invocations = Arc::clone(&invocations);
                calls.push(queue.enqueue(move || async move {
                    invocations.lock().push((seq, tokio::time::Instant::now()));
                    seq
                }));
            }

            for (seq, call) in calls.into_iter().enumerate() {
                assert_eq!(call.await, Ok(seq));
            }

            let invocations = invocations.lock();
            assert_eq!(invocations.len(), total);

            // FIFO admission
            let order: Vec<usize> = invocations.iter().map(|(seq, _)| *seq).collect();
            assert_eq!(order, (0..total).collect::<Vec<_>>());

            // Per-window dispatch bound
            let mut per_window = std::collections::HashMap::new();
            for (_, at) in invocations.iter() {
                let bucket = at.duration_since(begun).as_millis() / u128::from(window_ms);
                *per_window.entry(bucket).or_insert(0u32) += 1;
            }
            for (bucket, count) in per_window {
                assert!(count <= limit, "window {bucket} dispatched {count} calls, limit {limit}");
            }

            assert!(queue.is_empty());
        });
    }

    /// Calls past the backlog bound are rejected up front and their
    /// operations are never invoked; everything admitted still runs.
    #[test]
    fn rejected_calls_are_never_invoked(total in 1usize..64, limit in 1u32..6, bound in 1usize..16) {
        let rt = runtime();
        rt.block_on(async move {
            let queue = CallQueue::builder()
                .max_calls_per_window(limit)
                .window(Duration::from_millis(25))
                .max_queue_size(bound)
                .build();

            let invoked = Arc::new(AtomicU32::new(0));
            let mut calls = Vec::new();
            for _ in 0..total {
                let invoked = Arc::clone(&invoked);
                calls.push(queue.enqueue(move || async move {
                    invoked.fetch_add(1, Ordering::SeqCst);
                }));
            }

            let dispatched = total.min(limit as usize);
            let deferred = (total - dispatched).min(bound);
            let rejected = total - dispatched - deferred;
            assert_eq!(queue.len(), deferred);

            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            assert_eq!(invoked.load(Ordering::SeqCst) as usize, dispatched);

            // Drain the backlog; only the overflowed calls report an error
            queue.start();
            let mut seen_rejected = 0;
            for call in calls {
                if call.await.is_err() {
                    seen_rejected += 1;
                }
            }

            assert_eq!(seen_rejected, rejected);
            assert_eq!(invoked.load(Ordering::SeqCst) as usize, total - rejected);
            assert!(queue.is_empty());
        });
    }
}
