use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::QueueConfig;
use crate::error::QueueError;

/// An admitted call waiting for a dispatch token
///
/// Invoking the closure yields the task future that runs the caller's
/// operation and settles its oneshot.
type PendingCall = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Rate-limited FIFO call queue with hard token resets at window boundaries
///
/// At most `max_calls_per_window` operations are started per window;
/// excess calls wait in FIFO order, bounded at `max_queue_size`. The
/// remaining budget is reset to the maximum on every timer tick; unused
/// budget from a quiet window is discarded, not carried over.
///
/// The queue starts in the `stopped` state with a full token budget, so
/// the first burst of calls dispatches immediately even before
/// [`start`](CallQueue::start) arms the refill timer. Cloning yields
/// another handle to the same queue.
#[derive(Clone)]
pub struct CallQueue {
    inner: Arc<Inner>,
}

struct Inner {
    config: QueueConfig,
    state: Mutex<State>,
}

struct State {
    pending: VecDeque<PendingCall>,
    tokens: u32,
    refill_task: Option<JoinHandle<()>>,
}

impl State {
    /// Single logical dispatch loop shared by enqueue and refill
    ///
    /// Runs with the state lock held: no interleaved enqueue or tick can
    /// double-admit or skip a call. Spawned operations run unserialised;
    /// only admission order is FIFO.
    fn dispatch(&mut self) {
        while self.tokens > 0 {
            let Some(call) = self.pending.pop_front() else { break };
            self.tokens -= 1;
            tokio::spawn(call());
        }
    }
}

impl Inner {
    /// Timer tick: reset the budget to the window maximum, then drain
    fn refill(&self) {
        let mut state = self.state.lock();
        state.tokens = self.config.max_calls_per_window;
        state.dispatch();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Still-queued calls are dropped with their oneshot senders,
        // rejecting the waiting callers with QueueError::Dropped.
        if let Some(task) = self.state.get_mut().refill_task.take() {
            task.abort();
        }
    }
}

impl CallQueue {
    /// Create a new call queue
    pub fn new(config: QueueConfig) -> Self {
        assert!(config.max_calls_per_window > 0, "max_calls_per_window must be greater than 0");
        assert!(config.window_ms > 0, "window_ms must be greater than 0");
        assert!(config.max_queue_size > 0, "max_queue_size must be greater than 0");

        let state = State { pending: VecDeque::new(), tokens: config.max_calls_per_window, refill_task: None };

        Self { inner: Arc::new(Inner { config, state: Mutex::new(state) }) }
    }

    /// Create a builder for configuring a call queue
    pub fn builder() -> CallQueueBuilder {
        CallQueueBuilder::new()
    }

    /// Enqueue an operation for rate-limited dispatch
    ///
    /// Admission happens synchronously in this call: if the backlog is at
    /// `max_queue_size` the returned future resolves immediately with
    /// [`QueueError::Overflow`] and the operation is never invoked.
    /// Otherwise the returned future settles exactly once with the
    /// operation's own output, after the operation has actually run.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue<T, F, Fut>(&self, operation: F) -> impl Future<Output = Result<T, QueueError>> + Send + 'static
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let admitted = self.admit(operation);

        async move {
            match admitted {
                Ok(rx) => rx.await.map_err(|_| QueueError::Dropped),
                Err(err) => Err(err),
            }
        }
    }

    /// Admission pass: bound the backlog, append at the tail, drain
    fn admit<T, F, Fut>(&self, operation: F) -> Result<oneshot::Receiver<T>, QueueError>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut state = self.inner.state.lock();

        if state.pending.len() >= self.inner.config.max_queue_size {
            tracing::warn!(backlog = state.pending.len(), "call queue full, rejecting enqueue");
            return Err(QueueError::Overflow);
        }

        let (tx, rx) = oneshot::channel();
        state.pending.push_back(Box::new(move || {
            Box::pin(async move {
                let output = operation().await;
                // The caller may have dropped its future; nothing to settle then
                let _ = tx.send(output);
            })
        }));

        state.dispatch();
        Ok(rx)
    }

    /// Arm the periodic refill timer; idempotent
    ///
    /// The first tick fires one full window after arming. A missed tick
    /// (e.g. under a paused or overloaded runtime) is skipped rather than
    /// burst-compensated, preserving the per-window admission bound.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.refill_task.is_some() {
            return;
        }

        let window = self.inner.config.window();
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + window, window);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                inner.refill();
            }
        });

        state.refill_task = Some(task);
        tracing::debug!(window_ms = self.inner.config.window_ms, "refill timer armed");
    }

    /// Disarm the refill timer; idempotent
    ///
    /// Already-queued calls are kept. They drain only while tokens from
    /// the current budget remain, or once [`start`](CallQueue::start) is
    /// called again.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        if let Some(task) = state.refill_task.take() {
            task.abort();
            tracing::debug!("refill timer disarmed");
        }
    }

    /// Number of deferred (admitted but not yet started) calls
    pub fn len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Whether the backlog is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tokens remaining in the current window
    pub fn available_tokens(&self) -> u32 {
        self.inner.state.lock().tokens
    }

    /// Maximum calls admitted per window
    pub fn capacity(&self) -> u32 {
        self.inner.config.max_calls_per_window
    }

    /// Whether the refill timer is armed
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().refill_task.is_some()
    }

    /// The configuration this queue was built with
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }
}

/// Builder for configuring a call queue
///
/// All knobs default to the [`QueueConfig`] defaults (30 calls per
/// 1000ms window, backlog bound 100).
pub struct CallQueueBuilder {
    config: QueueConfig,
}

impl CallQueueBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self { config: QueueConfig::default() }
    }

    /// Set the number of calls admitted per window
    pub fn max_calls_per_window(mut self, max_calls: u32) -> Self {
        self.config.max_calls_per_window = max_calls;
        self
    }

    /// Set the window duration
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window_ms = window.as_millis() as u64;
        self
    }

    /// Set the backlog bound
    pub fn max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.config.max_queue_size = max_queue_size;
        self
    }

    /// Build the call queue
    ///
    /// # Panics
    /// Panics if any limit was set to zero
    pub fn build(self) -> CallQueue {
        CallQueue::new(self.config)
    }
}

impl Default for CallQueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}
