//! Background flush of operation batches to a remote store.
//!
//! A single worker thread applies submitted batches in submission order, so
//! the remote sees batches in the same order the local state changed. Every
//! batch produces exactly two signals on the configured sink: `Begin`, then
//! either `End` or `Fail`.
//!
//! The flush is fire-and-forget for the caller: `submit` only enqueues, and a
//! failed flush never rolls back the local update that produced the batch.

use crate::error::RemoteError;
use crate::store::RemoteStore;
use parking_lot::{Condvar, Mutex};
use restore_core::OperationRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

/// Lifecycle signal of one flushed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSignal {
    /// The batch is about to be sent
    Begin,
    /// The remote accepted the batch
    End,
    /// The remote rejected the batch or could not be reached
    Fail(String),
}

/// Receiver of lifecycle signals
///
/// Called from the flush worker thread.
pub type SignalSink = Arc<dyn Fn(RemoteSignal) + Send + Sync>;

/// Sink that drops every signal
pub fn ignore_signals() -> SignalSink {
    Arc::new(|_: RemoteSignal| {})
}

/// Flush queue metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    /// Batches waiting for the worker.
    pub queued: usize,
    /// Whether the worker is sending a batch right now.
    pub in_flight: bool,
    /// Batches the remote accepted.
    pub flushed: u64,
    /// Batches that ended in `Fail`.
    pub failed: u64,
}

struct Batch {
    sequence: u64,
    ops: Vec<OperationRecord>,
}

#[derive(Default)]
struct QueueState {
    batches: VecDeque<Batch>,
    in_flight: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    sequence: AtomicU64,
    flushed: AtomicU64,
    failed: AtomicU64,
    max_queue_depth: usize,
    store: Arc<dyn RemoteStore>,
    sink: SignalSink,
}

impl QueueInner {
    fn emit(&self, signal: RemoteSignal) {
        let sink = &self.sink;
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink(signal))) {
            error!(
                target: "restore::remote",
                "Signal sink panicked: {}",
                panic_message(e.as_ref())
            );
        }
    }

    fn fail(&self, sequence: Option<u64>, e: &RemoteError) {
        warn!(target: "restore::remote", ?sequence, error = %e, "Flush failed");
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.emit(RemoteSignal::Fail(e.to_string()));
    }
}

/// Ordered, bounded queue of batches flushed by one background worker
///
/// The worker is named `restore-flush`. Dropping the queue shuts it down
/// after the remaining batches are flushed.
pub struct FlushQueue {
    inner: Arc<QueueInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FlushQueue {
    /// Start the worker thread
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Config`] if `max_queue_depth` is zero or the
    /// worker thread cannot be spawned.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        sink: SignalSink,
        max_queue_depth: usize,
    ) -> Result<Self, RemoteError> {
        if max_queue_depth == 0 {
            return Err(RemoteError::Config(
                "queue depth must be at least 1".to_string(),
            ));
        }

        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState::default()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            flushed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            max_queue_depth,
            store,
            sink,
        });

        let inner_clone = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name("restore-flush".to_string())
            .spawn(move || worker_loop(&inner_clone))
            .map_err(|e| RemoteError::Config(format!("failed to spawn flush worker: {}", e)))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Enqueue a batch and return its sequence number
    ///
    /// A batch that cannot be queued still gets its `Begin` and `Fail`
    /// signals, so observers always see a complete lifecycle.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Backpressure`] if the queue is full
    /// - [`RemoteError::Shutdown`] after [`FlushQueue::shutdown`]
    pub fn submit(&self, ops: Vec<OperationRecord>) -> Result<u64, RemoteError> {
        self.enqueue(ops).map_err(|e| {
            self.inner.emit(RemoteSignal::Begin);
            self.inner.fail(None, &e);
            e
        })
    }

    fn enqueue(&self, ops: Vec<OperationRecord>) -> Result<u64, RemoteError> {
        // Reject after shutdown, the worker has been joined
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(RemoteError::Shutdown);
        }

        let mut state = self.inner.state.lock();
        if state.batches.len() >= self.inner.max_queue_depth {
            return Err(RemoteError::Backpressure);
        }

        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
        state.batches.push_back(Batch { sequence, ops });
        drop(state);

        self.inner.work_ready.notify_one();
        Ok(sequence)
    }

    /// Block until every queued and in-flight batch has been flushed.
    ///
    /// The worker keeps running after drain completes.
    pub fn drain(&self) {
        let mut state = self.inner.state.lock();
        while !state.batches.is_empty() || state.in_flight {
            self.inner.drain_cond.wait(&mut state);
        }
    }

    /// Flush what is queued, stop the worker and join it.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);

        // Notify under the lock so a worker between its shutdown check and
        // wait() cannot miss the wakeup.
        {
            let _state = self.inner.state.lock();
            self.inner.work_ready.notify_all();
        }

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!(target: "restore::remote", "Flush worker panicked");
            }
        }
    }

    /// Return a snapshot of queue metrics.
    pub fn stats(&self) -> FlushStats {
        let state = self.inner.state.lock();
        FlushStats {
            queued: state.batches.len(),
            in_flight: state.in_flight,
            flushed: self.inner.flushed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for FlushQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(inner: &QueueInner) {
    loop {
        let batch = {
            let mut state = inner.state.lock();
            loop {
                if let Some(batch) = state.batches.pop_front() {
                    state.in_flight = true;
                    break batch;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut state);
            }
        };

        // Clears in_flight even if the batch unwinds
        let _guard = InFlightGuard { inner };

        if let Err(e) =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| flush_batch(inner, batch)))
        {
            error!(
                target: "restore::remote",
                "Flush batch panicked: {}",
                panic_message(e.as_ref())
            );
        }
    }
}

/// Marks the worker idle and wakes drain waiters on drop.
struct InFlightGuard<'a> {
    inner: &'a QueueInner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.in_flight = false;
        if state.batches.is_empty() {
            self.inner.drain_cond.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("(non-string panic)")
}

fn flush_batch(inner: &QueueInner, batch: Batch) {
    inner.emit(RemoteSignal::Begin);

    // A panicking store must not take the worker down with it
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        inner.store.apply(&batch.ops)
    }))
    .unwrap_or_else(|_| Err(RemoteError::Network("remote store panicked".to_string())));

    match result {
        Ok(()) => {
            info!(
                target: "restore::remote",
                sequence = batch.sequence,
                ops = batch.ops.len(),
                "Flush complete"
            );
            inner.flushed.fetch_add(1, Ordering::Relaxed);
            inner.emit(RemoteSignal::End);
        }
        Err(e) => inner.fail(Some(batch.sequence), &e),
    }
}
