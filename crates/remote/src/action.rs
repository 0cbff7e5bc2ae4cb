//! Action wrapper: runs business logic inside a session
//!
//! The wrapper is the explicit replacement for tagging methods as
//! "data actions". For every invocation it:
//! 1. builds a [`Session`] from the host's current dataset
//! 2. runs the business function with the session
//! 3. finalizes the session
//! 4. merges changed collections over the host's dataset
//! 5. hands the operation batch to the flush queue, if one is configured
//!
//! Step 5 never blocks: the host sees its new dataset as soon as `run`
//! returns, and the remote outcome arrives later as signals.
//!
//! # Usage
//!
//! ```
//! use restore_core::{Collection, Dataset, Row};
//! use restore_remote::ActionWrapper;
//!
//! let mut data = Dataset::new().with("todo", Collection::default());
//! let wrapper = ActionWrapper::local();
//!
//! wrapper.run(&mut data, |session| {
//!     session
//!         .table("todo")?
//!         .create(Row::new().with("id", 1).with("text", "Use sessions"))?;
//!     Ok::<_, restore_core::Error>(())
//! })?;
//!
//! assert_eq!(data.get("todo").unwrap().len(), 1);
//! # Ok::<(), restore_core::Error>(())
//! ```

use crate::error::RemoteError;
use crate::flush::{FlushQueue, SignalSink};
use crate::store::RemoteStore;
use restore_core::Dataset;
use restore_session::{Session, SessionCommit};
use std::sync::Arc;
use tracing::debug;

/// Application state holding the dataset the wrapper operates on
pub trait DataHost {
    /// Current dataset
    fn data(&self) -> &Dataset;

    /// Replace the dataset
    fn set_data(&mut self, data: Dataset);
}

impl DataHost for Dataset {
    fn data(&self) -> &Dataset {
        self
    }

    fn set_data(&mut self, data: Dataset) {
        *self = data;
    }
}

/// Everything one wrapped invocation produced
#[derive(Debug)]
pub struct ActionOutcome<T> {
    /// Business function result
    pub value: T,
    /// Finalized session (updates and records)
    pub commit: SessionCommit,
    /// Sequence number of the submitted flush batch, if one was queued
    pub flush: Option<u64>,
}

/// Runs business functions inside sessions and flushes their changes
pub struct ActionWrapper {
    flush: Option<FlushQueue>,
}

impl ActionWrapper {
    /// Wrapper with an optional flush queue
    pub fn new(flush: Option<FlushQueue>) -> Self {
        Self { flush }
    }

    /// Wrapper that only updates local state
    pub fn local() -> Self {
        Self::new(None)
    }

    /// Wrapper flushing to `store` through a new queue
    pub fn with_store(
        store: Arc<dyn RemoteStore>,
        sink: SignalSink,
        max_queue_depth: usize,
    ) -> Result<Self, RemoteError> {
        Ok(Self::new(Some(FlushQueue::new(store, sink, max_queue_depth)?)))
    }

    /// Wrapper built from configuration
    ///
    /// Without an endpoint the wrapper is local-only.
    #[cfg(feature = "http")]
    pub fn from_config(
        config: &crate::config::RemoteConfig,
        sink: SignalSink,
    ) -> Result<Self, RemoteError> {
        config.validate()?;
        match crate::store::HttpRemote::from_config(config) {
            Some(remote) => Self::with_store(Arc::new(remote), sink, config.queue_depth),
            None => Ok(Self::local()),
        }
    }

    /// The flush queue, if remote write-back is configured
    pub fn flush_queue(&self) -> Option<&FlushQueue> {
        self.flush.as_ref()
    }

    /// Run `action` in a session over `host`'s data
    ///
    /// If `action` fails, the session is dropped without finalizing and the
    /// host is left untouched.
    pub fn run<H, T, E, F>(&self, host: &mut H, action: F) -> Result<T, E>
    where
        H: DataHost + ?Sized,
        F: FnOnce(&Session) -> Result<T, E>,
    {
        self.execute(host, action).map(|outcome| outcome.value)
    }

    /// Like [`ActionWrapper::run`], also returning the commit and flush ticket
    pub fn execute<H, T, E, F>(&self, host: &mut H, action: F) -> Result<ActionOutcome<T>, E>
    where
        H: DataHost + ?Sized,
        F: FnOnce(&Session) -> Result<T, E>,
    {
        let session = Session::new(host.data());
        let value = action(&session)?;
        let commit = session.finalize();
        drop(session);

        let mut flush = None;
        if !commit.updates.is_empty() {
            let merged = host.data().merge(&commit.updates);
            host.set_data(merged);

            if let Some(queue) = &self.flush {
                // Failures are reported through the signal sink
                flush = queue.submit(commit.ops.clone()).ok();
            }
        }

        debug!(
            target: "restore::action",
            updated = commit.updates.len(),
            ops = commit.ops.len(),
            flush = ?flush,
            "Action applied"
        );

        Ok(ActionOutcome {
            value,
            commit,
            flush,
        })
    }
}

/// Bind a business function to a wrapper
///
/// Returns a closure taking the host and the function's argument; the
/// session is supplied by the wrapper.
pub fn with_session<'w, H, A, T, E, F>(
    wrapper: &'w ActionWrapper,
    action: F,
) -> impl Fn(&mut H, A) -> Result<T, E> + 'w
where
    H: DataHost + ?Sized + 'w,
    A: 'w,
    T: 'w,
    E: 'w,
    F: Fn(&Session, A) -> Result<T, E> + 'w,
{
    move |host: &mut H, args: A| wrapper.run(host, |session| action(session, args))
}

/// Replace the host's dataset with the store's dataset (initial load)
pub fn load_data<H: DataHost + ?Sized>(
    store: &dyn RemoteStore,
    host: &mut H,
) -> Result<(), RemoteError> {
    let data = store.load()?;
    debug!(target: "restore::action", tables = data.len(), "Initial data loaded");
    host.set_data(data);
    Ok(())
}
