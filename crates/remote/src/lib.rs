//! Remote write-back for restore sessions
//!
//! This crate connects finalized sessions to the outside world:
//! - `ActionWrapper`: runs business functions in a session and merges the result
//! - `FlushQueue`: ordered background flush of operation batches
//! - `RemoteStore`: the persistence seam (`HttpRemote`, `MemoryRemote`)
//! - `RemoteConfig`: `restore.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod config;
pub mod error;
pub mod flush;
pub mod store;

pub use action::{load_data, with_session, ActionOutcome, ActionWrapper, DataHost};
pub use config::{RemoteConfig, CONFIG_FILE_NAME};
pub use error::{check_status, RemoteError};
pub use flush::{ignore_signals, FlushQueue, FlushStats, RemoteSignal, SignalSink};
#[cfg(feature = "http")]
pub use store::HttpRemote;
pub use store::{apply_to_dataset, MemoryRemote, RemoteStore};
