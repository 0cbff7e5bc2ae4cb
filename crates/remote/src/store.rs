//! Remote store collaborators
//!
//! The [`RemoteStore`] trait is the seam between the action wrapper and
//! whatever persists the data:
//! - [`HttpRemote`]: `GET`/`POST` of JSON documents against one endpoint
//! - [`MemoryRemote`]: in-process store applying batches atomically, used
//!   for local runs and tests
//!
//! A store applies the records of one batch in array order, as upserts and
//! deletes keyed by `fields.id`, and either applies all of them or none.

use crate::error::RemoteError;
use parking_lot::Mutex;
use restore_core::{Collection, Dataset, OpKind, OperationRecord};

/// Persistence endpoint for datasets and operation batches
pub trait RemoteStore: Send + Sync {
    /// Fetch the full dataset (initial load)
    fn load(&self) -> Result<Dataset, RemoteError>;

    /// Apply one batch of records, in order, atomically
    fn apply(&self, ops: &[OperationRecord]) -> Result<(), RemoteError>;
}

/// Apply a batch to a dataset, producing the new dataset
///
/// All-or-nothing: the input is left as is and an error is returned if any
/// record cannot be applied.
/// - CREATE fails if the id already exists; the table is created if missing
/// - UPDATE replaces the row with the same id, if any
/// - DELETE removes the row with the same id, if any
///
/// An UPDATE or DELETE that matches no row succeeds without changing
/// anything, the way a SQL statement matching zero rows does.
pub fn apply_to_dataset(data: &Dataset, ops: &[OperationRecord]) -> Result<Dataset, RemoteError> {
    let mut next = data.clone();

    for (index, op) in ops.iter().enumerate() {
        let id = op
            .row_id()
            .ok_or_else(|| RemoteError::Rejected(format!("operation {} has no id", index)))?;
        let mut rows = next
            .get(&op.table)
            .map(Collection::to_vec)
            .unwrap_or_default();
        let position = rows.iter().position(|row| row.id().as_ref() == Some(&id));

        match (op.kind, position) {
            (OpKind::Create, None) => rows.push(op.fields.clone()),
            (OpKind::Create, Some(_)) => {
                return Err(RemoteError::Rejected(format!(
                    "duplicate id {} in {}",
                    id, op.table
                )))
            }
            (OpKind::Update, Some(i)) => rows[i] = op.fields.clone(),
            (OpKind::Delete, Some(i)) => {
                rows.remove(i);
            }
            (OpKind::Update | OpKind::Delete, None) => {}
        }

        next.insert(op.table.clone(), Collection::new(rows));
    }

    Ok(next)
}

// ============================================================================
// In-process store
// ============================================================================

/// In-memory remote store
///
/// Keeps a dataset and a log of every batch it accepted. Batches go through
/// [`apply_to_dataset`], so only a duplicate CREATE or a record without an id
/// is rejected. A failure can be injected to exercise the `Fail` path of the
/// flush queue.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    data: Mutex<Dataset>,
    applied: Mutex<Vec<Vec<OperationRecord>>>,
    fail_next: Mutex<Option<RemoteError>>,
}

impl MemoryRemote {
    /// Create a store holding `data`
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    /// Current dataset
    pub fn data(&self) -> Dataset {
        self.data.lock().clone()
    }

    /// Batches accepted so far, in order
    pub fn applied(&self) -> Vec<Vec<OperationRecord>> {
        self.applied.lock().clone()
    }

    /// Make the next `apply` fail with `error`
    pub fn fail_next(&self, error: RemoteError) {
        *self.fail_next.lock() = Some(error);
    }
}

impl RemoteStore for MemoryRemote {
    fn load(&self) -> Result<Dataset, RemoteError> {
        Ok(self.data())
    }

    fn apply(&self, ops: &[OperationRecord]) -> Result<(), RemoteError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }

        let mut data = self.data.lock();
        *data = apply_to_dataset(&data, ops)?;
        self.applied.lock().push(ops.to_vec());
        Ok(())
    }
}

// ============================================================================
// HTTP store
// ============================================================================

/// Remote store reached over HTTP
///
/// `load` is a `GET` of the endpoint returning the dataset document; `apply`
/// is a `POST` of the JSON batch. Only status 200 counts as success.
#[cfg(feature = "http")]
pub struct HttpRemote {
    endpoint: String,
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpRemote {
    /// Client for `endpoint` with a global request timeout
    pub fn new(endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            endpoint: endpoint.into(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Client built from a config; `None` if no endpoint is configured
    pub fn from_config(config: &crate::config::RemoteConfig) -> Option<Self> {
        config
            .endpoint
            .as_ref()
            .map(|endpoint| Self::new(endpoint.clone(), config.timeout()))
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "http")]
fn transport_error(e: ureq::Error) -> RemoteError {
    match e {
        ureq::Error::Timeout(_) => RemoteError::Timeout,
        ureq::Error::StatusCode(code) => RemoteError::Status(code),
        other => RemoteError::Network(other.to_string()),
    }
}

#[cfg(feature = "http")]
impl RemoteStore for HttpRemote {
    fn load(&self) -> Result<Dataset, RemoteError> {
        let mut response = self
            .agent
            .get(self.endpoint.as_str())
            .header("Accept", "application/json")
            .call()
            .map_err(transport_error)?;

        crate::error::check_status(response.status().as_u16())?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| RemoteError::Network(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| RemoteError::Parse(format!("invalid dataset document: {}", e)))
    }

    fn apply(&self, ops: &[OperationRecord]) -> Result<(), RemoteError> {
        let body = restore_core::op::to_json_bytes(ops)?;

        let response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .send(&body[..])
            .map_err(transport_error)?;

        crate::error::check_status(response.status().as_u16())
    }
}
