//! Error kinds surfaced by the store and the NAV refresh adapter.

use crate::core::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// A JSON mirror could not be written. The in-memory state is already
/// updated when this is reported.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("data saved in memory only: {0}")]
    Persistence(#[from] PersistError),

    #[error(
        "import partially applied (succeeded: [{}], failed: [{}])",
        .succeeded.join(", "),
        .failed.join(", ")
    )]
    PartialImport {
        succeeded: Vec<String>,
        failed: Vec<String>,
    },

    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
}

impl StoreError {
    /// Caller errors are fixed by changing the input; everything else is on our side.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, StoreError::Validation(_) | StoreError::NotFound { .. })
    }
}

/// No price could be resolved for a scheme; the record is left as it was.
#[derive(Debug, Clone, Error)]
#[error("price unavailable for scheme {scheme_code}: {reason}")]
pub struct PriceUnavailable {
    pub scheme_code: String,
    pub reason: String,
}

/// Outcome of a mutation that succeeded logically.
///
/// `warning` is set when the change could not be mirrored to disk.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub warning: Option<PersistError>,
}

impl<T> Committed<T> {
    pub(crate) fn new(value: T, warning: Option<PersistError>) -> Self {
        Self { value, warning }
    }

    pub fn is_durable(&self) -> bool {
        self.warning.is_none()
    }

    /// Treats a persistence warning as a failure.
    pub fn into_result(self) -> Result<T, StoreError> {
        match self.warning {
            Some(warning) => Err(warning.into()),
            None => Ok(self.value),
        }
    }
}
