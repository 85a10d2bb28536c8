use thiserror::Error;

use crate::apply::ApplyError;
use crate::color::ColorError;
use crate::locate::LocateError;
use crate::store::StoreError;

/// Failure of a user-facing mark operation.
#[derive(Debug, Error)]
pub enum MarkError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error("failed to persist marks: {0}")]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("no mark with id {0}")]
    UnknownMark(String),
}

impl MarkError {
    /// Errors after which the in-memory state already reflects the change.
    pub fn is_persistence(&self) -> bool {
        matches!(self, MarkError::Persistence(_))
    }
}
