//! Unified error taxonomy for the backend layer.
//!
//! Propagation policy: validation, not-found, and constraint errors surface
//! unchanged to the caller; cascade errors carry the failing stage; session
//! *mutation* failures propagate while session *lookup* failures never reach
//! this type (the resolver swallows them to a logged-out state). There are no
//! automatic retries anywhere in this layer.

use thiserror::Error;

use crate::blob::BlobError;
use crate::services::cascade::CascadeError;
use crate::session::SessionError;
use crate::store::StoreError;
use crate::validate::ValidationError;

/// Application-level error type for the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed input, rejected before any store access.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity is absent.
    #[error("{kind} not found")]
    NotFound {
        /// Entity kind that could not be resolved.
        kind: &'static str,
    },

    /// Constraint violation (e.g., unique email, insufficient stock).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A cascade step errored; the stage is named in the source.
    #[error(transparent)]
    Cascade(#[from] CascadeError),

    /// Bad credentials. Deliberately generic: never reveals whether the
    /// email or the password was wrong.
    #[error("invalid credentials")]
    AuthFailed,

    /// Session token create/delete failed.
    #[error("session operation failed: {0}")]
    SessionOp(#[from] SessionError),

    /// Blob store operation failed.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Record store operation failed.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Internal error (e.g., password hashing backend).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// `NotFound` for the given entity kind.
    #[must_use]
    pub const fn not_found(kind: &'static str) -> Self {
        Self::NotFound { kind }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        // Store-level conflicts (duplicate keys) belong to the constraint
        // category of the taxonomy, not to the opaque store bucket.
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}

/// Result type alias for `BackendError`.
pub type Result<T, E = BackendError> = std::result::Result<T, E>;
