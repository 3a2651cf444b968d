//! Error taxonomy shared by every service in the crate.
//!
//! Each [`NexafsError`] belongs to one [`ErrorKind`], and each kind maps to a
//! transport-level status label so a request layer can translate failures
//! without inspecting messages.

use std::fmt;

use crate::store::StoreError;

/// Errors surfaced by the search, ingest, and catalog services
#[derive(Debug, thiserror::Error)]
pub enum NexafsError {
    /// Malformed or missing required input; nothing was persisted
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist, or a search found nothing
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind (e.g., "molecule")
        entity: &'static str,
        /// Key that was looked up
        key: String,
    },

    /// A uniqueness invariant would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller has no identity
    #[error("Authentication required")]
    Unauthorized,

    /// The caller may not modify the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Persistence failure; details are logged, not displayed
    #[error("Internal error")]
    Internal(#[source] StoreError),
}

/// Coarse classification of a [`NexafsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input
    Validation,
    /// Missing entity or empty result
    NotFound,
    /// Uniqueness violation
    Conflict,
    /// Missing identity
    Unauthorized,
    /// Missing rights
    Forbidden,
    /// Unexpected failure
    Internal,
}

impl ErrorKind {
    /// Transport status label for this kind
    pub fn status(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "BAD_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

impl NexafsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NexafsError::Validation(_) => ErrorKind::Validation,
            NexafsError::NotFound { .. } => ErrorKind::NotFound,
            NexafsError::Conflict(_) => ErrorKind::Conflict,
            NexafsError::Unauthorized => ErrorKind::Unauthorized,
            NexafsError::Forbidden(_) => ErrorKind::Forbidden,
            NexafsError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl From<StoreError> for NexafsError {
    fn from(error: StoreError) -> Self {
        if error.is_unique_violation() {
            return NexafsError::Conflict(error.to_string());
        }
        log::error!("store failure: {error}");
        NexafsError::Internal(error)
    }
}
