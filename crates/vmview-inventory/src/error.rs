//! Error types for vmview-inventory

use thiserror::Error;
use vmview_upstream::UpstreamError;

/// Load-bearing failures of an inventory operation
///
/// Enrichment lookups never produce these; they degrade to sentinel values
/// instead (see [`crate::Resolution`]).
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Session creation failed; nothing else can proceed
    #[error("upstream authentication failed ({status}): {message}")]
    UpstreamAuth {
        /// Upstream status, or 500 when the upstream was unreachable
        status: u16,
        /// Failure description
        message: String,
    },

    /// The anchor per-VM summary could not be fetched
    #[error("VM lookup failed ({status}): {body}")]
    UpstreamNotFound {
        /// Upstream status
        status: u16,
        /// Upstream response body
        body: String,
    },

    /// A power operation was refused or failed upstream
    #[error("power action failed ({status}): {body}")]
    UpstreamAction {
        /// Upstream status
        status: u16,
        /// Upstream response body
        body: String,
    },

    /// Power action outside start/stop/reset
    #[error("invalid power action: {0}")]
    InvalidAction(String),

    /// The VM listing itself failed
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl InventoryError {
    /// Status code the HTTP boundary should answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            InventoryError::UpstreamAuth { status, .. }
            | InventoryError::UpstreamNotFound { status, .. }
            | InventoryError::UpstreamAction { status, .. } => *status,
            InventoryError::InvalidAction(_) => 400,
            InventoryError::Upstream(e) => e.status_code(),
        }
    }

    pub(crate) fn auth(error: &UpstreamError) -> Self {
        InventoryError::UpstreamAuth {
            status: error.status_code(),
            message: error.to_string(),
        }
    }

    pub(crate) fn not_found(error: &UpstreamError) -> Self {
        InventoryError::UpstreamNotFound {
            status: error.status_code(),
            body: error.body(),
        }
    }

    pub(crate) fn action(error: &UpstreamError) -> Self {
        InventoryError::UpstreamAction {
            status: error.status_code(),
            body: error.body(),
        }
    }
}
