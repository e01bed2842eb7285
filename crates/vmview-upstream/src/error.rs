//! Error types for upstream calls

use thiserror::Error;

/// Errors returned by the upstream clients
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure, including per-call timeouts
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Invalid upstream address
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// SOAP fault raised by the object-graph endpoint
    #[error("SOAP fault: {fault}")]
    Soap {
        /// Fault string reported by the server
        fault: String,
    },

    /// Response could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Status code to surface for this failure
    ///
    /// The upstream status when one was received, otherwise 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Http(e) => e.status().map_or(500, |s| s.as_u16()),
            _ => 500,
        }
    }

    /// Check if the call exceeded its timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Http(e) if e.is_timeout())
    }

    /// Response body text, when the upstream sent one
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            UpstreamError::Status { body, .. } => body.clone(),
            UpstreamError::Soap { fault } => fault.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for upstream operations
pub type Result<T> = std::result::Result<T, UpstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_from_status() {
        let err = UpstreamError::Status {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.body(), "not found");
    }

    #[test]
    fn test_status_code_defaults_to_500() {
        let err = UpstreamError::InvalidResponse("garbage".to_string());
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_timeout());

        let err = UpstreamError::Soap {
            fault: "NotAuthenticated".to_string(),
        };
        assert_eq!(err.status_code(), 500);
    }
}
