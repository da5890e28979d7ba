//! # Drawer Error Types
//!
//! Error types for the drawer controller and its transport.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Drawer Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │    Render       │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Unreachable    │  │  MissingContainer│ │  InvalidConfig          │ │
//! │  │  InvalidPayload │  │                 │  │  InvalidRoot            │ │
//! │  │  HttpStatus     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  RECOVERY RULE: nothing here ever escalates to the mount harness.       │
//! │  Transport failures degrade the body, render failures are diagnosed     │
//! │  once and skipped, config failures are surfaced at bind time.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for drawer operations.
pub type DrawerResult<T> = Result<T, DrawerError>;

// =============================================================================
// Transport Errors
// =============================================================================

/// A failed round-trip to the cart endpoints.
///
/// ## Design Principles
/// - Network-level failures (timeout, abort, DNS) are `Unreachable`
/// - A body that is not a JSON object/array is `InvalidPayload`
/// - Non-success statuses keep their code for diagnostics
/// - This layer never retries; retry policy belongs to the caller
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached (timeout, abort, DNS failure).
    #[error("cart endpoint unreachable: {0}")]
    Unreachable(String),

    /// The response body did not parse as a JSON object or array.
    #[error("cart payload invalid: {0}")]
    InvalidPayload(String),

    /// The endpoint answered with a non-success status.
    #[error("cart endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

impl TransportError {
    /// Returns true if a later attempt could plausibly succeed.
    ///
    /// A malformed payload is terminal (the server is answering, just not
    /// with a cart); everything else is a transient network condition.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Unreachable(_) | TransportError::HttpStatus(_)
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            TransportError::Unreachable(err.to_string())
        } else if err.is_decode() {
            TransportError::InvalidPayload(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::HttpStatus(status.as_u16())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::InvalidPayload(err.to_string())
    }
}

// =============================================================================
// Drawer Errors
// =============================================================================

/// Drawer error type covering controller-level failures.
#[derive(Debug, Error)]
pub enum DrawerError {
    /// A cart round-trip failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body container is absent from the mounted root.
    ///
    /// Fatal to rendering, not to the controller: open/close keep working,
    /// content simply cannot display.
    #[error("drawer body container not found in mounted root")]
    MissingContainer,

    /// An option attribute failed typed validation at bind time.
    #[error("invalid drawer option: {0}")]
    InvalidConfig(String),

    /// The store root URL could not be parsed or joined.
    #[error("invalid store root: {0}")]
    InvalidRoot(String),

    /// The controller has been destroyed.
    #[error("drawer controller destroyed")]
    Destroyed,
}

impl From<url::ParseError> for DrawerError {
    fn from(err: url::ParseError) -> Self {
        DrawerError::InvalidRoot(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(TransportError::Unreachable("dns".into()).is_retryable());
        assert!(TransportError::HttpStatus(500).is_retryable());
        assert!(!TransportError::InvalidPayload("html".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::HttpStatus(500);
        assert!(err.to_string().contains("500"));

        let err = DrawerError::MissingContainer;
        assert!(err.to_string().contains("container"));
    }
}
