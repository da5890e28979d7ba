//! # Core Error Types
//!
//! Domain errors for pure cart logic.
//!
//! Clamping never fails (bad input becomes zero, see [`crate::validation`]),
//! so this enum only covers the few places where a value cannot be repaired
//! locally and the caller has to know.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type for pure cart logic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A line position outside the snapshot (positions are 1-indexed).
    #[error("line position {position} is out of range (cart has {line_count} lines)")]
    PositionOutOfRange { position: u32, line_count: usize },

    /// Position zero is never valid; the mutation endpoint is 1-indexed.
    #[error("line position must be >= 1")]
    ZeroPosition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::PositionOutOfRange {
            position: 5,
            line_count: 2,
        };
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('2'));
    }
}
