//! # Validation Module
//!
//! Input repair and validation for cart mutations.
//!
//! ## Clamping Strategy
//! Quantity inputs arrive from free-form text fields and from arithmetic on
//! whatever a text field held a moment ago. The contract is repair, not
//! rejection: anything that is not a non-negative integer becomes `0`, and
//! values above [`crate::MAX_LINE_QUANTITY`] saturate to it. A quantity of
//! `0` is meaningful - it removes the line.

use crate::error::{CoreError, CoreResult};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Quantity Clamping
// =============================================================================

/// Clamps a raw text quantity to a non-negative integer.
///
/// ## Example
/// ```rust
/// use vista_core::validation::clamp_raw_quantity;
///
/// assert_eq!(clamp_raw_quantity("3"), 3);
/// assert_eq!(clamp_raw_quantity("-3"), 0);
/// assert_eq!(clamp_raw_quantity("abc"), 0);
/// assert_eq!(clamp_raw_quantity(""), 0);
/// ```
pub fn clamp_raw_quantity(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(n) => clamp_quantity(n),
        Err(_) => 0,
    }
}

/// Clamps a numeric quantity into the `0..=MAX_LINE_QUANTITY` range.
pub fn clamp_quantity(n: i64) -> u32 {
    if n < 0 {
        0
    } else if n > MAX_LINE_QUANTITY as i64 {
        MAX_LINE_QUANTITY
    } else {
        n as u32
    }
}

// =============================================================================
// Position Validation
// =============================================================================

/// Validates a 1-indexed line position against a snapshot's line count.
///
/// Positions are ephemeral (valid until the next snapshot), so this is only
/// a sanity check before sending a mutation, not a guarantee the server will
/// still see the same line.
pub fn validate_position(position: u32, line_count: usize) -> CoreResult<()> {
    if position == 0 {
        return Err(CoreError::ZeroPosition);
    }
    if position as usize > line_count {
        return Err(CoreError::PositionOutOfRange {
            position,
            line_count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_accepts_plain_integers() {
        assert_eq!(clamp_raw_quantity("0"), 0);
        assert_eq!(clamp_raw_quantity("7"), 7);
        assert_eq!(clamp_raw_quantity(" 12 "), 12);
    }

    #[test]
    fn test_clamp_repairs_bad_input_to_zero() {
        // P4: "-3", "abc" and "" all normalize to 0
        assert_eq!(clamp_raw_quantity("-3"), 0);
        assert_eq!(clamp_raw_quantity("abc"), 0);
        assert_eq!(clamp_raw_quantity(""), 0);
        assert_eq!(clamp_raw_quantity("3.5"), 0);
    }

    #[test]
    fn test_clamp_saturates_at_ceiling() {
        assert_eq!(clamp_quantity(1_000_000), MAX_LINE_QUANTITY);
        assert_eq!(clamp_raw_quantity("99999"), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_position_validation() {
        assert!(validate_position(1, 2).is_ok());
        assert!(validate_position(2, 2).is_ok());
        assert_eq!(validate_position(0, 2), Err(CoreError::ZeroPosition));
        assert_eq!(
            validate_position(3, 2),
            Err(CoreError::PositionOutOfRange {
                position: 3,
                line_count: 2
            })
        );
    }
}
