//! Event capacity rule.
//!
//! A booking may only become approved while the number of approved
//! participants is strictly below the event capacity.

/// Rejection raised when an event has no free places
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Event is full: {approved} approved participants for {capacity} places")]
pub struct CapacityError {
    pub approved: u32,
    pub capacity: u32,
}

/// Check that one more participant can be approved
///
/// # Errors
/// Returns [`CapacityError`] exactly when `approved >= capacity`.
pub fn ensure_capacity(approved: u32, capacity: u32) -> Result<(), CapacityError> {
    if approved >= capacity {
        return Err(CapacityError { approved, capacity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(0, 10)]
    #[case(9, 10)]
    #[case(41, 250)]
    fn test_accepts_when_places_remain(#[case] approved: u32, #[case] capacity: u32) {
        assert_eq!(ensure_capacity(approved, capacity), Ok(()));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 10)]
    #[case(11, 10)]
    fn test_rejects_when_full(#[case] approved: u32, #[case] capacity: u32) {
        assert_eq!(ensure_capacity(approved, capacity), Err(CapacityError { approved, capacity }));
    }

    #[test]
    fn test_boundary_matches_comparison_exhaustively() {
        for capacity in 0..20 {
            for approved in 0..25 {
                assert_eq!(ensure_capacity(approved, capacity).is_err(), approved >= capacity);
            }
        }
    }
}
