//! Typed failures for a single series evaluation.
//!
//! Everything here is recoverable at the scan level: one bad series is
//! logged and skipped, the rest of the scan continues.

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("insufficient data: need {need} candles, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("non-monotonic timestamp at index {index}")]
    NonMonotonicTimestamps { index: usize },

    #[error("duplicate timestamp at index {index}")]
    DuplicateTimestamp { index: usize },
}

/// Reject out-of-order or duplicated candle timestamps. The fetch layer is
/// expected to deliver ascending open times; when it does not, that is a
/// data-quality fault to surface, not to repair.
pub fn validate_timestamps(open_timestamps_ms: &[i64]) -> Result<()> {
    for (i, pair) in open_timestamps_ms.windows(2).enumerate() {
        if pair[1] == pair[0] {
            return Err(EvalError::DuplicateTimestamp { index: i + 1 });
        }
        if pair[1] < pair[0] {
            return Err(EvalError::NonMonotonicTimestamps { index: i + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_timestamps_pass() {
        assert!(validate_timestamps(&[1, 2, 3, 10]).is_ok());
        assert!(validate_timestamps(&[]).is_ok());
        assert!(validate_timestamps(&[5]).is_ok());
    }

    #[test]
    fn duplicates_and_regressions_are_rejected() {
        assert_eq!(
            validate_timestamps(&[1, 2, 2]),
            Err(EvalError::DuplicateTimestamp { index: 2 })
        );
        assert_eq!(
            validate_timestamps(&[1, 3, 2]),
            Err(EvalError::NonMonotonicTimestamps { index: 2 })
        );
    }
}
