//! Error types for sensor record decoding

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors produced while decoding a raw sensor record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Sensor record truncated: got {len} bytes, need at least {required}")]
    Truncated { len: usize, required: usize },
}

/// Result type for decoding operations
pub type Result<T> = core::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Truncated {
            len: 7,
            required: 16,
        };
        assert_eq!(
            err.to_string(),
            "Sensor record truncated: got 7 bytes, need at least 16"
        );
    }
}
