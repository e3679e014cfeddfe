//! Error types for table access, contract validation and loading

use thiserror::Error;

/// Result type alias using ActuarialError
pub type Result<T> = std::result::Result<T, ActuarialError>;

/// Unified error type for the present-value library
///
/// Point queries against a mortality table fail with `OutOfRange`. The
/// present-value and projection functions never return this type: they
/// degrade to 0.0 / 1.0 / empty results for inputs outside the table.
#[derive(Debug, Error)]
pub enum ActuarialError {
    #[error("age {age} outside range [{min_age}, {max_age}] of table '{table}'")]
    OutOfRange {
        table: String,
        age: u32,
        min_age: u32,
        max_age: u32,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid mortality table: {0}")]
    InvalidTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ActuarialError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ActuarialError::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ActuarialError::OutOfRange {
            table: "IAM2012".to_string(),
            age: 130,
            min_age: 0,
            max_age: 121,
        };
        assert_eq!(
            err.to_string(),
            "age 130 outside range [0, 121] of table 'IAM2012'"
        );
    }
}
