//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx errors and store
//! contract violations.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store call timed out after {after_ms}ms: {operation}")]
    Timeout { operation: String, after_ms: u64 },

    // === Contract errors ===
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Unknown column: {sheet}.{column}")]
    UnknownColumn { sheet: String, column: String },

    #[error("Row not found: {sheet} row {address}")]
    RowNotFound { sheet: String, address: u64 },

    // === Conversion errors ===
    #[error("Missing cell: {sheet}.{column}")]
    MissingCell { sheet: String, column: String },

    #[error("Invalid cell value: {sheet}.{column} = {value}")]
    InvalidCell {
        sheet: String,
        column: String,
        value: String,
    },

    // === Other errors ===
    #[error("{0}")]
    Other(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn unknown_column(sheet: &str, column: &str) -> Self {
        Self::UnknownColumn {
            sheet: sheet.to_string(),
            column: column.to_string(),
        }
    }

    pub fn missing_cell(sheet: &str, column: &str) -> Self {
        Self::MissingCell {
            sheet: sheet.to_string(),
            column: column.to_string(),
        }
    }

    pub fn invalid_cell(sheet: &str, column: &str, value: impl ToString) -> Self {
        Self::InvalidCell {
            sheet: sheet.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The store answered, but a row it returned could not be decoded
    pub fn is_unreadable_row(&self) -> bool {
        matches!(self, Self::MissingCell { .. } | Self::InvalidCell { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersistenceError::invalid_cell("members", "accrued_penalty", "abc");
        assert_eq!(
            err.to_string(),
            "Invalid cell value: members.accrued_penalty = abc"
        );

        let err = PersistenceError::Timeout {
            operation: "scan members".to_string(),
            after_ms: 5000,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("5000ms"));
        assert!(!err.is_unreadable_row());
        assert!(PersistenceError::missing_cell("members", "joined_at").is_unreadable_row());
    }
}
