//! # Error Module
//!
//! Domain errors for Fitledger, built with thiserror.

use crate::member::MemberId;
use thiserror::Error;

/// Core domain errors.
///
/// Business rule violations only; store and I/O failures live in the
/// persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    // === Member errors ===
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Member already registered: {0}")]
    MemberAlreadyRegistered(MemberId),

    // === Verification errors ===
    #[error(
        "Verification rejected: {local_time} falls in the blackout window \
         {start_hour:02}:00-{end_hour:02}:00"
    )]
    BlackoutRejected {
        local_time: String,
        start_hour: u32,
        end_hour: u32,
    },

    #[error("Invalid session index {index}: expected 1..={max}")]
    InvalidSessionIndex { index: u32, max: u32 },

    // === Calendar errors ===
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    // === Validation errors ===
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::MemberNotFound(_))
    }

    pub fn is_already_registered(&self) -> bool {
        matches!(self, CoreError::MemberAlreadyRegistered(_))
    }

    pub fn is_blackout(&self) -> bool {
        matches!(self, CoreError::BlackoutRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::MemberNotFound(MemberId::from("1001"));
        assert_eq!(err.to_string(), "Member not found: 1001");

        let err = CoreError::BlackoutRejected {
            local_time: "2026-01-25 02:30".to_string(),
            start_hour: 0,
            end_hour: 4,
        };
        assert_eq!(
            err.to_string(),
            "Verification rejected: 2026-01-25 02:30 falls in the blackout window 00:00-04:00"
        );

        let err = CoreError::InvalidSessionIndex { index: 4, max: 3 };
        assert_eq!(err.to_string(), "Invalid session index 4: expected 1..=3");
    }

    #[test]
    fn test_error_checks() {
        assert!(CoreError::MemberNotFound(MemberId::from("a")).is_not_found());
        assert!(CoreError::MemberAlreadyRegistered(MemberId::from("a")).is_already_registered());
        assert!(CoreError::BlackoutRejected {
            local_time: String::new(),
            start_hour: 0,
            end_hour: 4
        }
        .is_blackout());
        assert!(!CoreError::Validation("x".to_string()).is_blackout());
    }
}
