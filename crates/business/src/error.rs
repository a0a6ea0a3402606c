//! Business layer errors
//!
//! Typed errors so the front end can tell a member-facing rejection
//! (already registered, blackout, bad index) from a store outage.

use fitledger_core::CoreError;
use fitledger_persistence::PersistenceError;
use thiserror::Error;

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(PersistenceError),

    #[error("Unreadable ledger row: {0}")]
    UnreadableRow(PersistenceError),
}

impl From<PersistenceError> for BusinessError {
    fn from(e: PersistenceError) -> Self {
        if e.is_unreadable_row() {
            BusinessError::UnreadableRow(e)
        } else {
            BusinessError::StoreUnavailable(e)
        }
    }
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

/// Coarse classification for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyRegistered,
    NotFound,
    BlackoutRejected,
    InvalidRequest,
    StoreUnavailable,
    UnreadableRow,
}

impl BusinessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusinessError::Core(CoreError::MemberAlreadyRegistered(_)) => {
                ErrorKind::AlreadyRegistered
            }
            BusinessError::Core(CoreError::MemberNotFound(_)) => ErrorKind::NotFound,
            BusinessError::Core(CoreError::BlackoutRejected { .. }) => ErrorKind::BlackoutRejected,
            BusinessError::Core(_) => ErrorKind::InvalidRequest,
            BusinessError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            BusinessError::UnreadableRow(_) => ErrorKind::UnreadableRow,
        }
    }

    pub fn is_already_registered(&self) -> bool {
        self.kind() == ErrorKind::AlreadyRegistered
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_blackout(&self) -> bool {
        self.kind() == ErrorKind::BlackoutRejected
    }

    pub fn is_store_unavailable(&self) -> bool {
        self.kind() == ErrorKind::StoreUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitledger_core::MemberId;

    #[test]
    fn test_error_kinds() {
        let err: BusinessError = CoreError::MemberAlreadyRegistered(MemberId::from("1")).into();
        assert!(err.is_already_registered());

        let err: BusinessError = CoreError::MemberNotFound(MemberId::from("1")).into();
        assert!(err.is_not_found());

        let err: BusinessError = CoreError::InvalidSessionIndex { index: 9, max: 3 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err: BusinessError = PersistenceError::Timeout {
            operation: "scan members".to_string(),
            after_ms: 5000,
        }
        .into();
        assert!(err.is_store_unavailable());
        assert!(err.to_string().contains("timed out after 5000ms"));

        let err: BusinessError =
            PersistenceError::invalid_cell("members", "accrued_penalty", "15,000").into();
        assert_eq!(err.kind(), ErrorKind::UnreadableRow);
        assert!(!err.is_store_unavailable());
    }
}
