//! # Member Module
//!
//! `MemberId` and `Member` - the people held accountable by the ledger.
//!
//! Member ids come from the chat platform and are treated as opaque strings.
//! Two ids are the same member only if their strings are equal; nothing is
//! ever coerced to a number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque member identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Display name at registration time
    pub display_name: String,
    /// Lifetime accrued penalty in currency units. Only ever increases.
    pub accrued_penalty: u64,
    /// Local date of registration
    pub joined_at: NaiveDate,
}

impl Member {
    /// New member with no accrued penalty
    pub fn new(id: MemberId, display_name: impl Into<String>, joined_at: NaiveDate) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            accrued_penalty: 0,
            joined_at,
        }
    }

    pub fn with_accrued_penalty(mut self, accrued_penalty: u64) -> Self {
        self.accrued_penalty = accrued_penalty;
        self
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}
