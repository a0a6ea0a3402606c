//! # Verification Module
//!
//! `VerificationRequest` is what a member reports; `VerificationEvent` is the
//! immutable ledger record it becomes.

use crate::member::MemberId;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A member's self-report of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub member_id: MemberId,
    pub display_name: String,
    /// Which session of the week this is (1-based)
    pub session_index: u32,
    /// Penalty money paid alongside the report
    pub penalty_paid: u64,
    pub note: String,
    /// Link to photo/video evidence, if the front end captured one
    pub evidence_url: Option<String>,
}

impl VerificationRequest {
    pub fn new(member_id: MemberId, display_name: &str, session_index: u32) -> Self {
        Self {
            member_id,
            display_name: display_name.to_string(),
            session_index,
            penalty_paid: 0,
            note: String::new(),
            evidence_url: None,
        }
    }

    // === Builder methods ===

    pub fn with_penalty_paid(mut self, amount: u64) -> Self {
        self.penalty_paid = amount;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    pub fn with_evidence_url(mut self, url: &str) -> Self {
        self.evidence_url = Some(url.to_string());
        self
    }
}

/// Append-only ledger record.
///
/// `week_id` is fixed when the event is written and never recomputed, even if
/// the calendar configuration changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Local time of the report
    pub timestamp: DateTime<FixedOffset>,
    pub week_id: String,
    pub member_id: MemberId,
    /// Name captured at write time
    pub display_name: String,
    pub session_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    pub penalty_paid: u64,
    pub note: String,
}

impl VerificationEvent {
    pub fn from_request(
        request: VerificationRequest,
        timestamp: DateTime<FixedOffset>,
        week_id: String,
    ) -> Self {
        Self {
            timestamp,
            week_id,
            member_id: request.member_id,
            display_name: request.display_name,
            session_index: request.session_index,
            evidence_url: request.evidence_url,
            penalty_paid: request.penalty_paid,
            note: request.note,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for VerificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} session #{} by {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.week_id,
            self.session_index,
            self.display_name,
            self.member_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> VerificationEvent {
        let at = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 28, 19, 5, 0)
            .unwrap();
        let request = VerificationRequest::new(MemberId::from("1001"), "Alice", 2)
            .with_penalty_paid(5000)
            .with_note("leg day");
        VerificationEvent::from_request(request, at, "2026-W03".to_string())
    }

    #[test]
    fn test_request_builder() {
        let request = VerificationRequest::new(MemberId::from("1001"), "Alice", 1)
            .with_evidence_url("https://cdn.example/1.jpg");

        assert_eq!(request.penalty_paid, 0);
        assert_eq!(request.note, "");
        assert_eq!(request.evidence_url.as_deref(), Some("https://cdn.example/1.jpg"));
    }

    #[test]
    fn test_event_from_request() {
        let event = sample_event();
        assert_eq!(event.member_id.as_str(), "1001");
        assert_eq!(event.session_index, 2);
        assert_eq!(event.penalty_paid, 5000);
        assert_eq!(event.week_id, "2026-W03");
    }

    #[test]
    fn test_event_display_and_json() {
        let event = sample_event();
        assert_eq!(
            event.to_string(),
            "[2026-01-28 19:05] 2026-W03 session #2 by Alice (1001)"
        );

        let json = event.to_json().unwrap();
        assert!(json.contains("\"member_id\":\"1001\""));
        assert!(!json.contains("evidence_url"));
    }
}
