//! # Policy Module
//!
//! Weekly quota and penalty arithmetic.

use crate::error::{CoreError, CoreResult};
use crate::member::MemberId;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global accountability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyPolicy {
    /// Sessions a member must reach each week
    pub required_weekly_count: u32,
    /// Fine per missed session, in currency units
    pub penalty_per_miss: u64,
}

impl PenaltyPolicy {
    pub fn new(required_weekly_count: u32, penalty_per_miss: u64) -> CoreResult<Self> {
        if required_weekly_count == 0 {
            return Err(CoreError::Validation(
                "required_weekly_count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            required_weekly_count,
            penalty_per_miss,
        })
    }

    /// Sessions still missing after reaching `count`
    pub fn remaining(&self, count: u32) -> u32 {
        self.required_weekly_count.saturating_sub(count)
    }

    pub fn is_completed(&self, count: u32) -> bool {
        count >= self.required_weekly_count
    }

    /// Fine that `missed` sessions would cost
    pub fn penalty_for(&self, missed: u32) -> u64 {
        u64::from(missed).saturating_mul(self.penalty_per_miss)
    }

    /// Projected fine if the week closed with `count` sessions
    pub fn potential_penalty(&self, count: u32) -> u64 {
        self.penalty_for(self.remaining(count))
    }

    /// Check a reported session index against the quota
    pub fn validate_session_index(&self, index: u32) -> CoreResult<()> {
        if index == 0 || index > self.required_weekly_count {
            return Err(CoreError::InvalidSessionIndex {
                index,
                max: self.required_weekly_count,
            });
        }
        Ok(())
    }

    pub fn status(&self, member_id: MemberId, display_name: &str, count: u32) -> WeeklyStatus {
        WeeklyStatus {
            member_id,
            display_name: display_name.to_string(),
            count,
            remaining: self.remaining(count),
            completed: self.is_completed(count),
        }
    }

    /// Shortfall for an incomplete week, `None` when the quota was met
    pub fn shortfall(&self, status: &WeeklyStatus) -> Option<Shortfall> {
        if status.completed || status.remaining == 0 {
            return None;
        }
        Some(Shortfall {
            member_id: status.member_id.clone(),
            display_name: status.display_name.clone(),
            missed: status.remaining,
            penalty: self.penalty_for(status.remaining),
        })
    }
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self {
            required_weekly_count: 3,
            penalty_per_miss: 5000,
        }
    }
}

/// A member's progress for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStatus {
    pub member_id: MemberId,
    pub display_name: String,
    /// Highest session index reached
    pub count: u32,
    pub remaining: u32,
    pub completed: bool,
}

impl fmt::Display for WeeklyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed {
            write!(f, "{}: {} sessions", self.display_name, self.count)
        } else {
            write!(
                f,
                "{}: {} sessions ({} remaining)",
                self.display_name, self.count, self.remaining
            )
        }
    }
}

/// Missed sessions converted into a fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub member_id: MemberId,
    pub display_name: String,
    pub missed: u32,
    pub penalty: u64,
}

/// Persisted once per closed week; its presence makes a second close a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseoutRecord {
    pub week_id: String,
    pub closed_at: DateTime<FixedOffset>,
    pub members_charged: u32,
    pub total_penalty: u64,
}

impl CloseoutRecord {
    pub fn new(week_id: &str, closed_at: DateTime<FixedOffset>, shortfalls: &[Shortfall]) -> Self {
        Self {
            week_id: week_id.to_string(),
            closed_at,
            members_charged: u32::try_from(shortfalls.len()).unwrap_or(u32::MAX),
            total_penalty: shortfalls
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(s.penalty)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_and_potential_penalty() {
        let policy = PenaltyPolicy::new(3, 5000).unwrap();

        assert_eq!(policy.remaining(1), 2);
        assert_eq!(policy.potential_penalty(1), 10000);
        assert_eq!(policy.remaining(3), 0);
        assert_eq!(policy.remaining(5), 0);
        assert_eq!(policy.potential_penalty(0), 15000);
    }

    #[test]
    fn test_zero_quota_rejected() {
        assert!(PenaltyPolicy::new(0, 5000).is_err());
    }

    #[test]
    fn test_session_index_bounds() {
        let policy = PenaltyPolicy::default();
        assert!(policy.validate_session_index(1).is_ok());
        assert!(policy.validate_session_index(3).is_ok());
        assert_eq!(
            policy.validate_session_index(0).unwrap_err(),
            CoreError::InvalidSessionIndex { index: 0, max: 3 }
        );
        assert!(policy.validate_session_index(4).is_err());
    }

    #[test]
    fn test_shortfall_only_for_incomplete() {
        let policy = PenaltyPolicy::default();

        let done = policy.status(MemberId::from("1"), "Alice", 3);
        assert!(done.completed);
        assert_eq!(policy.shortfall(&done), None);

        let behind = policy.status(MemberId::from("2"), "Bob", 1);
        let shortfall = policy.shortfall(&behind).unwrap();
        assert_eq!(shortfall.missed, 2);
        assert_eq!(shortfall.penalty, 10000);
        assert_eq!(shortfall.display_name, "Bob");
    }

    #[test]
    fn test_closeout_record_totals() {
        let policy = PenaltyPolicy::default();
        let shortfalls: Vec<_> = [0, 1, 2]
            .iter()
            .filter_map(|&count| policy.shortfall(&policy.status(MemberId::from("x"), "X", count)))
            .collect();
        let closed_at = chrono::Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap());

        let record = CloseoutRecord::new("2026-W03", closed_at, &shortfalls);
        assert_eq!(record.members_charged, 3);
        assert_eq!(record.total_penalty, 15000 + 10000 + 5000);
    }

    #[test]
    fn test_closeout_record_saturates() {
        let shortfall = Shortfall {
            member_id: MemberId::from("x"),
            display_name: "X".to_string(),
            missed: 3,
            penalty: u64::MAX,
        };
        let closed_at = chrono::Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap());

        let record = CloseoutRecord::new("2026-W03", closed_at, &[shortfall.clone(), shortfall]);
        assert_eq!(record.members_charged, 2);
        assert_eq!(record.total_penalty, u64::MAX);
    }

    #[test]
    fn test_status_display() {
        let policy = PenaltyPolicy::default();
        assert_eq!(
            policy.status(MemberId::from("2"), "Bob", 1).to_string(),
            "Bob: 1 sessions (2 remaining)"
        );
    }
}
