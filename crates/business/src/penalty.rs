//! Penalty engine - converts a week's shortfalls into accrued penalties
//!
//! Closing a week writes a closeout marker first and accrues second. A crash
//! between the two under-charges; re-running a closed week never charges.

use crate::error::BusinessResult;
use crate::ledger::VerificationLedger;
use crate::registry::MemberRegistry;
use crate::services::ServiceContext;
use fitledger_core::{CloseoutRecord, Shortfall};
use fitledger_persistence::CloseoutRepo;
use serde::Serialize;

/// Result of closing a week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CloseOutcome {
    /// Penalties accrued; an empty list means everyone met the quota
    Closed {
        week_id: String,
        shortfalls: Vec<Shortfall>,
    },
    /// The week had been closed before; nothing was charged
    AlreadyClosed { week_id: String },
}

impl CloseOutcome {
    pub fn week_id(&self) -> &str {
        match self {
            CloseOutcome::Closed { week_id, .. } | CloseOutcome::AlreadyClosed { week_id } => {
                week_id
            }
        }
    }

    pub fn total_penalty(&self) -> u64 {
        match self {
            CloseOutcome::Closed { shortfalls, .. } => shortfalls.iter().map(|s| s.penalty).sum(),
            CloseOutcome::AlreadyClosed { .. } => 0,
        }
    }
}

/// Penalty Engine - weekly close-out
pub struct PenaltyEngine<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PenaltyEngine<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One entry per member who missed the quota in `week_id`
    pub async fn compute_shortfalls(&self, week_id: &str) -> BusinessResult<Vec<Shortfall>> {
        let statuses = VerificationLedger::new(self.ctx)
            .weekly_status_all(week_id)
            .await?;
        let policy = self.ctx.policy();
        Ok(statuses.iter().filter_map(|s| policy.shortfall(s)).collect())
    }

    /// Charge every shortfall of `week_id`, at most once per week
    pub async fn close_week(&self, week_id: &str) -> BusinessResult<CloseOutcome> {
        let store = self.ctx.store();

        if CloseoutRepo::exists(store, week_id).await? {
            tracing::warn!(week_id, "week already closed, skipping");
            return Ok(CloseOutcome::AlreadyClosed {
                week_id: week_id.to_string(),
            });
        }

        let shortfalls = self.compute_shortfalls(week_id).await?;
        let closed_at = self.ctx.calendar().local(self.ctx.clock().now());
        let record = CloseoutRecord::new(week_id, closed_at, &shortfalls);
        CloseoutRepo::insert(store, &record).await?;

        let registry = MemberRegistry::new(self.ctx);
        for (charged, shortfall) in shortfalls.iter().enumerate() {
            if let Err(e) = registry
                .accrue(&shortfall.member_id, shortfall.penalty)
                .await
            {
                tracing::error!(
                    week_id,
                    member_id = %shortfall.member_id,
                    charged,
                    remaining = shortfalls.len() - charged,
                    error = %e,
                    "close-out interrupted; week is marked closed"
                );
                return Err(e);
            }
        }

        tracing::info!(
            week_id,
            members_charged = record.members_charged,
            total_penalty = record.total_penalty,
            "week closed"
        );
        Ok(CloseOutcome::Closed {
            week_id: week_id.to_string(),
            shortfalls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use fitledger_core::{FixedClock, MemberId, PenaltyPolicy, VerificationRequest, WeekCalendar};
    use fitledger_persistence::MemoryTableStore;
    use std::sync::Arc;

    fn kst(d: u32, h: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    async fn seeded() -> ServiceContext {
        let ctx = ServiceContext::from_parts(
            Arc::new(MemoryTableStore::new()),
            PenaltyPolicy::default(),
            WeekCalendar::default(),
            Arc::new(FixedClock::new(kst(28, 12))),
        );
        let registry = MemberRegistry::new(&ctx);
        let ledger = VerificationLedger::new(&ctx);
        for (id, name, sessions) in [("1", "Alice", 3), ("2", "Bob", 1), ("3", "Carol", 0)] {
            let id = MemberId::from(id);
            registry.register(&id, name).await.unwrap();
            for index in 1..=sessions {
                ledger
                    .append(VerificationRequest::new(id.clone(), name, index), kst(26, 10))
                    .await
                    .unwrap();
            }
        }
        ctx
    }

    #[tokio::test]
    async fn test_compute_shortfalls() {
        let ctx = seeded().await;
        let shortfalls = PenaltyEngine::new(&ctx)
            .compute_shortfalls("2026-W03")
            .await
            .unwrap();

        let summary: Vec<_> = shortfalls
            .iter()
            .map(|s| (s.display_name.as_str(), s.missed, s.penalty))
            .collect();
        assert_eq!(summary, vec![("Bob", 2, 10000), ("Carol", 3, 15000)]);
    }

    #[tokio::test]
    async fn test_close_week_accrues_once() {
        let ctx = seeded().await;
        let engine = PenaltyEngine::new(&ctx);

        let outcome = engine.close_week("2026-W03").await.unwrap();
        assert_eq!(outcome.total_penalty(), 25000);

        let again = engine.close_week("2026-W03").await.unwrap();
        assert_eq!(
            again,
            CloseOutcome::AlreadyClosed {
                week_id: "2026-W03".to_string()
            }
        );

        let registry = MemberRegistry::new(&ctx);
        assert_eq!(registry.lookup(&MemberId::from("1")).await.unwrap().accrued_penalty, 0);
        assert_eq!(registry.lookup(&MemberId::from("2")).await.unwrap().accrued_penalty, 10000);
        assert_eq!(registry.lookup(&MemberId::from("3")).await.unwrap().accrued_penalty, 15000);

        let record = CloseoutRepo::find(ctx.store(), "2026-W03").await.unwrap().unwrap();
        assert_eq!(record.members_charged, 2);
        assert_eq!(record.total_penalty, 25000);
    }

    #[tokio::test]
    async fn test_close_week_with_no_members() {
        let ctx = ServiceContext::from_parts(
            Arc::new(MemoryTableStore::new()),
            PenaltyPolicy::default(),
            WeekCalendar::default(),
            Arc::new(FixedClock::new(kst(28, 12))),
        );
        let engine = PenaltyEngine::new(&ctx);

        let outcome = engine.close_week("2026-W03").await.unwrap();
        assert_eq!(
            outcome,
            CloseOutcome::Closed {
                week_id: "2026-W03".to_string(),
                shortfalls: vec![]
            }
        );
        assert!(CloseoutRepo::exists(ctx.store(), "2026-W03").await.unwrap());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = CloseOutcome::AlreadyClosed {
            week_id: "2026-W03".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "already_closed");
        assert_eq!(json["week_id"], "2026-W03");
    }
}
