//! Verification ledger - append-only log of reported sessions
//!
//! A member's weekly progress is the highest session index they reported
//! that week, not the number of rows. Resubmitting "session 2" twice still
//! counts as two sessions done.

use crate::error::BusinessResult;
use crate::registry::MemberRegistry;
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use fitledger_core::{MemberId, VerificationEvent, VerificationRequest, WeeklyStatus};
use fitledger_persistence::VerificationRepo;

/// Verification Ledger - the `verifications` sheet
pub struct VerificationLedger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VerificationLedger<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reject a report made during the blackout or with an out-of-range index
    pub fn check(&self, request: &VerificationRequest, at: DateTime<Utc>) -> BusinessResult<()> {
        if let Err(e) = self.ctx.calendar().check_reporting_allowed(at) {
            tracing::warn!(member_id = %request.member_id, error = %e, "verification rejected");
            return Err(e.into());
        }
        self.ctx
            .policy()
            .validate_session_index(request.session_index)?;
        Ok(())
    }

    /// Record a session reported at `at`
    pub async fn append(
        &self,
        request: VerificationRequest,
        at: DateTime<Utc>,
    ) -> BusinessResult<VerificationEvent> {
        self.check(&request, at)?;

        let calendar = self.ctx.calendar();
        let week_id = calendar.window_at(at).week_id;
        let event = VerificationEvent::from_request(request, calendar.local(at), week_id);
        VerificationRepo::append(self.ctx.store(), &event).await?;

        tracing::info!(
            member_id = %event.member_id,
            week_id = %event.week_id,
            session_index = event.session_index,
            "verification recorded"
        );
        Ok(event)
    }

    /// Highest session index a member reached in a week, 0 if none
    pub async fn weekly_count(&self, member_id: &MemberId, week_id: &str) -> BusinessResult<u32> {
        let events = VerificationRepo::get_by_week(self.ctx.store(), week_id).await?;
        Ok(highest_index(&events, member_id))
    }

    /// Progress of every registered member, in registry order
    pub async fn weekly_status_all(&self, week_id: &str) -> BusinessResult<Vec<WeeklyStatus>> {
        let members = MemberRegistry::new(self.ctx).members().await?;
        let events = VerificationRepo::get_by_week(self.ctx.store(), week_id).await?;
        tracing::debug!(week_id, members = members.len(), events = events.len(), "weekly status");

        let policy = self.ctx.policy();
        Ok(members
            .into_iter()
            .map(|m| {
                let count = highest_index(&events, &m.id);
                policy.status(m.id, &m.display_name, count)
            })
            .collect())
    }

    pub async fn events_for_week(&self, week_id: &str) -> BusinessResult<Vec<VerificationEvent>> {
        Ok(VerificationRepo::get_by_week(self.ctx.store(), week_id).await?)
    }

    /// Sum of penalties a member has reported paying
    pub async fn total_paid(&self, member_id: &MemberId) -> BusinessResult<u64> {
        let events = VerificationRepo::get_by_member(self.ctx.store(), member_id).await?;
        Ok(events
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.penalty_paid)))
    }
}

fn highest_index(events: &[VerificationEvent], member_id: &MemberId) -> u32 {
    events
        .iter()
        .filter(|e| &e.member_id == member_id)
        .map(|e| e.session_index)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use fitledger_core::{FixedClock, PenaltyPolicy, WeekCalendar};
    use fitledger_persistence::MemoryTableStore;
    use std::sync::Arc;

    fn kst(d: u32, h: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn context() -> ServiceContext {
        ServiceContext::from_parts(
            Arc::new(MemoryTableStore::new()),
            PenaltyPolicy::default(),
            WeekCalendar::default(),
            Arc::new(FixedClock::new(kst(28, 12))),
        )
    }

    fn request(member: &str, index: u32) -> VerificationRequest {
        VerificationRequest::new(MemberId::from(member), member, index)
    }

    #[tokio::test]
    async fn test_append_assigns_week_and_local_time() {
        let ctx = context();
        let ledger = VerificationLedger::new(&ctx);

        let event = ledger.append(request("1", 1), kst(28, 19)).await.unwrap();
        assert_eq!(event.week_id, "2026-W03");
        assert_eq!(event.timestamp.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(ledger.events_for_week("2026-W03").await.unwrap(), vec![event]);
    }

    #[tokio::test]
    async fn test_blackout_writes_nothing() {
        let ctx = context();
        let ledger = VerificationLedger::new(&ctx);

        let err = ledger.append(request("1", 1), kst(28, 2)).await.unwrap_err();
        assert!(err.is_blackout());
        assert!(ledger.events_for_week("2026-W03").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_index_out_of_range() {
        let ctx = context();
        let ledger = VerificationLedger::new(&ctx);

        for index in [0, 4] {
            let err = ledger.append(request("1", index), kst(28, 12)).await.unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRequest);
        }
    }

    #[tokio::test]
    async fn test_weekly_count_is_highest_index() {
        let ctx = context();
        let ledger = VerificationLedger::new(&ctx);
        let alice = MemberId::from("1");
        let bob = MemberId::from("2");

        ledger.append(request("1", 3), kst(26, 10)).await.unwrap();
        ledger.append(request("1", 1), kst(27, 10)).await.unwrap();
        ledger.append(request("2", 1), kst(27, 10)).await.unwrap();
        ledger.append(request("2", 2), kst(28, 10)).await.unwrap();
        ledger.append(request("2", 2), kst(28, 11)).await.unwrap();

        assert_eq!(ledger.weekly_count(&alice, "2026-W03").await.unwrap(), 3);
        assert_eq!(ledger.weekly_count(&bob, "2026-W03").await.unwrap(), 2);
        assert_eq!(ledger.weekly_count(&bob, "2026-W02").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_total_paid() {
        let ctx = context();
        let ledger = VerificationLedger::new(&ctx);

        ledger
            .append(request("1", 1).with_penalty_paid(5000), kst(26, 10))
            .await
            .unwrap();
        ledger
            .append(request("1", 2).with_penalty_paid(2500), kst(27, 10))
            .await
            .unwrap();
        ledger.append(request("2", 1), kst(27, 10)).await.unwrap();

        assert_eq!(ledger.total_paid(&MemberId::from("1")).await.unwrap(), 7500);
        assert_eq!(ledger.total_paid(&MemberId::from("2")).await.unwrap(), 0);
    }
}
