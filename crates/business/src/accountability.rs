//! Accountability service - the operations the front end calls
//!
//! Composes the registry, ledger and penalty engine against the clock's
//! notion of "this week".

use crate::error::BusinessResult;
use crate::ledger::VerificationLedger;
use crate::penalty::{CloseOutcome, PenaltyEngine};
use crate::registry::MemberRegistry;
use crate::services::ServiceContext;
use fitledger_core::{Member, MemberId, VerificationEvent, VerificationRequest, WeekWindow, WeeklyStatus};
use serde::Serialize;

/// What a member sees after reporting a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReceipt {
    pub event: VerificationEvent,
    pub weekly_count: u32,
    pub remaining: u32,
    pub potential_penalty: u64,
    pub window: WeekWindow,
}

/// A member's standing: this week's progress and the running balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PenaltySummary {
    pub member: Member,
    pub weekly_count: u32,
    pub remaining: u32,
    pub potential_penalty: u64,
    pub total_paid: u64,
    pub outstanding: u64,
}

/// Everyone's progress for the current week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyOverview {
    pub window: WeekWindow,
    pub completed: Vec<WeeklyStatus>,
    pub incomplete: Vec<WeeklyStatus>,
}

/// Accountability Service
pub struct AccountabilityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountabilityService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn register_member(
        &self,
        member_id: &MemberId,
        display_name: &str,
    ) -> BusinessResult<Member> {
        MemberRegistry::new(self.ctx)
            .register(member_id, display_name)
            .await
    }

    /// Record a session reported now, registering the member on first use
    pub async fn submit_verification(
        &self,
        request: VerificationRequest,
    ) -> BusinessResult<VerificationReceipt> {
        let now = self.ctx.clock().now();
        let window = self.ctx.calendar().window_at(now);
        let ledger = VerificationLedger::new(self.ctx);
        ledger.check(&request, now)?;

        match MemberRegistry::new(self.ctx)
            .register(&request.member_id, &request.display_name)
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_already_registered() => {}
            Err(e) => return Err(e),
        }

        let event = ledger.append(request, now).await?;
        let weekly_count = ledger
            .weekly_count(&event.member_id, &window.week_id)
            .await?;

        let policy = self.ctx.policy();
        Ok(VerificationReceipt {
            event,
            weekly_count,
            remaining: policy.remaining(weekly_count),
            potential_penalty: policy.potential_penalty(weekly_count),
            window,
        })
    }

    pub async fn member_penalty_summary(&self, member_id: &MemberId) -> BusinessResult<PenaltySummary> {
        let member = MemberRegistry::new(self.ctx).lookup(member_id).await?;
        let window = self.ctx.current_week();

        let ledger = VerificationLedger::new(self.ctx);
        let weekly_count = ledger.weekly_count(member_id, &window.week_id).await?;
        let total_paid = ledger.total_paid(member_id).await?;

        let policy = self.ctx.policy();
        Ok(PenaltySummary {
            weekly_count,
            remaining: policy.remaining(weekly_count),
            potential_penalty: policy.potential_penalty(weekly_count),
            total_paid,
            outstanding: member.accrued_penalty.saturating_sub(total_paid),
            member,
        })
    }

    pub async fn weekly_overview(&self) -> BusinessResult<WeeklyOverview> {
        let window = self.ctx.current_week();
        let statuses = VerificationLedger::new(self.ctx)
            .weekly_status_all(&window.week_id)
            .await?;
        let (completed, incomplete) = statuses.into_iter().partition(|s| s.completed);

        Ok(WeeklyOverview {
            window,
            completed,
            incomplete,
        })
    }

    /// Close the week that ended before the current one
    pub async fn run_weekly_closeout(&self) -> BusinessResult<CloseOutcome> {
        let week = self.ctx.previous_week();
        tracing::info!(week = %week, "running weekly close-out");
        self.close_week(&week.week_id).await
    }

    /// Close a finished week by id; the current week and typos are refused
    pub async fn close_week(&self, week_id: &str) -> BusinessResult<CloseOutcome> {
        let week = self.ctx.calendar().ended_week(week_id, self.ctx.clock())?;
        PenaltyEngine::new(self.ctx).close_week(&week.week_id).await
    }
}
