//! Member registry - registration, lookup, penalty accrual

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use fitledger_core::{CoreError, Member, MemberId};
use fitledger_persistence::{MemberRepo, StoredMember};
use std::collections::HashSet;

/// Member Registry - the `members` sheet
pub struct MemberRegistry<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberRegistry<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a member with no accrued penalty, joined today (local date).
    ///
    /// Any row carrying the id counts as registered, readable or not.
    pub async fn register(&self, member_id: &MemberId, display_name: &str) -> BusinessResult<Member> {
        if MemberRepo::exists(self.ctx.store(), member_id).await? {
            return Err(CoreError::MemberAlreadyRegistered(member_id.clone()).into());
        }

        let joined_at = self.ctx.calendar().local_date(self.ctx.clock().now());
        let member = Member::new(member_id.clone(), display_name, joined_at);
        MemberRepo::insert(self.ctx.store(), &member).await?;

        tracing::info!(member = %member, "member registered");
        Ok(member)
    }

    /// First registry row for `member_id`
    pub async fn lookup(&self, member_id: &MemberId) -> BusinessResult<Member> {
        Ok(self.find(member_id).await?.member)
    }

    /// Add `amount` to a member's running penalty and return the new total
    pub async fn accrue(&self, member_id: &MemberId, amount: u64) -> BusinessResult<u64> {
        let stored = self.find(member_id).await?;
        if amount == 0 {
            return Ok(stored.member.accrued_penalty);
        }

        let total = stored.member.accrued_penalty.saturating_add(amount);
        MemberRepo::set_accrued_penalty(self.ctx.store(), stored.address, total).await?;

        tracing::info!(member_id = %member_id, amount, total, "penalty accrued");
        Ok(total)
    }

    /// All members in registry order, one entry per id
    pub async fn members(&self) -> BusinessResult<Vec<Member>> {
        let rows = MemberRepo::get_all(self.ctx.store()).await?;
        tracing::debug!(rows = rows.len(), "scanned registry");

        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .filter(|stored| seen.insert(stored.member.id.clone()))
            .map(|stored| stored.member)
            .collect())
    }

    async fn find(&self, member_id: &MemberId) -> BusinessResult<StoredMember> {
        MemberRepo::find(self.ctx.store(), member_id)
            .await?
            .ok_or_else(|| CoreError::MemberNotFound(member_id.clone()).into())
    }
}
