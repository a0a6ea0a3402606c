//! Member commands - register, verify, penalty, members

use anyhow::Result;
use fitledger_business::{AccountabilityService, MemberRegistry, ServiceContext};
use fitledger_core::{MemberId, VerificationRequest};

use super::{format_amount, Output};

/// Arguments of `fitledger verify`
pub struct Report {
    pub member_id: String,
    pub name: String,
    pub session: u32,
    pub evidence_url: Option<String>,
    pub paid: u64,
    pub note: String,
}

impl Report {
    fn into_request(self) -> VerificationRequest {
        let mut request = VerificationRequest::new(MemberId::from(self.member_id), &self.name, self.session)
            .with_penalty_paid(self.paid)
            .with_note(&self.note);
        if let Some(url) = &self.evidence_url {
            request = request.with_evidence_url(url);
        }
        request
    }
}

pub async fn register(ctx: &ServiceContext, out: &Output, member_id: &str, name: &str) -> Result<()> {
    let member = AccountabilityService::new(ctx)
        .register_member(&MemberId::from(member_id), name)
        .await?;

    out.render(&member, |m| {
        println!("✅ Registered {}", m);
        println!("   Joined: {}", m.joined_at);
    })
}

pub async fn verify(ctx: &ServiceContext, out: &Output, report: Report) -> Result<()> {
    let receipt = AccountabilityService::new(ctx)
        .submit_verification(report.into_request())
        .await?;

    out.render(&receipt, |r| {
        println!("✅ Session #{} recorded for {}", r.event.session_index, r.event.display_name);
        println!("   Week:      {}", r.window);
        println!("   Progress:  {}/{}", r.weekly_count, r.weekly_count + r.remaining);
        if r.remaining == 0 {
            println!("   🎉 Weekly goal reached!");
        } else {
            println!(
                "   Remaining: {} (penalty if missed: {})",
                r.remaining,
                format_amount(r.potential_penalty)
            );
        }
        if r.event.penalty_paid > 0 {
            println!("   Paid:      {}", format_amount(r.event.penalty_paid));
        }
    })
}

pub async fn penalty(ctx: &ServiceContext, out: &Output, member_id: &str) -> Result<()> {
    let summary = AccountabilityService::new(ctx)
        .member_penalty_summary(&MemberId::from(member_id))
        .await?;

    out.render(&summary, |s| {
        println!("💰 {}", s.member);
        println!(
            "   This week:   {} sessions, {} remaining",
            s.weekly_count, s.remaining
        );
        println!("   If missed:   {}", format_amount(s.potential_penalty));
        println!("   Accrued:     {}", format_amount(s.member.accrued_penalty));
        println!("   Paid:        {}", format_amount(s.total_paid));
        println!("   Outstanding: {}", format_amount(s.outstanding));
    })
}

pub async fn list(ctx: &ServiceContext, out: &Output) -> Result<()> {
    let members = MemberRegistry::new(ctx).members().await?;

    out.render(&members, |members| {
        if members.is_empty() {
            println!("No members registered");
            return;
        }
        println!("👥 Members ({})", members.len());
        println!("   {:<16} {:<20} {:>10}  Joined", "ID", "Name", "Accrued");
        for m in members {
            println!(
                "   {:<16} {:<20} {:>10}  {}",
                m.id.as_str(),
                m.display_name,
                format_amount(m.accrued_penalty),
                m.joined_at
            );
        }
    })
}
