//! Week commands - weekly overview, history, close-out

use anyhow::Result;
use fitledger_business::{AccountabilityService, CloseOutcome, ServiceContext, VerificationLedger};
use fitledger_core::MemberId;

use super::{format_amount, Output};

pub async fn weekly(ctx: &ServiceContext, out: &Output) -> Result<()> {
    let overview = AccountabilityService::new(ctx).weekly_overview().await?;

    out.render(&overview, |o| {
        println!("📅 Week {}", o.window);
        println!();
        println!("✅ Completed ({})", o.completed.len());
        for status in &o.completed {
            println!("   {}", status);
        }
        println!();
        println!("⏳ In progress ({})", o.incomplete.len());
        for status in &o.incomplete {
            println!("   {}", status);
        }
    })
}

pub async fn history(
    ctx: &ServiceContext,
    out: &Output,
    week: Option<String>,
    member: Option<String>,
) -> Result<()> {
    let week_id = week.unwrap_or_else(|| ctx.current_week().week_id);
    let mut events = VerificationLedger::new(ctx).events_for_week(&week_id).await?;
    if let Some(member) = member {
        let member = MemberId::from(member);
        events.retain(|e| e.member_id == member);
    }

    out.render(&events, |events| {
        println!("📜 Verifications for {} ({})", week_id, events.len());
        for event in events {
            println!("   {}", event);
            if let Some(url) = &event.evidence_url {
                println!("      {}", url);
            }
        }
    })
}

pub fn print_outcome(outcome: &CloseOutcome) {
    match outcome {
        CloseOutcome::AlreadyClosed { week_id } => {
            println!("ℹ️  Week {} was already closed; nothing charged", week_id);
        }
        CloseOutcome::Closed {
            week_id,
            shortfalls,
        } if shortfalls.is_empty() => {
            println!("🎉 Week {} closed: everyone completed their sessions!", week_id);
        }
        CloseOutcome::Closed {
            week_id,
            shortfalls,
        } => {
            println!("🔒 Week {} closed", week_id);
            for s in shortfalls {
                println!(
                    "   {} ({}): {} missed -> {}",
                    s.display_name,
                    s.member_id,
                    s.missed,
                    format_amount(s.penalty)
                );
            }
            println!("   Total: {}", format_amount(outcome.total_penalty()));
        }
    }
}

pub async fn closeout(ctx: &ServiceContext, out: &Output, week: Option<String>) -> Result<()> {
    let service = AccountabilityService::new(ctx);
    let outcome = match week {
        Some(week_id) => service.close_week(&week_id).await?,
        None => service.run_weekly_closeout().await?,
    };

    out.render(&outcome, print_outcome)
}
