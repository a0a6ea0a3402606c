//! Weekly close-out scheduler
//!
//! Wakes once a day at the configured local time and closes the week that
//! just ended when the local weekday is the close-out day. Re-running on the
//! same day is harmless: a closed week is never charged twice.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use fitledger_business::{AccountabilityService, ServiceContext};
use fitledger_config::ConfigLoader;
use fitledger_core::WeekCalendar;

use crate::commands::{week::print_outcome, Output};

/// When the close-out runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub run_at: NaiveTime,
    pub weekday: Weekday,
}

impl Schedule {
    pub fn from_config(config: &ConfigLoader) -> Result<Self> {
        Ok(Self {
            run_at: config.run_at()?,
            weekday: config.closeout_weekday()?,
        })
    }

    /// First `run_at` strictly after `now`, in local time
    pub fn next_run(&self, calendar: &WeekCalendar, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = calendar.local(now);
        let mut date = local.date_naive();
        if local.time() >= self.run_at {
            date += Duration::days(1);
        }

        calendar
            .zone
            .resolve(date.and_time(self.run_at))
            .with_timezone(&Utc)
    }

    pub fn is_closeout_day(&self, calendar: &WeekCalendar, at: DateTime<Utc>) -> bool {
        calendar.local_date(at).weekday() == self.weekday
    }
}

/// Run the close-out if today is the close-out day
async fn tick(ctx: &ServiceContext, out: &Output, schedule: &Schedule) -> Result<()> {
    let now = ctx.clock().now();
    if !schedule.is_closeout_day(ctx.calendar(), now) {
        tracing::debug!(weekday = ?ctx.calendar().local_date(now).weekday(), "not a close-out day");
        out.message("Not a close-out day; nothing to do");
        return Ok(());
    }

    let outcome = AccountabilityService::new(ctx).run_weekly_closeout().await?;
    out.render(&outcome, print_outcome)
}

pub async fn run(ctx: &ServiceContext, out: &Output, schedule: Schedule, once: bool) -> Result<()> {
    if once {
        return tick(ctx, out, &schedule).await;
    }

    tracing::info!(
        run_at = %schedule.run_at.format("%H:%M"),
        weekday = ?schedule.weekday,
        "scheduler started"
    );

    loop {
        let now = ctx.clock().now();
        let next = schedule.next_run(ctx.calendar(), now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(next = %ctx.calendar().local(next), "sleeping until next run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("scheduler stopped");
                return Ok(());
            }
        }

        // A failed run is retried at the next tick, not here.
        if let Err(e) = tick(ctx, out, &schedule).await {
            tracing::error!(error = %e, "scheduled close-out failed");
        }
    }
}
