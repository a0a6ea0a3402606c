//! Command handlers and output helpers

pub mod member;
pub mod week;

use anyhow::Result;
use fitledger_config::{ConfigLoader, ExerciseRule};
use fitledger_core::{PenaltyPolicy, WeekCalendar};
use serde::Serialize;
use std::collections::BTreeMap;

/// Human-readable or JSON output, chosen by `--json`
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as pretty JSON, or hand it to `human`
    pub fn render<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }

    /// Plain status line; suppressed in JSON mode
    pub fn message(&self, text: &str) {
        if !self.json {
            println!("{}", text);
        }
    }
}

/// `5000` -> `5,000`
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Serialize)]
struct PolicyView<'a> {
    required_weekly_count: u32,
    penalty_per_miss: u64,
    timezone: String,
    week_start: String,
    blackout: String,
    closeout: String,
    exercise_rules: &'a BTreeMap<String, ExerciseRule>,
}

fn describe_rule(rule: &ExerciseRule) -> String {
    let mut parts = Vec::new();
    if let Some(minutes) = rule.min_minutes {
        parts.push(format!("{}+ min", minutes));
    }
    if let Some(speed) = rule.min_speed_kmh {
        parts.push(format!("{} km/h+", speed));
    }
    if rule.requires_video {
        parts.push("video".to_string());
    }
    if rule.requires_timestamp {
        parts.push("timestamp photo".to_string());
    }
    if let Some(kcal) = rule.min_kcal {
        parts.push(format!("{}+ kcal", kcal));
    }
    if let Some(cap) = rule.max_per_week {
        parts.push(format!("counts at most {}x/week", cap));
    }
    parts.join(", ")
}

/// Show the active policy and exercise rules
pub fn show_policy(config: &ConfigLoader, out: &Output) -> Result<()> {
    let policy: PenaltyPolicy = config.policy()?;
    let calendar: WeekCalendar = config.calendar()?;
    let cfg = config.get();

    let view = PolicyView {
        required_weekly_count: policy.required_weekly_count,
        penalty_per_miss: policy.penalty_per_miss,
        timezone: calendar.zone.to_string(),
        week_start: format!("{:?}", calendar.week_start),
        blackout: format!(
            "{:02}:00-{:02}:00",
            calendar.blackout.start_hour, calendar.blackout.end_hour
        ),
        closeout: format!("{:?} {}", config.closeout_weekday()?, config.run_at()?.format("%H:%M")),
        exercise_rules: &cfg.exercise_rules,
    };

    out.render(&view, |v| {
        println!("📋 Policy");
        println!("   Required sessions/week: {}", v.required_weekly_count);
        println!("   Penalty per miss:       {}", format_amount(v.penalty_per_miss));
        println!("   Timezone:               {}", v.timezone);
        println!("   Week starts:            {}", v.week_start);
        println!("   No reports between:     {}", v.blackout);
        println!("   Weekly close-out:       {}", v.closeout);
        if !v.exercise_rules.is_empty() {
            println!();
            println!("🏃 Exercise rules");
            for (name, rule) in v.exercise_rules {
                println!("   {:<14} {}", name, describe_rule(rule));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(500), "500");
        assert_eq!(format_amount(5000), "5,000");
        assert_eq!(format_amount(1234567), "1,234,567");
    }

    #[test]
    fn test_describe_rule() {
        let rule = ExerciseRule {
            min_minutes: Some(15),
            min_speed_kmh: Some(7.5),
            ..Default::default()
        };
        assert_eq!(describe_rule(&rule), "15+ min, 7.5 km/h+");

        let rule = ExerciseRule {
            min_minutes: Some(30),
            requires_video: true,
            ..Default::default()
        };
        assert_eq!(describe_rule(&rule), "30+ min, video");

        let rule = ExerciseRule {
            min_kcal: Some(200),
            ..Default::default()
        };
        assert_eq!(describe_rule(&rule), "200+ kcal");

        let rule = ExerciseRule {
            max_per_week: Some(1),
            ..Default::default()
        };
        assert_eq!(describe_rule(&rule), "counts at most 1x/week");
    }
}
