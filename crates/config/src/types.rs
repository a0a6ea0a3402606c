//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitledgerConfig {
    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Weekly quota and fines
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Timezone, week boundary and blackout hours
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Ledger storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Weekly close-out trigger
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Per-exercise rules, keyed by exercise name
    #[serde(default = "default_exercise_rules")]
    pub exercise_rules: BTreeMap<String, ExerciseRule>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FitledgerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            policy: PolicyConfig::default(),
            calendar: CalendarConfig::default(),
            store: StoreConfig::default(),
            scheduler: SchedulerConfig::default(),
            exercise_rules: default_exercise_rules(),
        }
    }
}

/// Weekly quota and fines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Sessions each member must verify per week
    #[serde(default = "default_required_weekly_count")]
    pub required_weekly_count: u32,

    /// Fine per missed session
    #[serde(default = "default_penalty_per_miss")]
    pub penalty_per_miss: u64,
}

fn default_required_weekly_count() -> u32 {
    3
}

fn default_penalty_per_miss() -> u64 {
    5000
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            required_weekly_count: default_required_weekly_count(),
            penalty_per_miss: default_penalty_per_miss(),
        }
    }
}

/// Calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// IANA timezone of the community, e.g. "Asia/Seoul", or a fixed
    /// offset such as "+09:00"
    #[serde(default = "default_timezone", alias = "utc_offset")]
    pub timezone: String,

    /// Weekday the week starts on, e.g. "sunday"
    #[serde(default = "default_week_start")]
    pub week_start: String,

    /// First hour (inclusive) in which reports are refused
    #[serde(default)]
    pub blackout_start_hour: u32,

    /// Hour (exclusive) at which reports are accepted again
    #[serde(default = "default_blackout_end_hour")]
    pub blackout_end_hour: u32,
}

fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}

fn default_week_start() -> String {
    "sunday".to_string()
}

fn default_blackout_end_hour() -> u32 {
    4
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            week_start: default_week_start(),
            blackout_start_hour: 0,
            blackout_end_hour: default_blackout_end_hour(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Limit for every store call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/fitledger.db")
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Local time of day the close-out check runs, "HH:MM"
    #[serde(default = "default_run_at")]
    pub run_at: String,

    /// Weekday the close-out runs on; defaults to `calendar.week_start`
    #[serde(default)]
    pub closeout_weekday: Option<String>,
}

fn default_run_at() -> String {
    "00:00".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_at: default_run_at(),
            closeout_weekday: None,
        }
    }
}

/// Verification guidance for one exercise type.
///
/// Shown to members; never enforced by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRule {
    /// Minimum session length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_minutes: Option<u32>,

    /// Minimum average speed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_speed_kmh: Option<f64>,

    /// Evidence must be a video
    #[serde(default)]
    pub requires_video: bool,

    /// Evidence must show a timestamp
    #[serde(default)]
    pub requires_timestamp: bool,

    /// Minimum calories burned, as shown by the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_kcal: Option<u32>,

    /// Most sessions of this type that count in one week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_week: Option<u32>,
}

fn default_exercise_rules() -> BTreeMap<String, ExerciseRule> {
    let rule = |min_minutes, min_speed_kmh, requires_video, requires_timestamp| ExerciseRule {
        min_minutes: Some(min_minutes),
        min_speed_kmh,
        requires_video,
        requires_timestamp,
        ..Default::default()
    };

    BTreeMap::from([
        ("running".to_string(), rule(15, Some(7.5), false, false)),
        ("cycling".to_string(), rule(30, Some(12.0), false, false)),
        ("home_workout".to_string(), rule(30, None, true, false)),
        ("gym".to_string(), rule(30, None, false, true)),
        ("pilates".to_string(), rule(30, None, false, true)),
        (
            "ring_fit".to_string(),
            ExerciseRule {
                min_kcal: Some(100),
                ..Default::default()
            },
        ),
        (
            "cardio".to_string(),
            ExerciseRule {
                min_kcal: Some(200),
                ..Default::default()
            },
        ),
        (
            "golf".to_string(),
            ExerciseRule {
                max_per_week: Some(1),
                ..Default::default()
            },
        ),
    ])
}
