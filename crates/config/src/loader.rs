//! Configuration loader and validation

use chrono::{NaiveTime, Weekday};
use fitledger_core::{BlackoutWindow, LocalZone, PenaltyPolicy, WeekCalendar};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::types::FitledgerConfig;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("config file not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
}

/// Validated configuration plus the values derived from it
pub struct ConfigLoader {
    config: Arc<FitledgerConfig>,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader with built-in defaults
    pub fn new() -> Self {
        Self {
            config: Arc::new(FitledgerConfig::default()),
            config_path: None,
        }
    }

    /// Load configuration from file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: FitledgerConfig = toml::from_str(&content)?;
        Self::validate(&config)?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(Self {
            config: Arc::new(config),
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_file(&path) {
            Err(ConfigError::NotFound(_)) => Ok(Self::new()),
            other => other,
        }
    }

    /// Load configuration from string
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: FitledgerConfig = toml::from_str(content)?;
        Self::validate(&config)?;

        Ok(Self {
            config: Arc::new(config),
            config_path: None,
        })
    }

    /// Current configuration
    #[inline]
    pub fn get(&self) -> Arc<FitledgerConfig> {
        Arc::clone(&self.config)
    }

    /// File the configuration came from, if any
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Penalty policy described by `[policy]`
    pub fn policy(&self) -> Result<PenaltyPolicy, ConfigError> {
        policy_from(&self.config)
    }

    /// Week calendar described by `[calendar]`
    pub fn calendar(&self) -> Result<WeekCalendar, ConfigError> {
        calendar_from(&self.config)
    }

    /// Weekday the scheduler closes a week on
    pub fn closeout_weekday(&self) -> Result<Weekday, ConfigError> {
        closeout_weekday_from(&self.config)
    }

    /// Local time of day the scheduler wakes up
    pub fn run_at(&self) -> Result<NaiveTime, ConfigError> {
        parse_time(&self.config.scheduler.run_at)
    }

    /// Limit for each store call
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.config.store.timeout_ms)
    }

    /// Validate configuration
    fn validate(config: &FitledgerConfig) -> Result<(), ConfigError> {
        policy_from(config)?;
        calendar_from(config)?;
        closeout_weekday_from(config)?;
        parse_time(&config.scheduler.run_at)?;

        if config.store.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "store.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if config.store.database.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store.database must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn policy_from(config: &FitledgerConfig) -> Result<PenaltyPolicy, ConfigError> {
    PenaltyPolicy::new(
        config.policy.required_weekly_count,
        config.policy.penalty_per_miss,
    )
    .map_err(|e| ConfigError::Validation(format!("policy: {}", e)))
}

fn calendar_from(config: &FitledgerConfig) -> Result<WeekCalendar, ConfigError> {
    let calendar = &config.calendar;
    let zone = LocalZone::parse(&calendar.timezone)
        .map_err(|e| ConfigError::Validation(format!("calendar.timezone: {}", e)))?;
    let week_start = parse_weekday(&calendar.week_start, "calendar.week_start")?;
    let blackout = BlackoutWindow::new(calendar.blackout_start_hour, calendar.blackout_end_hour)
        .map_err(|e| ConfigError::Validation(format!("calendar blackout: {}", e)))?;

    Ok(WeekCalendar::new(zone, week_start, blackout))
}

fn closeout_weekday_from(config: &FitledgerConfig) -> Result<Weekday, ConfigError> {
    match &config.scheduler.closeout_weekday {
        Some(day) => parse_weekday(day, "scheduler.closeout_weekday"),
        None => parse_weekday(&config.calendar.week_start, "calendar.week_start"),
    }
}

fn parse_weekday(value: &str, field: &str) -> Result<Weekday, ConfigError> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| ConfigError::Validation(format!("{}: unknown weekday '{}'", field, value)))
}

fn parse_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        ConfigError::Validation(format!("scheduler.run_at: expected HH:MM, got '{}'", value))
    })
}
