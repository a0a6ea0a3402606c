//! Fitledger Config - Configuration management
//!
//! TOML file with per-field defaults; every section is optional.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::{
    CalendarConfig, ExerciseRule, FitledgerConfig, PolicyConfig, SchedulerConfig, StoreConfig,
};
