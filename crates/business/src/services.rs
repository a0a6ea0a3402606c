//! Service context
//!
//! Everything a business operation needs: the store handle, policy,
//! calendar and clock. Built once at startup and borrowed by each service.

use fitledger_core::{Clock, PenaltyPolicy, SystemClock, WeekCalendar, WeekWindow};
use fitledger_persistence::{Database, TableStore};
use std::sync::Arc;

/// Context for business operations
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn TableStore>,
    policy: PenaltyPolicy,
    calendar: WeekCalendar,
    clock: Arc<dyn Clock>,
}

impl ServiceContext {
    /// Context over an opened database using the system clock
    pub fn new(db: &Database, policy: PenaltyPolicy, calendar: WeekCalendar) -> Self {
        Self::from_parts(db.store(), policy, calendar, Arc::new(SystemClock))
    }

    pub fn from_parts(
        store: Arc<dyn TableStore>,
        policy: PenaltyPolicy,
        calendar: WeekCalendar,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            calendar,
            clock,
        }
    }

    /// Same context, different clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &dyn TableStore {
        self.store.as_ref()
    }

    pub fn policy(&self) -> &PenaltyPolicy {
        &self.policy
    }

    pub fn calendar(&self) -> &WeekCalendar {
        &self.calendar
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Week containing "now"
    pub fn current_week(&self) -> WeekWindow {
        self.calendar.current_week(self.clock())
    }

    /// Week that ended right before the current one
    pub fn previous_week(&self) -> WeekWindow {
        self.calendar.previous_week(self.clock())
    }
}
