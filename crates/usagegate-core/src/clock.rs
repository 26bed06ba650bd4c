//! Day boundary source for daily quota rollover
//!
//! Day keys are `chrono::NaiveDate` values of the client's local calendar
//! day. They serialize as `YYYY-MM-DD`, compare chronologically and change
//! exactly once per local day.

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;

/// Supplies "today" as a comparable day key
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Host wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for deterministic rollover in tests and simulations
#[derive(Debug)]
pub struct ManualClock {
    day: RwLock<NaiveDate>,
}

impl ManualClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: RwLock::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        *self.day.write() = day;
    }

    /// Move the clock forward (or backward, with a negative count)
    pub fn advance_days(&self, days: i64) {
        let mut day = self.day.write();
        *day += chrono::Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.day.read()
    }
}
