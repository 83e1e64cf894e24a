//! Wall-clock source for the session.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { millis: Rc::new(Cell::new(start.timestamp_millis())) }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.set(self.millis.get() + by.num_milliseconds());
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.set(at.timestamp_millis());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.get()).unwrap_or_default()
    }
}
