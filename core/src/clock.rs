//! Reference clock: the single "now" a batch is generated against.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceClock {
    now: NaiveDateTime,
}

impl ReferenceClock {
    /// Current UTC time, truncated to whole seconds.
    pub fn system() -> Self {
        Self::fixed(Utc::now())
    }

    /// Pin the clock to `at`. Sub-second precision is dropped so that
    /// every timestamp derived from it serializes without a fraction.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        let naive = at.naive_utc();
        let now = naive.with_nanosecond(0).unwrap_or(naive);
        Self { now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::system()
    }
}
