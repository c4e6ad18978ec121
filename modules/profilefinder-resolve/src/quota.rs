use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::traits::{QuotaGate, QuotaUsage};

struct Counter {
    date: NaiveDate,
    count: u32,
}

/// In-memory daily counter, reset when the local date rolls over.
///
/// Check and increment happen under one lock, so concurrent requests can
/// never overshoot the limit.
pub struct DailyQuota {
    max: u32,
    today: fn() -> NaiveDate,
    counter: Mutex<Counter>,
}

impl DailyQuota {
    pub fn new(max: u32) -> Self {
        Self::with_clock(max, || Local::now().date_naive())
    }

    pub fn with_clock(max: u32, today: fn() -> NaiveDate) -> Self {
        Self {
            max,
            today,
            counter: Mutex::new(Counter {
                date: today(),
                count: 0,
            }),
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Counter> {
        let mut counter = self.counter.lock().unwrap_or_else(|e| e.into_inner());
        let today = (self.today)();
        if counter.date != today {
            counter.date = today;
            counter.count = 0;
        }
        counter
    }
}

impl QuotaGate for DailyQuota {
    fn check_and_reserve(&self) -> bool {
        let mut counter = self.lock_current();
        if counter.count >= self.max {
            return false;
        }
        counter.count += 1;
        true
    }

    fn record(&self, query: &str, found: bool) {
        let counter = self.lock_current();
        info!(
            query,
            found,
            "Processed {}/{} searches today",
            counter.count,
            self.max
        );
    }

    fn usage(&self) -> QuotaUsage {
        let counter = self.lock_current();
        QuotaUsage {
            count: counter.count,
            max: self.max,
            date: counter.date,
        }
    }
}
