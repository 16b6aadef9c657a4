//! Unit tests for the task module.

mod domain_tests;
mod service_tests;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub(super) struct FixedClock(pub(super) DateTime<Utc>);

impl FixedClock {
    pub(super) fn at_noon() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
                .single()
                .expect("valid fixed timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
