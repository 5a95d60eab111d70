//! System clock adapter.

use chrono::{DateTime, Utc};

use crate::infrastructure::ports::ClockPort;

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
