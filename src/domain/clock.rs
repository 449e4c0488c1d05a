use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Source of "now" for every time-dependent rule of the requester.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn get_current_time_in_ms(&self) -> i64;

    fn get_current_time_in_s(&self) -> i64 {
        self.get_current_time_in_ms().div_euclid(1000)
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.get_current_time_in_ms()).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn get_current_time_in_ms(&self) -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_millis() as i64
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct MockClock {
    time_ms: Arc<RwLock<i64>>,
}

impl MockClock {
    pub fn new(time_in_s: i64) -> MockClock {
        MockClock { time_ms: Arc::new(RwLock::new(time_in_s * 1000)) }
    }

    pub fn set_current_time(&self, time_in_s: i64) {
        *self.time_ms.write().unwrap_or_else(PoisonError::into_inner) = time_in_s * 1000;
    }

    pub fn advance(&self, seconds: i64) {
        *self.time_ms.write().unwrap_or_else(PoisonError::into_inner) += seconds * 1000;
    }
}

impl Clock for MockClock {
    fn get_current_time_in_ms(&self) -> i64 {
        *self.time_ms.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_is_shared_between_clones() {
        let clock = MockClock::new(1_000);
        let other = clock.clone();

        other.advance(60);

        assert_eq!(clock.get_current_time_in_s(), 1_060);
        assert_eq!(clock.now().timestamp(), 1_060);
    }
}
