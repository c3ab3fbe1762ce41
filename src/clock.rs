//! Wall-clock time source.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time.
///
/// Closures returning a [`SystemTime`] implement this trait, which is
/// convenient for pinning the time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<F: Fn() -> SystemTime + Send + Sync> Clock for F {
    fn now(&self) -> SystemTime {
        self()
    }
}

/// Converts a time into Unix seconds, as used in the `exp` and `iat` claims.
///
/// Times before the epoch are negative.
#[must_use]
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |secs| -secs),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::{Clock, unix_seconds};

    #[test]
    fn test_unix_seconds() {
        assert_eq!(unix_seconds(UNIX_EPOCH), 0);
        assert_eq!(
            unix_seconds(UNIX_EPOCH + Duration::from_millis(1_700_000_000_999)),
            1_700_000_000
        );
        assert_eq!(unix_seconds(UNIX_EPOCH - Duration::from_secs(5)), -5);
    }

    #[test]
    fn test_closure_clock() {
        let fixed = UNIX_EPOCH + Duration::from_secs(42);
        let clock = move || fixed;

        assert_eq!(clock.now(), fixed);
    }
}
