use std::time::Duration;

/// Default wait before the first status check.
pub const DEFAULT_BACKOFF_MIN: Duration = Duration::from_millis(1000);

/// Ceiling for the wait between status checks.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_millis(3000);

/// Delay policy between successive stage polls.
///
/// The delay doubles every five attempts, starting at `min` and capped at `max`:
/// `clamp(min * 2^(attempt / 5), min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    min: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min: DEFAULT_BACKOFF_MIN,
            max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl Backoff {
    /// Build a policy. A `max` below `min` is raised to `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Wait before poll number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let min_ms = self.min.as_secs_f64() * 1000.0;
        let max_ms = self.max.as_secs_f64() * 1000.0;

        // powf saturates to infinity for huge attempts (NaN when min is zero)
        let grown = min_ms * 2f64.powf(attempt as f64 / 5.0);
        if !grown.is_finite() || grown >= max_ms {
            return self.max;
        }

        Duration::from_secs_f64(grown.max(min_ms) / 1000.0)
    }
}
