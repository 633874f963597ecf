use std::time::Duration;

/// How often and how many times a step is ticked before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub interval: Duration,
    pub max_retries: u32,
}

impl BackoffConfig {
    pub const fn new(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
        }
    }

    /// Longest time a step can spend sleeping between ticks.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_retries.saturating_sub(1)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 30)
    }
}
