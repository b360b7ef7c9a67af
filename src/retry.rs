use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    pub fn new(max_attempts: u32, backoff_min: Duration, backoff_max: Duration) -> Self {
        Self {
            max_attempts,
            backoff_min,
            backoff_max,
        }
    }

    // Randomized within the window so competing registrars desynchronize.
    pub fn backoff(&self) -> Duration {
        if self.backoff_max <= self.backoff_min {
            return self.backoff_min;
        }
        let span = (self.backoff_max - self.backoff_min).as_millis() as u64;
        let jitter = rand::thread_rng().gen_range(0..=span);
        self.backoff_min + Duration::from_millis(jitter)
    }

    pub fn wait(&self, operation: &'static str, attempt: u32) {
        let delay = self.backoff();
        debug!(operation, attempt, ?delay, "backing off before retry");
        thread::sleep(delay);
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            backoff_min: Duration::from_secs(10),
            backoff_max: Duration::from_secs(20),
        }
    }
}
