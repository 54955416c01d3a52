use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

/// Fixed-delay retry around an operation against a slow-starting service.
///
/// One policy replaces the per-call-site sleep loops this grew out of: an
/// initial grace period, then up to `max_attempts` tries spaced `delay`
/// apart. The final attempt's error is surfaced unchanged.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub grace: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            grace: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn run<T, E, F>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        if !self.grace.is_zero() {
            info!(what, grace_secs = self.grace.as_secs(), "waiting for service readiness");
            thread::sleep(self.grace);
        }

        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        what,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
