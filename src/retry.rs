//! Retry policy for network operations: exponential backoff with jitter.

use anyhow::Result;
use rand::Rng;
use std::fmt;
use std::time::Duration;

use crate::transport::TransportError;

/// Default total number of attempts before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default multiplier applied to the delay after each failed attempt.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Retry configuration, fixed at client construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy, validating its invariants.
    ///
    /// `max_retries` is the total attempt budget: 1 means a single attempt
    /// and no retries.
    pub fn new(max_retries: u32, initial_delay: Duration, backoff_factor: f64) -> Result<Self> {
        if max_retries < 1 {
            anyhow::bail!("max_retries must be at least 1");
        }
        if backoff_factor < 1.0 {
            anyhow::bail!("backoff_factor must be at least 1");
        }
        Ok(Self {
            max_retries,
            initial_delay,
            backoff_factor,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    ///
    /// Grows exponentially in the number of prior failures, with up to one
    /// second of uniform jitter added to desynchronize concurrent retriers.
    pub fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1);
        let backoff = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent as i32);
        let jitter = rand::thread_rng().gen_range(0.0..1.0);
        Duration::from_secs_f64(backoff + jitter)
    }
}

/// Terminal error raised once the retry budget is exhausted.
///
/// Chains the last transport failure as its source for diagnostics.
#[derive(Debug)]
pub struct NetworkError {
    attempts: u32,
    source: TransportError,
}

impl NetworkError {
    pub(crate) fn new(attempts: u32, source: TransportError) -> Self {
        Self { attempts, source }
    }

    /// Number of attempts performed before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request failed after {} attempt{}: {}",
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            self.source
        )
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
