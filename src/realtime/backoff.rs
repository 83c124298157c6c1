//! Exponential backoff for WebSocket reconnection

use std::time::Duration;

use rand::Rng;

/// Exponential backoff configuration
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first reconnect, in milliseconds
    pub base_delay_ms: u64,
    /// Reconnects allowed before giving up
    pub max_attempts: u32,
    /// Jitter factor (0.0 to 1.0); zero keeps the schedule exact
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_attempts: 10,
            jitter_factor: 0.0,
        }
    }
}

/// Yields `base * 2^attempt` until the attempt cap is reached
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    attempt: u32,
}

impl ExponentialBackoff {
    pub fn new() -> Self {
        Self::with_config(BackoffConfig::default())
    }

    /// Start a schedule at attempt 0
    pub fn with_config(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Delay before the next attempt, or `None` once the cap is reached
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_attempts {
            return None;
        }

        let factor = 1u64.checked_shl(self.attempt).unwrap_or(u64::MAX);
        let base_delay = self.config.base_delay_ms.saturating_mul(factor);
        self.attempt += 1;

        let final_delay = if self.config.jitter_factor > 0.0 {
            let jitter_range = base_delay as f64 * self.config.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (base_delay as f64 + jitter).max(1.0) as u64
        } else {
            base_delay
        };

        Some(Duration::from_millis(final_delay))
    }

    /// Reset to the initial state (after a successful open)
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Attempts scheduled since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether every allowed attempt has been handed out
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.config.max_attempts
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(base_delay_ms: u64, max_attempts: u32) -> ExponentialBackoff {
        ExponentialBackoff::with_config(BackoffConfig {
            base_delay_ms,
            max_attempts,
            jitter_factor: 0.0,
        })
    }

    #[test]
    fn test_delays_double_until_cap() {
        let mut backoff = exact(1000, 10);
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays.len(), 10);
        for (n, delay) in delays.iter().enumerate() {
            assert_eq!(*delay, 1000 * 2u64.pow(n as u32));
        }
        assert!(delays.windows(2).all(|w| w[1] > w[0]));
        assert!(backoff.next_delay().is_none());
        assert!(backoff.is_exhausted());
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut backoff = exact(100, 5);
        backoff.next_delay();
        backoff.next_delay();
        backoff.next_delay();

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_zero_attempts_never_reconnects() {
        let mut backoff = exact(100, 0);
        assert!(backoff.next_delay().is_none());
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut backoff = ExponentialBackoff::with_config(BackoffConfig {
            base_delay_ms: 1000,
            max_attempts: 3,
            jitter_factor: 0.1,
        });
        let first = backoff.next_delay().unwrap().as_millis();
        assert!((900..=1100).contains(&first));
    }

    #[test]
    fn test_large_attempt_counts_saturate() {
        let mut backoff = exact(1000, 100);
        for _ in 0..99 {
            backoff.next_delay();
        }
        assert!(backoff.next_delay().is_some());
    }
}
