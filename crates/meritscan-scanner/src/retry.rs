//! Retry budget and backoff schedule for one candidate.

use meritscan_core::ScanningConfig;
use rand::Rng;
use std::time::Duration;

/// How many attempts a candidate gets and how long to wait between
/// transient failures.
///
/// Rejected answers retry immediately; only transport, solver and timeout
/// failures wait for [`RetryPolicy::delay_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay after the first transient failure
    pub initial_delay: Duration,
    /// Upper bound for the exponential delay
    pub max_delay: Duration,
    /// Growth factor per transient failure
    pub multiplier: f64,
    /// Randomize delays between 1x and 2x
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScanningConfig::default())
    }
}

impl RetryPolicy {
    /// Build the policy from the scanning section of the configuration.
    #[must_use]
    pub fn from_config(config: &ScanningConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.backoff_initial_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
            multiplier: config.backoff_multiplier,
            jitter: config.jitter,
        }
    }

    /// A policy with `max_retries` and no waiting at all.
    #[must_use]
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Total attempts allowed per candidate.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retrying after the `failures`-th transient failure
    /// (zero-based).
    #[must_use]
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        // Out-of-range or NaN values saturate at the cap.
        let delay = Duration::try_from_secs_f64(secs)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay));

        if self.jitter {
            add_jitter(delay)
        } else {
            delay
        }
    }
}

/// Stretch `delay` by a uniform factor in `[1, 2]`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(jitter: bool) -> RetryPolicy {
        RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            multiplier: 2.0,
            jitter,
        }
    }

    #[test]
    fn test_exponential_delays_are_capped() {
        let policy = policy(false);
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(1000));
    }

    #[test]
    fn test_delays_past_float_range_saturate() {
        let policy = RetryPolicy {
            max_retries: 100,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(policy.delay_for(63), Duration::from_secs(10));
        assert_eq!(policy.delay_for(64), Duration::from_secs(10));
        assert_eq!(policy.delay_for(70), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1_000), Duration::from_secs(10));

        let jittered = RetryPolicy {
            jitter: true,
            ..policy
        };
        let delay = jittered.delay_for(70);
        assert!(delay >= Duration::from_secs(10));
        assert!(delay <= Duration::from_secs(20));
    }

    #[test]
    fn test_jitter_stays_within_double() {
        let jittered_policy = policy(true);
        let plain_policy = policy(false);
        for failures in 0..4 {
            let base = plain_policy.delay_for(failures);
            let jittered = jittered_policy.delay_for(failures);
            assert!(jittered >= base);
            assert!(jittered <= base * 2);
        }
    }

    #[test]
    fn test_attempts_include_first_try() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::immediate(5).max_attempts(), 6);
        assert_eq!(RetryPolicy::immediate(3).delay_for(2), Duration::ZERO);
    }

    #[test]
    fn test_from_default_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert!(policy.jitter);
    }
}
