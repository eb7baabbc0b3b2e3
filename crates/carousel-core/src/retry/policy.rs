use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ClassifiedError;

/// Exponential backoff profile for one remote step.
///
/// Each saga step (container creation, carousel assembly, publish) carries its
/// own profile so that the expensive publish call can retry longer than the
/// per-item calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on the exponential part of the delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Retries allowed after the first call.
    pub max_retries: u32,
    /// Additive jitter as a fraction of the delay (0.0..=1.0).
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::container()
    }
}

impl BackoffConfig {
    /// Per-item container creation: moderate retries, moderate delay.
    pub fn container() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            max_retries: 3,
            jitter_factor: 0.1,
        }
    }

    /// Single carousel assembly call.
    pub fn assembly() -> Self {
        Self {
            base_delay_ms: 2_000,
            max_delay_ms: 15_000,
            max_retries: 3,
            jitter_factor: 0.1,
        }
    }

    /// Publish call: most retries and most jitter.
    pub fn publish() -> Self {
        Self {
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            max_retries: 5,
            jitter_factor: 0.25,
        }
    }

    /// Copy with `jitter_factor` clamped into [0, 1] and `max >= base`.
    pub fn normalized(&self) -> Self {
        let jitter_factor = if self.jitter_factor.is_finite() {
            self.jitter_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms.max(self.base_delay_ms),
            max_retries: self.max_retries,
            jitter_factor,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    ///
    /// `min(base * 2^attempt, max)` plus `delay * jitter_factor * unit`, where
    /// `unit` is a sample in [0, 1). Pure: the caller supplies the sample.
    pub fn compute_delay(&self, attempt: u32, unit: f64) -> Duration {
        let cfg = self.normalized();
        let factor = 1u64 << attempt.min(32);
        let exponential = cfg.base_delay_ms.saturating_mul(factor).min(cfg.max_delay_ms);
        let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
        let jitter = exponential as f64 * cfg.jitter_factor * unit;
        Duration::from_millis(exponential) + Duration::from_secs_f64(jitter / 1_000.0)
    }
}

/// Decision returned by the retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Retry state for one remote call: how much budget is spent and how far the
/// exponential schedule has advanced.
///
/// The two counters diverge when the provider dictates the wait: such a retry
/// spends budget without growing the exponential delay.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    config: BackoffConfig,
    attempt: u32,
    backoff_step: u32,
}

impl RetrySchedule {
    pub fn new(config: &BackoffConfig) -> Self {
        Self {
            config: config.normalized(),
            attempt: 0,
            backoff_step: 0,
        }
    }

    /// Retries spent so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Decide what to do after `error`; `unit` is the jitter sample.
    pub fn decide(&mut self, error: &ClassifiedError, unit: f64) -> RetryDecision {
        if error.is_terminal() || self.attempt >= self.config.max_retries {
            return RetryDecision::NoRetry;
        }

        if let ClassifiedError::RateLimited {
            retry_after_secs: Some(secs),
        } = error
        {
            self.attempt += 1;
            return RetryDecision::RetryAfter(Duration::from_secs(*secs));
        }

        let delay = self.config.compute_delay(self.backoff_step, unit);
        self.attempt += 1;
        self.backoff_step = self.backoff_step.saturating_add(1);
        RetryDecision::RetryAfter(delay)
    }
}
