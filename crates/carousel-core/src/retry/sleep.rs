//! Injectable sleeping and jitter so retry loops run without real delays in tests.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Suspends the current task for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Source of jitter samples in [0, 1).
pub trait Jitter: Send + Sync {
    fn sample(&self) -> f64;
}

/// Thread-local RNG jitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandJitter;

impl Jitter for RandJitter {
    fn sample(&self) -> f64 {
        rand::rng().random_range(0.0..1.0)
    }
}

/// Constant jitter sample, for deterministic schedules.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Scheduler handed to every retry loop and saga step.
#[derive(Clone)]
pub struct RetryContext {
    pub sleeper: Arc<dyn Sleeper>,
    pub jitter: Arc<dyn Jitter>,
}

impl RetryContext {
    pub fn new(sleeper: Arc<dyn Sleeper>, jitter: Arc<dyn Jitter>) -> Self {
        Self { sleeper, jitter }
    }

    /// Real timer and random jitter.
    pub fn tokio() -> Self {
        Self::new(Arc::new(TokioSleeper), Arc::new(RandJitter))
    }

    pub async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            self.sleeper.sleep(duration).await;
        }
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::tokio()
    }
}

impl std::fmt::Debug for RetryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryContext").finish_non_exhaustive()
    }
}
