//! Retry and backoff policy.
//!
//! This module encapsulates error classification (expired auth, permission
//! denied, throttling, transient network failures) and exponential backoff
//! decisions so that every remote step of the publish saga shares one retry
//! primitive, parameterized by a per-step [`BackoffConfig`].

mod classify;
mod error;
mod policy;
mod run;
mod sleep;

pub use classify::{classify, classify_http_status, extract_retry_after_seconds, is_rate_limit};
pub use error::{ApiError, ClassifiedError, RemoteError};
pub use policy::{BackoffConfig, RetryDecision, RetrySchedule};
pub use run::run_with_retry;
pub use sleep::{FixedJitter, Jitter, RandJitter, RetryContext, Sleeper, TokioSleeper};
