//! Retry loop: run a remote call until success or the schedule says stop.

use std::future::Future;

use super::classify;
use super::error::{ClassifiedError, RemoteError};
use super::policy::{BackoffConfig, RetryDecision, RetrySchedule};
use super::sleep::RetryContext;

/// Runs `f` until it succeeds or the retry schedule gives up.
///
/// Every failure is classified first. Terminal kinds return immediately; an
/// explicit provider wait hint is slept verbatim; anything else sleeps the
/// exponential delay for the current step of `config`. The returned error is
/// the classification of the last failure.
pub async fn run_with_retry<T, F, Fut>(
    ctx: &RetryContext,
    config: &BackoffConfig,
    op: &str,
    mut f: F,
) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut schedule = RetrySchedule::new(config);
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let kind = classify::classify(&e);
                match schedule.decide(&kind, ctx.jitter.sample()) {
                    RetryDecision::NoRetry => {
                        tracing::debug!(
                            op,
                            retries = schedule.attempt(),
                            error = %e,
                            "giving up"
                        );
                        return Err(kind);
                    }
                    RetryDecision::RetryAfter(delay) => {
                        tracing::warn!(
                            op,
                            retry = schedule.attempt(),
                            max_retries = config.max_retries,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %e,
                            "remote call failed, retrying"
                        );
                        ctx.sleep(delay).await;
                    }
                }
            }
        }
    }
}
