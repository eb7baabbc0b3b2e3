//! Raw remote failures and their classified, user-facing form.

use std::fmt;

/// Error payload returned by the publishing API (non-2xx or an `error` envelope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: u32,
    /// Provider error code (`error.code`), if the body carried one.
    pub code: Option<i64>,
    /// Provider error subcode (`error.error_subcode`).
    pub subcode: Option<i64>,
    /// Provider message (`error.message`), or the status line when absent.
    pub message: String,
    /// Explicit wait hint from a `Retry-After` response header.
    pub retry_after_secs: Option<u64>,
    /// Raw response body, kept verbatim for diagnosis.
    pub raw: String,
}

/// Error returned by a single remote call, before classification.
/// Used so we can classify and decide retries before surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (DNS, connect, reset, timeout).
    Network { message: String, timed_out: bool },
    /// The platform answered with an error.
    Api(ApiError),
    /// A 2xx response whose body could not be understood.
    Decode { message: String, body: String },
    /// The request could not be built (bad endpoint, invalid parameter).
    Request(String),
}

impl RemoteError {
    /// Provider error code, when the failure came from the API.
    pub fn code(&self) -> Option<i64> {
        match self {
            RemoteError::Api(api) => api.code,
            _ => None,
        }
    }

    /// HTTP status, when the failure came from the API.
    pub fn status(&self) -> Option<u32> {
        match self {
            RemoteError::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Human-readable message of the failure.
    pub fn message(&self) -> &str {
        match self {
            RemoteError::Network { message, .. } => message,
            RemoteError::Api(api) => &api.message,
            RemoteError::Decode { message, .. } => message,
            RemoteError::Request(message) => message,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Network { message, timed_out } => {
                if *timed_out {
                    write!(f, "network timeout: {}", message)
                } else {
                    write!(f, "network: {}", message)
                }
            }
            RemoteError::Api(api) => match api.code {
                Some(code) => write!(f, "HTTP {} (code {}): {}", api.status, code, api.message),
                None => write!(f, "HTTP {}: {}", api.status, api.message),
            },
            RemoteError::Decode { message, .. } => write!(f, "undecodable response: {}", message),
            RemoteError::Request(message) => write!(f, "invalid request: {}", message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Closed set of actionable error kinds surfaced by the saga.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifiedError {
    /// Input rejected before any remote call.
    #[error("invalid carousel: {0}")]
    Validation(String),
    /// Network failure, timeout or 5xx; retried within budget.
    #[error("transient failure: {0}")]
    Transient(String),
    /// The platform throttled the account.
    #[error(
        "rate limited by the platform{}",
        .retry_after_secs.map(|s| format!(" (retry after {s}s)")).unwrap_or_default()
    )]
    RateLimited { retry_after_secs: Option<u64> },
    /// Access token is no longer valid (provider code 190).
    #[error("access token expired")]
    ExpiredAuth,
    /// Token lacks the permission to publish (provider code 9).
    #[error("permission denied by the platform")]
    PermissionDenied,
    /// Anything else; carries the raw provider payload.
    #[error("unexpected platform error: {raw}")]
    Unknown { raw: String },
}

impl ClassifiedError {
    /// Terminal errors skip the retry loop entirely.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClassifiedError::Validation(_)
                | ClassifiedError::ExpiredAuth
                | ClassifiedError::PermissionDenied
        )
    }

    /// Actionable hint shown to the user instead of a raw provider code.
    pub fn remediation(&self) -> &'static str {
        match self {
            ClassifiedError::Validation(_) => "fix the carousel items and publish again",
            ClassifiedError::Transient(_) => {
                "the platform could not be reached; try again in a few minutes"
            }
            ClassifiedError::RateLimited { .. } => {
                "the account hit the platform rate limit; wait before publishing again"
            }
            ClassifiedError::ExpiredAuth => "access token expired; reconnect the account",
            ClassifiedError::PermissionDenied => {
                "the account lacks publishing permission; reconnect it and grant content publishing access"
            }
            ClassifiedError::Unknown { .. } => {
                "the platform rejected the request; see the raw error for details"
            }
        }
    }
}
