//! Classify remote failures into retry-relevant error kinds.

use super::error::{ClassifiedError, RemoteError};

/// Provider code for an invalid or expired access token.
pub(crate) const CODE_EXPIRED_TOKEN: i64 = 190;
/// Provider code for a permission the token does not hold.
pub(crate) const CODE_PERMISSION_DENIED: i64 = 9;
/// Provider code for application-level throttling.
pub(crate) const CODE_RATE_LIMIT: i64 = 4;

/// Other throttling codes the platform uses (user, page and custom limits).
const OTHER_RATE_LIMIT_CODES: [i64; 3] = [17, 32, 613];

const RATE_LIMIT_VOCABULARY: [&str; 6] = [
    "rate limit",
    "rate-limit",
    "ratelimit",
    "too many requests",
    "request limit",
    "throttl",
];

/// Markers after which a provider message may state how long to wait.
const WAIT_MARKERS: [&str; 4] = ["retry after", "retry-after", "try again in", "wait"];

/// Classify an HTTP status code on its own. `None` means the status says nothing.
pub fn classify_http_status(status: u32) -> Option<ClassifiedError> {
    match status {
        429 => Some(ClassifiedError::RateLimited {
            retry_after_secs: None,
        }),
        408 | 500..=599 => Some(ClassifiedError::Transient(format!("HTTP {}", status))),
        _ => None,
    }
}

/// True if the failure represents a rate-limit condition.
pub fn is_rate_limit(e: &RemoteError) -> bool {
    match e {
        RemoteError::Api(api) => {
            if api.status == 429 {
                return true;
            }
            if let Some(code) = api.code {
                if code == CODE_RATE_LIMIT || OTHER_RATE_LIMIT_CODES.contains(&code) {
                    return true;
                }
            }
            mentions_rate_limit(&api.message)
        }
        RemoteError::Network { .. } | RemoteError::Decode { .. } | RemoteError::Request(_) => {
            false
        }
    }
}

/// Explicit wait hint carried by the failure: the `Retry-After` header if
/// present, otherwise a "retry after N seconds" style phrase in the message.
pub fn extract_retry_after_seconds(e: &RemoteError) -> Option<u64> {
    match e {
        RemoteError::Api(api) => api
            .retry_after_secs
            .or_else(|| wait_hint_from_message(&api.message)),
        _ => None,
    }
}

/// Classify a remote failure into a [`ClassifiedError`].
pub fn classify(e: &RemoteError) -> ClassifiedError {
    match e {
        RemoteError::Api(api) => {
            match api.code {
                Some(CODE_EXPIRED_TOKEN) => return ClassifiedError::ExpiredAuth,
                Some(CODE_PERMISSION_DENIED) => return ClassifiedError::PermissionDenied,
                _ => {}
            }
            if is_rate_limit(e) {
                return ClassifiedError::RateLimited {
                    retry_after_secs: extract_retry_after_seconds(e),
                };
            }
            let status_kind = classify_http_status(api.status);
            // A server error that states how long to wait is throttling (e.g. 503 + Retry-After).
            if let (Some(ClassifiedError::Transient(_)), Some(secs)) =
                (&status_kind, api.retry_after_secs)
            {
                return ClassifiedError::RateLimited {
                    retry_after_secs: Some(secs),
                };
            }
            match status_kind {
                Some(ClassifiedError::Transient(_)) => ClassifiedError::Transient(e.to_string()),
                _ => ClassifiedError::Unknown {
                    raw: if api.raw.is_empty() {
                        e.to_string()
                    } else {
                        api.raw.clone()
                    },
                },
            }
        }
        RemoteError::Network { .. } => ClassifiedError::Transient(e.to_string()),
        RemoteError::Decode { body, .. } => ClassifiedError::Unknown { raw: body.clone() },
        RemoteError::Request(message) => ClassifiedError::Unknown {
            raw: message.clone(),
        },
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    RATE_LIMIT_VOCABULARY.iter().any(|w| lower.contains(w))
}

/// Find "<marker> [:] N<unit>" in a message.
fn wait_hint_from_message(message: &str) -> Option<u64> {
    let lower = message.to_ascii_lowercase();
    for marker in WAIT_MARKERS {
        let mut rest = lower.as_str();
        while let Some(pos) = rest.find(marker) {
            rest = &rest[pos + marker.len()..];
            if let Some(secs) = leading_duration_secs(rest) {
                return Some(secs);
            }
        }
    }
    None
}

/// `N<unit>` at the start of `s`, in whole seconds (milliseconds round up).
/// A bare number is seconds; an unrecognised unit yields `None`.
fn leading_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim_start_matches(|c: char| c == ' ' || c == ':' || c == '=');
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    let unit: String = s[digits.len()..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    match unit.as_str() {
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => Some(value.div_ceil(1_000)),
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Some(value),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(value.saturating_mul(60)),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(value.saturating_mul(3_600)),
        "d" | "day" | "days" => Some(value.saturating_mul(86_400)),
        _ => None,
    }
}
