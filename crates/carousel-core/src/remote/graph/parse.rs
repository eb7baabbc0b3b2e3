//! Parse publishing API responses: success bodies and `error` envelopes.

use serde::Deserialize;
use serde_json::Value;

use super::http::HttpResponse;
use crate::retry::{ApiError, RemoteError};

#[derive(Debug, Deserialize)]
struct Envelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<i64>,
    error_subcode: Option<i64>,
}

/// Turn a raw response into its JSON body, or the matching [`RemoteError`].
///
/// An `error` envelope is an error even on a 2xx status.
pub(crate) fn parse_response(resp: &HttpResponse) -> Result<Value, RemoteError> {
    let text = String::from_utf8_lossy(&resp.body).into_owned();
    let retry_after_secs = retry_after_from_headers(&resp.headers);
    let json: Option<Value> = serde_json::from_str(&text).ok();

    if let Some(value) = &json {
        if let Ok(Envelope { error: Some(body) }) = Envelope::deserialize(value) {
            let message = match (body.message, body.kind) {
                (Some(m), _) => m,
                (None, Some(kind)) => kind,
                (None, None) => format!("HTTP {}", resp.status),
            };
            return Err(RemoteError::Api(ApiError {
                status: resp.status,
                code: body.code,
                subcode: body.error_subcode,
                message,
                retry_after_secs,
                raw: text,
            }));
        }
    }

    if !(200..300).contains(&resp.status) {
        return Err(RemoteError::Api(ApiError {
            status: resp.status,
            code: None,
            subcode: None,
            message: status_message(resp.status, &text),
            retry_after_secs,
            raw: text,
        }));
    }

    json.ok_or_else(|| RemoteError::Decode {
        message: "response body is not JSON".to_string(),
        body: text,
    })
}

/// Extract the `id` field of a success body (string or number).
pub(crate) fn id_from(value: &Value) -> Result<String, RemoteError> {
    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RemoteError::Decode {
            message: "response has no id".to_string(),
            body: value.to_string(),
        }),
    }
}

/// Extract an optional `permalink` field.
pub(crate) fn permalink_from(value: &Value) -> Option<String> {
    value
        .get("permalink")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `Retry-After: <seconds>` from collected header lines (HTTP-date form is ignored).
pub(crate) fn retry_after_from_headers(lines: &[String]) -> Option<u64> {
    lines.iter().rev().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("retry-after") {
            value.trim().parse::<u64>().ok()
        } else {
            None
        }
    })
}

fn status_message(status: u32, body: &str) -> String {
    let snippet: String = body.trim().chars().take(200).collect();
    if snippet.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, snippet)
    }
}
