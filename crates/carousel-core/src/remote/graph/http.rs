//! One blocking HTTP exchange over libcurl.

use std::str;
use std::time::Duration;

use crate::retry::RemoteError;

/// Connect and whole-request timeouts applied to every exchange.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
}

/// Raw response: status, header lines and body bytes.
#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub status: u32,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

fn network(e: curl::Error) -> RemoteError {
    RemoteError::Network {
        message: e.to_string(),
        timed_out: e.is_operation_timedout(),
    }
}

/// Performs a GET (no body) or a form-encoded POST (with body).
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub(crate) fn exchange(
    url: &str,
    form_body: Option<&str>,
    timeouts: Timeouts,
) -> Result<HttpResponse, RemoteError> {
    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(network)?;
    easy.follow_location(false).map_err(network)?;
    easy.connect_timeout(timeouts.connect).map_err(network)?;
    easy.timeout(timeouts.request).map_err(network)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json").map_err(network)?;
    if let Some(form) = form_body {
        easy.post(true).map_err(network)?;
        easy.post_fields_copy(form.as_bytes()).map_err(network)?;
        list.append("Content-Type: application/x-www-form-urlencoded")
            .map_err(network)?;
    }
    easy.http_headers(list).map_err(network)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(network)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(network)?;
        transfer.perform().map_err(network)?;
    }

    let status = easy.response_code().map_err(network)?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
