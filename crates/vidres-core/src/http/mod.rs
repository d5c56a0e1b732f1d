//! Blocking HTTP GET via the curl crate (libcurl).
//!
//! Used for the player script download and the fallback service call. Both
//! run inside `spawn_blocking` when driven from async code (`get_text_async`).

mod error;

pub use error::HttpError;

use std::str;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Performs a GET request and returns the response body as UTF-8 text.
///
/// Follows redirects. `headers` are sent as-is (`("User-Agent", "...")`).
/// Non-2xx responses are returned as `HttpError::Status`.
pub fn get_text(url: &str, headers: &[(String, String)], timeout: Duration) -> Result<String, HttpError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(HttpError::Status(code));
    }

    match String::from_utf8(body) {
        Ok(text) => Ok(text),
        Err(e) => Err(HttpError::Body(e.utf8_error())),
    }
}

/// Runs `get_text` on the blocking pool.
pub async fn get_text_async(
    url: String,
    headers: Vec<(String, String)>,
    timeout: Duration,
) -> Result<String, HttpError> {
    tokio::task::spawn_blocking(move || get_text(&url, &headers, timeout))
        .await
        .map_err(|e| HttpError::Join(e.to_string()))?
}
