//! HTTP error type shared by the script fetcher and the fallback client.

use std::fmt;

/// Error returned by a single GET (curl failure, HTTP status, or undecodable body).
#[derive(Debug)]
pub enum HttpError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Status(u32),
    /// Body was not valid UTF-8.
    Body(std::str::Utf8Error),
    /// Blocking task panicked or was cancelled.
    Join(String),
}

impl HttpError {
    /// True when the request timed out (connect or total).
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Curl(e) if e.is_operation_timedout())
    }

    /// True for network-level failures where the server was never heard from.
    pub fn is_transport(&self) -> bool {
        match self {
            HttpError::Curl(e) => {
                e.is_operation_timedout()
                    || e.is_couldnt_connect()
                    || e.is_couldnt_resolve_host()
                    || e.is_couldnt_resolve_proxy()
                    || e.is_read_error()
                    || e.is_recv_error()
                    || e.is_send_error()
                    || e.is_got_nothing()
            }
            HttpError::Status(_) | HttpError::Body(_) | HttpError::Join(_) => false,
        }
    }
}

impl From<curl::Error> for HttpError {
    fn from(e: curl::Error) -> Self {
        HttpError::Curl(e)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Curl(e) => write!(f, "{}", e),
            HttpError::Status(code) => write!(f, "HTTP {}", code),
            HttpError::Body(e) => write!(f, "body is not UTF-8: {}", e),
            HttpError::Join(msg) => write!(f, "request task failed: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::Curl(e) => Some(e),
            HttpError::Body(e) => Some(e),
            HttpError::Status(_) | HttpError::Join(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_not_transport() {
        let e = HttpError::Status(404);
        assert!(!e.is_transport());
        assert!(!e.is_timeout());
        assert_eq!(e.to_string(), "HTTP 404");
    }
}
