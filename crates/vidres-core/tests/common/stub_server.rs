//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by request path (query string ignored) and records
//! each raw request head so tests can inspect the query and headers.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn ok(path: &str, body: &str) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: String::new(),
        }
    }
}

pub struct StubServer {
    /// e.g. "http://127.0.0.1:12345/"
    pub base_url: String,
    /// e.g. "127.0.0.1:12345"
    pub host: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Raw request heads received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Unknown paths get 404.
/// The server runs until the process exits.
pub fn start(routes: Vec<Route>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    StubServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        host: format!("127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &[Route], seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf).to_string();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|target| target.split('?').next().unwrap_or(target).to_string())
        .unwrap_or_default();
    seen.lock().unwrap().push(request);

    let (status, body) = match routes.iter().find(|r| r.path == path) {
        Some(r) => (r.status, r.body.as_str()),
        None => (404, ""),
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
