//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of paths. Each route answers with a status and body,
//! can fail a number of times before succeeding, pause mid-body, or stall.
//! Every response closes the connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// Always answer `status` with `body`.
    Fixed { status: u16, body: Vec<u8> },
    /// Answer 503 for the first `failures` requests, then 200 with `body`.
    Flaky { failures: usize, body: Vec<u8> },
    /// Send the first half of `body`, wait `pause`, then send the rest.
    Slow { body: Vec<u8>, pause: Duration },
    /// Send headers for `total` bytes and `partial` of the body, then hang.
    Stall { partial: Vec<u8>, total: usize },
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Route::Fixed {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Route::Fixed {
            status,
            body: format!("status {}", status).into_bytes(),
        }
    }
}

/// Handle to a running server. Runs until the process exits.
#[derive(Clone)]
pub struct TestServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestServer {
    /// Base URL with trailing slash, e.g. "http://127.0.0.1:12345/".
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path` (leading slash optional).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    /// Number of requests seen for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread serving `routes` (keyed by path,
/// e.g. "/1.0/client.jar"). Unknown paths get 404.
pub fn start(routes: Vec<(&str, Route)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server = TestServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits: Arc::clone(&hits),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    server
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };
    let seen = {
        let mut hits = hits.lock().unwrap();
        let n = hits.entry(path.clone()).or_insert(0);
        *n += 1;
        *n
    };
    match routes.get(&path) {
        None => respond(&mut stream, 404, b"not found"),
        Some(Route::Fixed { status, body }) => respond(&mut stream, *status, body),
        Some(Route::Flaky { failures, body }) => {
            if seen <= *failures {
                respond(&mut stream, 503, b"try later");
            } else {
                respond(&mut stream, 200, body);
            }
        }
        Some(Route::Slow { body, pause }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let (first, rest) = body.split_at(body.len() / 2);
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(first);
            let _ = stream.flush();
            thread::sleep(*pause);
            let _ = stream.write_all(rest);
        }
        Some(Route::Stall { partial, total }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                total
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(partial);
            let _ = stream.flush();
            thread::sleep(Duration::from_secs(30));
        }
    }
}

/// Reads until the end of the request head and returns the request path.
fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > 64 * 1024 {
            return None;
        }
    }
    let head = std::str::from_utf8(&buf).ok()?;
    let request_line = head.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    let target = parts.next()?;
    Some(target.split('?').next().unwrap_or(target).to_string())
}

fn respond(stream: &mut TcpStream, status: u16, body: &[u8]) {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
