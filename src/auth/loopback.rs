//! Loopback redirect listener for the installed-app consent flow.
//!
//! Google redirects the browser to `http://127.0.0.1:<port>/?code=..&state=..`
//! once the user grants access. We accept that single request, answer with a
//! short page and hand the query parameters back.

use crate::error::{Error, Result};
use reqwest::Url;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use tracing::debug;

const SUCCESS_PAGE: &str = "<html><body><h3>Authentication complete.</h3>\
<p>You may close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authentication failed.</h3>\
<p>Check the terminal for details.</p></body></html>";

/// Query parameters of the redirect request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizationResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl AuthorizationResponse {
    /// The authorization code, provided `state` matches and Google did not
    /// report an error.
    pub fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            return Err(Error::Auth(format!("authorization denied: {}", error)));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(Error::Auth(
                "state mismatch in authorization redirect".to_string(),
            ));
        }
        self.code
            .ok_or_else(|| Error::Auth("authorization redirect without code".to_string()))
    }
}

pub struct LoopbackServer {
    listener: TcpListener,
}

impl LoopbackServer {
    /// Bind an OS-assigned port on 127.0.0.1.
    pub fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .map_err(|e| Error::Auth(format!("cannot start redirect listener: {}", e)))?;
        Ok(Self { listener })
    }

    pub fn redirect_uri(&self) -> Result<String> {
        let addr = self
            .listener
            .local_addr()
            .map_err(|e| Error::Auth(format!("redirect listener has no address: {}", e)))?;
        Ok(format!("http://{}/", addr))
    }

    /// Block until the browser hits the redirect URI. Unrelated requests
    /// (favicon and the like) get a 404 and are skipped.
    pub fn wait_for_redirect(&self) -> Result<AuthorizationResponse> {
        loop {
            let (mut stream, peer) = self
                .listener
                .accept()
                .map_err(|e| Error::Auth(format!("redirect listener failed: {}", e)))?;

            let request_line = match read_request_line(&stream) {
                Ok(line) => line,
                Err(e) => {
                    debug!("Dropping unreadable request from {}: {}", peer, e);
                    continue;
                }
            };
            debug!("Redirect listener got: {}", request_line);

            match parse_request_line(&request_line) {
                Some(response) => {
                    let page = if response.error.is_some() {
                        FAILURE_PAGE
                    } else {
                        SUCCESS_PAGE
                    };
                    // The browser page is cosmetic; the code is already in hand.
                    let _ = respond(&mut stream, "200 OK", page);
                    return Ok(response);
                }
                None => {
                    let _ = respond(&mut stream, "404 Not Found", "");
                }
            }
        }
    }
}

/// Read the request head and return its first line. Headers are drained so
/// the socket closes cleanly after the reply.
fn read_request_line(stream: &TcpStream) -> std::io::Result<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 || header.trim_end().is_empty() {
            break;
        }
    }

    Ok(request_line.trim_end().to_string())
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )?;
    stream.flush()
}

/// Parse `GET /?code=..&state=.. HTTP/1.1`. Returns `None` for requests that
/// carry neither `code` nor `error`.
pub fn parse_request_line(line: &str) -> Option<AuthorizationResponse> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    if method != "GET" {
        return None;
    }

    let url = Url::parse(&format!("http://127.0.0.1{}", target)).ok()?;
    let mut response = AuthorizationResponse::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => response.code = Some(value.into_owned()),
            "state" => response.state = Some(value.into_owned()),
            "error" => response.error = Some(value.into_owned()),
            _ => {}
        }
    }

    if response.code.is_none() && response.error.is_none() {
        return None;
    }
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_and_state() {
        let response =
            parse_request_line("GET /?state=abc&code=4%2F0Adeu5B&scope=drive HTTP/1.1").unwrap();
        assert_eq!(response.code.as_deref(), Some("4/0Adeu5B"));
        assert_eq!(response.state.as_deref(), Some("abc"));
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_parse_error() {
        let response = parse_request_line("GET /?error=access_denied&state=abc HTTP/1.1").unwrap();
        assert_eq!(response.error.as_deref(), Some("access_denied"));
    }

    #[test]
    fn test_unrelated_requests_are_skipped() {
        assert_eq!(parse_request_line("GET /favicon.ico HTTP/1.1"), None);
        assert_eq!(parse_request_line("POST /?code=x HTTP/1.1"), None);
        assert_eq!(parse_request_line(""), None);
    }

    #[test]
    fn test_into_code_checks_state() {
        let response = AuthorizationResponse {
            code: Some("c".to_string()),
            state: Some("other".to_string()),
            error: None,
        };
        assert!(matches!(response.into_code("expected"), Err(Error::Auth(_))));

        let response = AuthorizationResponse {
            code: Some("c".to_string()),
            state: Some("expected".to_string()),
            error: None,
        };
        assert_eq!(response.into_code("expected").unwrap(), "c");
    }

    #[test]
    fn test_into_code_reports_denial() {
        let response = AuthorizationResponse {
            code: None,
            state: Some("s".to_string()),
            error: Some("access_denied".to_string()),
        };
        let err = response.into_code("s").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn test_redirect_roundtrip_over_socket() {
        let server = LoopbackServer::bind().unwrap();
        let uri = server.redirect_uri().unwrap();
        let addr = uri
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            write!(
                stream,
                "GET /?code=abc&state=xyz HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n"
            )
            .unwrap();
            let mut reply = String::new();
            std::io::Read::read_to_string(&mut stream, &mut reply).unwrap();
            reply
        });

        let response = server.wait_for_redirect().unwrap();
        assert_eq!(response.code.as_deref(), Some("abc"));
        assert_eq!(response.state.as_deref(), Some("xyz"));

        let reply = client.join().unwrap();
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
    }
}
