//! Response model returned by the transport.

use crate::error::{HttpError, HttpResult};
use crate::http::request::Request;

/// Buffered response. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> HttpResult<String> {
        String::from_utf8(self.body.clone()).map_err(|e| HttpError::Deserialization {
            format: "text",
            reason: e.to_string(),
        })
    }

    /// Turn a non-2xx response into [`HttpError::HttpStatus`].
    pub fn error_for_status(self, request: &Request) -> HttpResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(HttpError::HttpStatus {
            method: request.method().clone(),
            url: request.url().to_string(),
            status: self.status,
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }
}
