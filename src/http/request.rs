//! Outbound request model.
//!
//! # Responsibilities
//! - Hold method, URL, ordered headers, encoded body and credentials
//! - Validate header names/values and the URL at build time
//! - Stay immutable once built so retries resend the exact same request

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::error::{HttpError, HttpResult};

/// Header carrying the per-call correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Credential attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Bearer(String),
    Basic { user: String, pass: String },
}

impl Auth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(token.into())
    }

    pub fn basic(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Auth::Basic {
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Value of the `Authorization` header for this credential.
    pub fn header_value(&self) -> String {
        match self {
            Auth::Bearer(token) => format!("Bearer {}", token),
            Auth::Basic { user, pass } => {
                let encoded = BASE64_STANDARD.encode(format!("{}:{}", user, pass));
                format!("Basic {}", encoded)
            }
        }
    }
}

// Secrets never reach the logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Auth::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("pass", &"<redacted>")
                .finish(),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// A fully-formed outbound request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    auth: Option<Auth>,
}

impl Request {
    pub fn builder(method: Method, url: &str) -> RequestBuilder {
        RequestBuilder {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            auth: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in insertion order; names may repeat.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    auth: Option<Auth>,
}

impl RequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }

    pub fn body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> HttpResult<Request> {
        let url = Url::parse(&self.url)
            .map_err(|e| HttpError::Configuration(format!("Invalid URL '{}': {}", self.url, e)))?;

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HttpError::Configuration(format!("Invalid header name '{}'", name)))?;
            HeaderValue::from_str(value).map_err(|_| {
                HttpError::Configuration(format!("Invalid value for header '{}'", name))
            })?;
        }

        if let Some(auth) = &self.auth {
            HeaderValue::from_str(&auth.header_value()).map_err(|_| {
                HttpError::Configuration("Invalid characters in credentials".to_string())
            })?;
        }

        Ok(Request {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
            auth: self.auth,
        })
    }
}
