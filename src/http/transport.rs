//! Transport boundary.
//!
//! A [`Transport`] performs one request/response exchange. Policies in
//! [`crate::resilience`] implement the same trait and wrap an inner transport,
//! so the pipeline is a stack of transports ending in [`ReqwestTransport`].
//!
//! Cancellation is by drop: when the caller stops polling `execute`, the
//! underlying reqwest future is dropped with it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{HttpError, HttpResult};
use crate::http::request::Request;
use crate::http::response::Response;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> HttpResult<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        (**self).execute(request).await
    }
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn transport_error(request: &Request, err: reqwest::Error) -> HttpError {
    HttpError::Transport {
        method: request.method().clone(),
        url: request.url().to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &Request) -> HttpResult<Response> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(auth) = request.auth() {
            let mut value = HeaderValue::from_str(&auth.header_value()).map_err(|_| {
                HttpError::Configuration("Invalid characters in credentials".to_string())
            })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_TYPE, body.content_type)
                .body(body.bytes.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(request, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(request, e))?;

        Ok(Response::new(status, headers, body.to_vec()))
    }
}
