//! Client façade and named-client registry.
//!
//! # Responsibilities
//! - Resolve the named client and its pipeline
//! - Build the request: base headers, request id, auth, encoded body
//! - Run the pipeline and decode the response
//! - Log method, URL and outcome of every call
//!
//! # Design Decisions
//! - Supplying both bearer and basic credentials is a configuration error
//! - Bodies are only encoded for methods other than GET and DELETE
//! - The response format is validated before any I/O
//! - Errors are returned unchanged; the façade only logs them

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::codec::{self, Format};
use crate::config::{ClientConfig, HttpConfig};
use crate::error::{HttpError, HttpResult};
use crate::http::request::{Auth, Request, X_REQUEST_ID};
use crate::http::response::Response;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::resilience::{CircuitState, Pipeline};

/// A registered client: its base headers and its pipeline.
#[derive(Debug)]
pub struct NamedClient {
    name: String,
    base_headers: Vec<(String, String)>,
    pipeline: Pipeline,
}

impl NamedClient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_headers(&self) -> &[(String, String)] {
        &self.base_headers
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.pipeline.circuit_state()
    }
}

/// Concurrent map of client name to [`NamedClient`].
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<String, Arc<NamedClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one reqwest-backed pipeline per configured client.
    pub fn from_config(config: &HttpConfig) -> HttpResult<Self> {
        let registry = Self::new();
        for client in &config.clients {
            let transport = Arc::new(ReqwestTransport::new()?);
            registry.register(client, transport);
        }
        Ok(registry)
    }

    /// Register (or replace) a client with an explicit transport.
    pub fn register(&self, config: &ClientConfig, transport: Arc<dyn Transport>) -> Arc<NamedClient> {
        let client = Arc::new(NamedClient {
            name: config.name.clone(),
            base_headers: config.base_headers(),
            pipeline: Pipeline::new(&config.name, config.policy.clone(), transport),
        });
        self.clients.insert(config.name.clone(), client.clone());
        tracing::debug!(client = %config.name, "Client registered");
        client
    }

    pub fn get(&self, name: &str) -> Option<Arc<NamedClient>> {
        self.clients.get(name).map(|entry| entry.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.clients.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Per-call options.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub bearer_token: Option<String>,
    pub basic_auth: Option<(String, String)>,
    /// Request body format tag (`json`, `xml`, `form` or a MIME type).
    pub content_type: String,
    /// Response body format tag (`json` or `xml`).
    pub response_format: String,
    /// Extra headers appended after the client's base headers.
    pub headers: Vec<(String, String)>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            bearer_token: None,
            basic_auth: None,
            content_type: "json".to_string(),
            response_format: "json".to_string(),
            headers: Vec::new(),
        }
    }
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn basic(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), pass.into()));
        self
    }

    pub fn content_type(mut self, format: impl Into<String>) -> Self {
        self.content_type = format.into();
        self
    }

    pub fn response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = format.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn auth(&self) -> HttpResult<Option<Auth>> {
        match (&self.bearer_token, &self.basic_auth) {
            (Some(_), Some(_)) => Err(HttpError::Configuration(
                "bearer token and basic auth are mutually exclusive".to_string(),
            )),
            (Some(token), None) => Ok(Some(Auth::bearer(token.clone()))),
            (None, Some((user, pass))) => Ok(Some(Auth::basic(user.clone(), pass.clone()))),
            (None, None) => Ok(None),
        }
    }
}

fn allows_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::DELETE
}

/// Single entry point for issuing requests through named clients.
#[derive(Debug, Clone)]
pub struct HttpService {
    registry: Arc<ClientRegistry>,
}

impl HttpService {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &HttpConfig) -> HttpResult<Self> {
        Ok(Self::new(Arc::new(ClientRegistry::from_config(config)?)))
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Send a request and decode the body with `options.response_format`.
    pub async fn send<B, T>(
        &self,
        client_name: &str,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: &SendOptions,
    ) -> HttpResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let format = Format::parse_response(&options.response_format)?;
        let response = self.send_raw(client_name, method, url, body, options).await?;
        codec::decode(response.body(), format)
    }

    /// Send a request and return the body as text.
    pub async fn send_text<B>(
        &self,
        client_name: &str,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: &SendOptions,
    ) -> HttpResult<String>
    where
        B: Serialize + ?Sized,
    {
        self.send_raw(client_name, method, url, body, options)
            .await?
            .text()
    }

    /// Send a request and return the undecoded 2xx response.
    pub async fn send_raw<B>(
        &self,
        client_name: &str,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: &SendOptions,
    ) -> HttpResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "http_request",
            client = %client_name,
            method = %method,
            url = %url,
            request_id = %request_id,
        );

        self.dispatch(client_name, method, url, body, options, &request_id)
            .instrument(span)
            .await
    }

    async fn dispatch<B>(
        &self,
        client_name: &str,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: &SendOptions,
        request_id: &str,
    ) -> HttpResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let client = self.registry.get(client_name).ok_or_else(|| {
            HttpError::Configuration(format!("Unknown client '{}'", client_name))
        })?;
        let request = build_request(&client, method, url, body, options, request_id)
            .inspect_err(|e| tracing::error!(kind = %e.kind(), error = %e, "Invalid request"))?;

        tracing::info!("Sending request");
        let start = Instant::now();
        let method_label = request.method().to_string();

        match client.pipeline().execute(&request).await {
            Ok(response) => {
                tracing::info!(
                    status = response.status(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request succeeded"
                );
                metrics::record_request(client.name(), &method_label, "success", start);
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    kind = %e.kind(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
                metrics::record_request(client.name(), &method_label, e.kind().as_str(), start);
                Err(e)
            }
        }
    }
}

fn build_request<B>(
    client: &NamedClient,
    method: Method,
    url: &str,
    body: Option<&B>,
    options: &SendOptions,
    request_id: &str,
) -> HttpResult<Request>
where
    B: Serialize + ?Sized,
{
    let auth = options.auth()?;

    let body = match body {
        Some(body) if allows_body(&method) => {
            let format: Format = options.content_type.parse()?;
            Some(codec::encode(body, format)?)
        }
        Some(_) => {
            tracing::debug!("Ignoring body for {} request", method);
            None
        }
        None => None,
    };

    Request::builder(method, url)
        .headers(client.base_headers().iter().cloned())
        .header(X_REQUEST_ID, request_id)
        .headers(options.headers.iter().cloned())
        .auth(auth)
        .body(body)
        .build()
}
