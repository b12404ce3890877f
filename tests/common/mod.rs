//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use resilient_http::config::{ClientConfig, PolicyConfig};
use resilient_http::http::{ClientRegistry, ReqwestTransport, Request, Response};
use resilient_http::{HttpResult, HttpService, Transport};

/// Policy with fast delays and a circuit that stays closed unless asked.
#[allow(dead_code)]
pub fn policy(max_retry_attempts: u32, retry_delay_ms: u64) -> PolicyConfig {
    PolicyConfig {
        timeout_secs: 10,
        max_retry_attempts,
        retry_delay_ms,
        circuit_min_throughput: 1000,
        circuit_failure_ratio: 1.0,
        circuit_break_secs: 10,
        circuit_window_size: 1000,
    }
}

/// Service with a single client named `name` using the given transport.
#[allow(dead_code)]
pub fn service_with(name: &str, policy: PolicyConfig, transport: Arc<dyn Transport>) -> HttpService {
    let registry = ClientRegistry::new();
    let config = ClientConfig {
        name: name.to_string(),
        user_agent: Some("resilient-http-tests".to_string()),
        policy,
        ..Default::default()
    };
    registry.register(&config, transport);
    HttpService::new(Arc::new(registry))
}

/// Service with a single reqwest-backed client.
#[allow(dead_code)]
pub fn reqwest_service(name: &str, policy: PolicyConfig) -> HttpService {
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    service_with(name, policy, Arc::new(ReqwestTransport::with_client(client)))
}

/// In-memory transport answering with a scripted status sequence
/// (the last entry repeats) after an optional latency.
#[allow(dead_code)]
pub struct ScriptedTransport {
    statuses: Vec<u16>,
    latency: Duration,
    calls: AtomicU32,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(statuses: &[u16]) -> Arc<Self> {
        Self::with_latency(statuses, Duration::ZERO)
    }

    pub fn with_latency(statuses: &[u16], latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            statuses: statuses.to_vec(),
            latency,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, _request: &Request) -> HttpResult<Response> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let status = self.statuses[n.min(self.statuses.len() - 1)];
        Ok(Response::new(status, Vec::new(), b"{}".to_vec()))
    }
}

/// Start a programmable raw TCP backend on an ephemeral port.
///
/// `f` returns `Some((status, body))` to answer, or `None` to drop the
/// connection without a response.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<(u16, String)>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let Some((status, body)) = f().await else {
                            return;
                        };
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
