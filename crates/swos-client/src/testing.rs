//! Test utilities for swos-client
//!
//! Provides a fake SwOS device for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::config::DeviceConfig;
use crate::{Result, SwosClient};

const REALM: &str = "CSS326-24G-2S+";
const NONCE: &str = "5f2c3b0a9e8d7c6b";

/// Canned response for one endpoint
#[derive(Debug, Clone)]
struct FakeEndpoint {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

struct DeviceState {
    endpoints: HashMap<String, FakeEndpoint>,
    username: Option<String>,
    requests: Mutex<Vec<String>>,
    /// Remaining `503` answers per endpoint
    failures: Mutex<HashMap<String, usize>>,
}

/// Builder for [`FakeDevice`]
#[derive(Default)]
pub struct FakeDeviceBuilder {
    endpoints: HashMap<String, FakeEndpoint>,
    username: Option<String>,
    failures: HashMap<String, usize>,
}

impl FakeDeviceBuilder {
    /// Serve `body` with 200 at `endpoint` (e.g. `sys.b` or `!sys.b`)
    pub fn endpoint(self, endpoint: &str, body: &str) -> Self {
        self.endpoint_with_status(endpoint, StatusCode::OK, body)
    }

    /// Serve `body` with a specific status
    pub fn endpoint_with_status(mut self, endpoint: &str, status: StatusCode, body: &str) -> Self {
        self.endpoints.insert(
            endpoint.to_string(),
            FakeEndpoint {
                status,
                body: body.to_string(),
                delay: None,
            },
        );
        self
    }

    /// Answer `endpoint` only after `delay`
    pub fn slow_endpoint(mut self, endpoint: &str, body: &str, delay: Duration) -> Self {
        self.endpoints.insert(
            endpoint.to_string(),
            FakeEndpoint {
                status: StatusCode::OK,
                body: body.to_string(),
                delay: Some(delay),
            },
        );
        self
    }

    /// Answer the first `count` requests for `endpoint` with `503`.
    ///
    /// Only requests that passed authentication are counted, so with a
    /// single failure the pooled transport fails and the blocking one
    /// succeeds.
    pub fn fail_first(mut self, endpoint: &str, count: usize) -> Self {
        self.failures.insert(endpoint.to_string(), count);
        self
    }

    /// Require a digest answer for `username` before serving anything.
    ///
    /// The fake checks username, nonce and URI of the answer; it does not
    /// verify the hash.
    pub fn require_digest(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Bind to an ephemeral port and start serving
    pub async fn start(self) -> Result<FakeDevice> {
        let state = Arc::new(DeviceState {
            endpoints: self.endpoints,
            username: self.username,
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(self.failures),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router = Router::new().fallback(serve).with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(FakeDevice {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }
}

/// A fake SwOS device that shuts down when dropped
pub struct FakeDevice {
    pub addr: SocketAddr,
    state: Arc<DeviceState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl FakeDevice {
    pub fn builder() -> FakeDeviceBuilder {
        FakeDeviceBuilder::default()
    }

    /// Device config pointing at this fake
    pub fn config(&self, username: &str, password: &str) -> DeviceConfig {
        DeviceConfig::new(self.addr.ip().to_string(), password)
            .with_port(self.addr.port())
            .with_username(username)
    }

    /// Client with a short per-request timeout
    pub fn client(&self, username: &str, password: &str) -> Result<SwosClient> {
        self.client_with_timeout(username, password, Duration::from_secs(2))
    }

    pub fn client_with_timeout(
        &self,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<SwosClient> {
        SwosClient::from_config_with_timeout(&self.config(username, password), timeout)
    }

    /// Paths requested so far, in arrival order, without the leading `/`
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    /// Number of requests for one endpoint
    pub fn request_count(&self, endpoint: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.as_str() == endpoint)
            .count()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn serve(State(state): State<Arc<DeviceState>>, uri: Uri, headers: HeaderMap) -> Response {
    let endpoint = uri.path().trim_start_matches('/').to_string();
    state.requests.lock().push(endpoint.clone());

    if let Some(username) = &state.username {
        if !is_authorized(&headers, username, uri.path()) {
            let challenge = format!(
                r#"Digest realm="{}", nonce="{}", qop="auth""#,
                REALM, NONCE
            );
            return (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, challenge)]).into_response();
        }
    }

    let Some(fake) = state.endpoints.get(&endpoint).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(remaining) = state.failures.lock().get_mut(&endpoint) {
        if *remaining > 0 {
            *remaining -= 1;
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    }

    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }
    (fake.status, fake.body).into_response()
}

fn is_authorized(headers: &HeaderMap, username: &str, path: &str) -> bool {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    value.starts_with("Digest ")
        && value.contains(&format!(r#"username="{}""#, username))
        && value.contains(&format!(r#"nonce="{}""#, NONCE))
        && value.contains(&format!(r#"uri="{}""#, path))
}
