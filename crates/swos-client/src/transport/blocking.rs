//! Secondary transport: reqwest blocking client on the blocking pool

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use url::Url;

use super::{accept_body, classify, Transport};
use crate::digest::{parse_challenge, DigestCredentials};
use crate::error::{Result, SwosClientError};

const USER_AGENT: &str = concat!("swos-client/", env!("CARGO_PKG_VERSION"));

/// Extra time granted to the background task on top of its request timeouts
const TASK_GRACE: Duration = Duration::from_secs(1);

/// Fresh blocking client per request, run via `spawn_blocking` so a device
/// that stalls the socket cannot stall the async executor.
///
/// Digest is negotiated from scratch on every request, so one fetch may
/// issue two requests (challenge and answer) each bounded by the configured
/// timeout. A secondary attempt can therefore take up to about twice that
/// timeout, plus a one-second grace, before it is abandoned.
pub struct BlockingTransport {
    credentials: DigestCredentials,
    timeout: Duration,
    closed: AtomicBool,
}

impl BlockingTransport {
    pub fn new(credentials: DigestCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Transport for BlockingTransport {
    fn name(&self) -> &'static str {
        "blocking"
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SwosClientError::Closed);
        }

        let credentials = self.credentials.clone();
        let timeout = self.timeout;
        let target = url.clone();
        let task =
            tokio::task::spawn_blocking(move || blocking_get(&credentials, &target, timeout));

        // Up to two requests (challenge + answer), each bounded by `timeout`.
        // On expiry the task is left to finish against its own timeout.
        match tokio::time::timeout(self.timeout * 2 + TASK_GRACE, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(SwosClientError::TaskFailed(join_err.to_string())),
            Err(_) => Err(SwosClientError::Timeout),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

fn blocking_get(credentials: &DigestCredentials, url: &Url, timeout: Duration) -> Result<String> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;

    let mut response = client.get(url.clone()).send().map_err(classify)?;

    if response.status() == StatusCode::UNAUTHORIZED {
        let mut challenge = parse_challenge(response.headers())?;
        let authorization = credentials.answer(&mut challenge, url)?;
        response = client
            .get(url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .map_err(classify)?;
    }

    let status = response.status();
    let body = response.text().map_err(classify)?;
    accept_body("blocking", url, status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;
    use std::time::Instant;

    #[tokio::test]
    async fn test_closed_transport_refuses_requests() {
        let transport = BlockingTransport::new(
            DigestCredentials::new("admin", ""),
            Duration::from_millis(200),
        );
        transport.close();

        let url = Url::parse("http://127.0.0.1:9/sys.b").unwrap();
        assert!(matches!(
            transport.fetch(&url).await,
            Err(SwosClientError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let transport = BlockingTransport::new(
            DigestCredentials::new("admin", ""),
            Duration::from_millis(500),
        );

        // Port 9 (discard) is not expected to be listening
        let url = Url::parse("http://127.0.0.1:9/sys.b").unwrap();
        assert!(transport.fetch(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_stalled_answer_is_bounded_by_twice_the_timeout() {
        let device = FakeDevice::builder()
            .slow_endpoint("sys.b", "{temp:0x2a}", Duration::from_secs(5))
            .require_digest("admin")
            .start()
            .await
            .unwrap();
        let url = device.config("admin", "").base_url().unwrap().join("sys.b").unwrap();

        let timeout = Duration::from_millis(300);
        let transport = BlockingTransport::new(DigestCredentials::new("admin", ""), timeout);

        let started = Instant::now();
        assert!(transport.fetch(&url).await.is_err());
        assert!(started.elapsed() < timeout * 2 + TASK_GRACE);

        // Challenge answered at once, the answer stalled
        assert_eq!(device.request_count("sys.b"), 2);
    }
}
