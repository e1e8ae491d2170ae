//! Primary transport: pooled async reqwest client

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::{accept_body, classify, Transport};
use crate::digest::{DigestCredentials, DigestSession};
use crate::error::{Result, SwosClientError};

/// Async reqwest client with a persistent connection pool.
///
/// The client is created eagerly and lives until [`Transport::close`].
pub struct PooledTransport {
    client: RwLock<Option<Client>>,
    digest: DigestSession,
}

impl PooledTransport {
    pub fn new(credentials: DigestCredentials, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client: RwLock::new(Some(client)),
            digest: DigestSession::new(credentials),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.client.read().is_none()
    }

    fn client(&self) -> Result<Client> {
        self.client.read().clone().ok_or(SwosClientError::Closed)
    }

    async fn get(
        &self,
        client: &Client,
        url: &Url,
        authorization: Option<String>,
    ) -> Result<reqwest::Response> {
        let mut request = client.get(url.clone());
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        request.send().await.map_err(classify)
    }
}

#[async_trait]
impl Transport for PooledTransport {
    fn name(&self) -> &'static str {
        "pooled"
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let client = self.client()?;

        let cached = self.digest.cached_authorization(url);
        let had_cached = cached.is_some();
        let mut response = self.get(&client, url, cached).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if had_cached {
                debug!("Cached digest challenge rejected, renegotiating");
                self.digest.reset();
            }
            let authorization = self.digest.negotiate(response.headers(), url)?;
            response = self.get(&client, url, Some(authorization)).await?;
        }

        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        accept_body(self.name(), url, status, body)
    }

    fn close(&self) {
        // Dropping the last handle shuts the pool down
        self.client.write().take();
        self.digest.reset();
    }
}
