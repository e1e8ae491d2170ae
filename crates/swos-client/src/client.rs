//! SwOS device client

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use swos_core::{Record, Section, SectionData, Snapshot};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{DeviceConfig, DEFAULT_PORT};
use crate::digest::DigestCredentials;
use crate::error::{Result, SwosClientError};
use crate::transport::{BlockingTransport, FallbackTransport, PooledTransport, Transport};

/// Read-only client for one SwOS device
///
/// Owns the connection pool for its whole lifetime; call [`close`] on
/// teardown.
///
/// [`close`]: SwosClient::close
pub struct SwosClient {
    base_url: Url,
    transport: FallbackTransport,
    closed: AtomicBool,
}

impl SwosClient {
    /// Create a client for `host` on the default port
    pub fn new(host: &str, username: &str, password: &str) -> Result<Self> {
        Self::from_config(
            &DeviceConfig::new(host, password)
                .with_username(username)
                .with_port(DEFAULT_PORT),
        )
    }

    /// Create a client from a device configuration
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        Self::from_config_with_timeout(config, config.timeout())
    }

    /// Like [`from_config`](Self::from_config) with an explicit per-request timeout
    pub fn from_config_with_timeout(config: &DeviceConfig, timeout: Duration) -> Result<Self> {
        let base_url = config.base_url()?;
        let credentials = DigestCredentials::new(&config.username, &config.password);

        let primary = PooledTransport::new(credentials.clone(), timeout)?;
        let secondary = BlockingTransport::new(credentials, timeout);

        Ok(Self::with_transports(
            base_url,
            Arc::new(primary),
            Arc::new(secondary),
        ))
    }

    /// Create a client over arbitrary transports
    pub fn with_transports(
        base_url: Url,
        primary: Arc<dyn Transport>,
        secondary: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url,
            transport: FallbackTransport::new(primary, secondary),
            closed: AtomicBool::new(false),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of a device endpoint such as `sys.b` or `!sys.b`
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    // =========================================================================
    // Fetch Operations
    // =========================================================================

    /// Raw body of one endpoint, or `None` if unavailable
    #[instrument(skip(self))]
    pub async fn fetch_endpoint(&self, endpoint: &str) -> Option<String> {
        if self.is_closed() {
            return None;
        }
        let url = match self.endpoint_url(endpoint) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build URL for {}: {}", endpoint, e);
                return None;
            }
        };
        self.transport.fetch(&url).await
    }

    /// First non-empty body among the section's candidate endpoints
    async fn fetch_section_body(&self, section: Section) -> Option<String> {
        for endpoint in section.candidates() {
            if let Some(body) = self.fetch_endpoint(endpoint).await {
                debug!("Section {} served by {}", section, endpoint);
                return Some(body);
            }
        }
        warn!("No endpoint answered for section {}", section);
        None
    }

    /// Fetch and decode one section.
    ///
    /// The record may be empty if the device answered with something other
    /// than a blob.
    #[instrument(skip(self))]
    pub async fn fetch_section(&self, section: Section) -> Result<Record> {
        self.fetch_section_body(section)
            .await
            .map(|body| swos_core::decode(&body))
            .ok_or_else(|| SwosClientError::NoRespondingEndpoint(section.to_string()))
    }

    /// Fetch every known section concurrently.
    ///
    /// Sections without any response are left out. Fails only when no
    /// section produced data at all.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Snapshot> {
        let bodies = join_all(
            Section::ALL
                .into_iter()
                .map(|section| async move { (section, self.fetch_section_body(section).await) }),
        )
        .await;

        let snapshot: Snapshot = bodies
            .into_iter()
            .filter_map(|(section, body)| {
                let data = SectionData::from_body(&body?);
                if data.raw().is_some() {
                    info!("Section {} returned no decodable fields, keeping raw body", section);
                }
                Some((section, data))
            })
            .collect();

        if snapshot.is_empty() {
            return Err(SwosClientError::DeviceUnavailable);
        }

        debug!(
            "Poll cycle complete: {}/{} sections",
            snapshot.len(),
            Section::ALL.len()
        );
        Ok(snapshot)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the connection pool.
    ///
    /// Idempotent: returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.transport.close();
        debug!("Closed client for {}", self.base_url);
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
