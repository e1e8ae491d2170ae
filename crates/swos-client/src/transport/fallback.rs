//! Primary/secondary fallback policy

use std::sync::Arc;

use tracing::{error, warn};
use url::Url;

use super::Transport;

/// Tries the primary transport, then the secondary.
///
/// Failures never propagate: an endpoint that neither transport could fetch
/// is reported as `None`.
#[derive(Clone)]
pub struct FallbackTransport {
    primary: Arc<dyn Transport>,
    secondary: Arc<dyn Transport>,
}

impl FallbackTransport {
    pub fn new(primary: Arc<dyn Transport>, secondary: Arc<dyn Transport>) -> Self {
        Self { primary, secondary }
    }

    /// Body of `url`, or `None` if the endpoint is unavailable
    pub async fn fetch(&self, url: &Url) -> Option<String> {
        let endpoint = url.path().trim_start_matches('/');

        match self.primary.fetch(url).await {
            Ok(body) => return Some(body),
            Err(e) => warn!("{} failed on {}: {}", self.primary.name(), endpoint, e),
        }

        match self.secondary.fetch(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!(
                    "{} fallback failed on {}: {}",
                    self.secondary.name(),
                    endpoint,
                    e
                );
                None
            }
        }
    }

    /// Close both transports
    pub fn close(&self) {
        self.primary.close();
        self.secondary.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SwosClientError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted transport: fixed outcome, counts calls
    struct Scripted {
        body: Option<&'static str>,
        calls: AtomicUsize,
        closes: AtomicUsize,
    }

    impl Scripted {
        fn ok(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: None,
                calls: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self, _url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .map(str::to_string)
                .ok_or(SwosClientError::Timeout)
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn url() -> Url {
        Url::parse("http://10.0.0.1/sys.b").unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = Scripted::ok("{a:0x1}");
        let secondary = Scripted::ok("{b:0x2}");
        let strategy = FallbackTransport::new(primary.clone(), secondary.clone());

        assert_eq!(strategy.fetch(&url()).await.as_deref(), Some("{a:0x1}"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_through() {
        let primary = Scripted::failing();
        let secondary = Scripted::ok("{b:0x2}");
        let strategy = FallbackTransport::new(primary.clone(), secondary.clone());

        assert_eq!(strategy.fetch(&url()).await.as_deref(), Some("{b:0x2}"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_is_unavailable() {
        let strategy = FallbackTransport::new(Scripted::failing(), Scripted::failing());
        assert_eq!(strategy.fetch(&url()).await, None);
    }

    #[tokio::test]
    async fn test_close_reaches_both() {
        let primary = Scripted::failing();
        let secondary = Scripted::failing();
        let strategy = FallbackTransport::new(primary.clone(), secondary.clone());

        strategy.close();
        assert_eq!(primary.closes.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.closes.load(Ordering::SeqCst), 1);
    }
}
