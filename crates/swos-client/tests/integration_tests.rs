//! Integration tests for swos-client
//!
//! These tests run a fake SwOS device on localhost and poll it through the
//! real transports.

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use swos_client::testing::FakeDevice;
use swos_client::{DeviceInfo, FieldValue, Section, SwosClient, SwosClientError};
use swos_core::keys;

const SYS_BLOB: &str = "{id:'4d696b726f54696b',ver:'322e3133',brd:'4353533332362d3234472d32532b',\
mac:'64d154aabbcc',sid:'4b3130303031',ip:0x5000a8c0,upt:0x59614,temp:0x2a}";

const LINK_BLOB: &str = "{en:0x3ffffff,lnk:0x1000003,spd:{0x2,0x2,0x7},nm:{'506f727431','506f727432'}}";

const STATS_BLOB: &str = "{rb:{0x4a3b,0x0,0x12},tb:{0x91c,0x0,0x7}}";

// =============================================================================
// Helpers
// =============================================================================

async fn full_device() -> FakeDevice {
    FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .endpoint("link.b", LINK_BLOB)
        .endpoint("stats.b", STATS_BLOB)
        .start()
        .await
        .unwrap()
}

/// A local port with nothing listening on it
async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

// =============================================================================
// Poll Cycle
// =============================================================================

#[tokio::test]
async fn test_fetch_all_full_device() {
    let device = full_device().await;
    let client = device.client("admin", "").unwrap();

    let snapshot = client.fetch_all().await.unwrap();
    assert_eq!(
        snapshot.sections().collect::<Vec<_>>(),
        vec![Section::Sys, Section::Link, Section::Stats]
    );

    let sys = snapshot.record(Section::Sys).unwrap();
    assert_eq!(sys.get_str(keys::IDENTITY), Some("MikroTik"));
    assert_eq!(sys.get_str(keys::VERSION), Some("2.13"));
    assert_eq!(sys.get_str(keys::MAC), Some("64:d1:54:aa:bb:cc"));
    assert_eq!(sys.get_str(keys::IP_STR), Some("192.168.0.80"));
    assert_eq!(sys.get_int(keys::TEMP_C), Some(42));
    assert_eq!(sys.get_int(keys::UPTIME_SECONDS), Some(366100));

    let link = snapshot.record(Section::Link).unwrap();
    assert_eq!(link.get_int("en"), Some(0x3ffffff));
    assert_eq!(link.get_str("spd"), Some("{0x2,0x2,0x7}"));
    assert!(snapshot.record(Section::Stats).unwrap().contains("rb"));
}

#[tokio::test]
async fn test_device_info_from_polled_snapshot() {
    let device = full_device().await;
    let client = device.client("admin", "").unwrap();

    let info = DeviceInfo::from_snapshot(&client.fetch_all().await.unwrap());
    assert_eq!(info.identifier, "swos_K10001");
    assert_eq!(info.model, "CSS326-24G-2S+");
    assert_eq!(info.sw_version.as_deref(), Some("2.13"));
    assert_eq!(
        info.configuration_url.as_deref(),
        Some("http://192.168.0.80")
    );
}

#[tokio::test]
async fn test_version_with_two_digit_major() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", "{ver:'32302e3133'}")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let sys = client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(sys.get_str(keys::VERSION), Some("20.13"));
}

#[tokio::test]
async fn test_slow_sections_are_omitted() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .slow_endpoint("link.b", LINK_BLOB, Duration::from_secs(3))
        .slow_endpoint("stats.b", STATS_BLOB, Duration::from_secs(3))
        .start()
        .await
        .unwrap();
    let client = device
        .client_with_timeout("admin", "", Duration::from_millis(300))
        .unwrap();

    let snapshot = client.fetch_all().await.unwrap();
    assert_eq!(snapshot.sections().collect::<Vec<_>>(), vec![Section::Sys]);
    assert_eq!(snapshot.field(Section::Sys, keys::TEMP_C), Some(&FieldValue::Int(42)));
}

#[tokio::test]
async fn test_undecodable_body_is_kept_raw() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .endpoint("stats.b", "<html>busy</html>")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let snapshot = client.fetch_all().await.unwrap();
    assert_eq!(
        snapshot.get(Section::Stats).and_then(|d| d.raw()),
        Some("<html>busy</html>")
    );
    assert!(!snapshot.contains(Section::Link));
}

// =============================================================================
// Endpoint Fallback
// =============================================================================

#[tokio::test]
async fn test_legacy_endpoint_fallback() {
    let device = FakeDevice::builder()
        .endpoint("!sys.b", "{temp:0x1f}")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let sys = client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(sys.get_int(keys::TEMP_C), Some(31));

    // Canonical path tried on both transports before the legacy one
    assert_eq!(device.request_count("sys.b"), 2);
    assert_eq!(device.request_count("!sys.b"), 1);
}

#[tokio::test]
async fn test_server_error_falls_through_to_legacy() {
    let device = FakeDevice::builder()
        .endpoint_with_status("link.b", StatusCode::INTERNAL_SERVER_ERROR, "")
        .endpoint("!link.b", "{lnk:0x3}")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let link = client.fetch_section(Section::Link).await.unwrap();
    assert_eq!(link.get_int("lnk"), Some(3));
}

#[tokio::test]
async fn test_blocking_transport_recovers_canonical_endpoint() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .fail_first("sys.b", 1)
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let sys = client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(sys.get_int(keys::TEMP_C), Some(42));

    // Pooled got the 503, blocking got the body; legacy never tried
    assert_eq!(device.request_count("sys.b"), 2);
    assert_eq!(device.request_count("!sys.b"), 0);
}

#[tokio::test]
async fn test_empty_body_counts_as_unavailable() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", "  \n")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "").unwrap();

    let err = client.fetch_section(Section::Sys).await.unwrap_err();
    assert!(matches!(err, SwosClientError::NoRespondingEndpoint(_)));
}

#[tokio::test]
async fn test_fetch_endpoint_raw_body() {
    let device = full_device().await;
    let client = device.client("admin", "").unwrap();

    assert_eq!(
        client.fetch_endpoint("stats.b").await.as_deref(),
        Some(STATS_BLOB)
    );
    assert_eq!(client.fetch_endpoint("missing.b").await, None);
}

// =============================================================================
// Digest Authentication
// =============================================================================

#[tokio::test]
async fn test_digest_negotiation() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .require_digest("admin")
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "secret").unwrap();

    let sys = client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(sys.get_str(keys::VERSION), Some("2.13"));
    // Challenge, then answer
    assert_eq!(device.request_count("sys.b"), 2);

    // The pooled client reuses the challenge
    client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(device.request_count("sys.b"), 3);
}

#[tokio::test]
async fn test_blocking_transport_negotiates_digest() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .require_digest("admin")
        .fail_first("sys.b", 1)
        .start()
        .await
        .unwrap();
    let client = device.client("admin", "secret").unwrap();

    let sys = client.fetch_section(Section::Sys).await.unwrap();
    assert_eq!(sys.get_str(keys::IDENTITY), Some("MikroTik"));

    // Pooled: challenge, answer rejected with 503. Blocking: challenge, answer.
    assert_eq!(device.request_count("sys.b"), 4);
    assert_eq!(device.request_count("!sys.b"), 0);
}

#[tokio::test]
async fn test_rejected_credentials_make_device_unavailable() {
    let device = FakeDevice::builder()
        .endpoint("sys.b", SYS_BLOB)
        .require_digest("admin")
        .start()
        .await
        .unwrap();
    let client = device.client("guest", "secret").unwrap();

    assert!(matches!(
        client.fetch_all().await,
        Err(SwosClientError::DeviceUnavailable)
    ));
}

// =============================================================================
// Failure and Lifecycle
// =============================================================================

#[tokio::test]
async fn test_unreachable_device() {
    let port = closed_port().await;
    let config = swos_client::DeviceConfig::new("127.0.0.1", "").with_port(port);
    let client = SwosClient::from_config_with_timeout(&config, Duration::from_millis(500)).unwrap();

    assert!(matches!(
        client.fetch_all().await,
        Err(SwosClientError::DeviceUnavailable)
    ));
}

#[tokio::test]
async fn test_closed_client_issues_no_requests() {
    let device = full_device().await;
    let client = device.client("admin", "").unwrap();

    assert!(client.close());
    assert!(!client.close());

    assert!(matches!(
        client.fetch_all().await,
        Err(SwosClientError::DeviceUnavailable)
    ));
    assert!(device.requests().is_empty());
}

#[tokio::test]
async fn test_device_shutdown() {
    let device = full_device().await;
    let port = device.addr.port();
    device.shutdown().await;

    let config = swos_client::DeviceConfig::new("127.0.0.1", "").with_port(port);
    let client = SwosClient::from_config_with_timeout(&config, Duration::from_millis(500)).unwrap();
    assert!(client.fetch_all().await.is_err());
}
