//! SwOS Client Library
//!
//! Polls the read-only status endpoints of MikroTik SwOS switches over HTTP
//! digest auth and decodes them into a [`Snapshot`].
//!
//! # Example
//!
//! ```rust,no_run
//! use swos_client::{Section, SwosClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SwosClient::new("192.168.88.1", "admin", "")?;
//!
//!     // One poll cycle: every section, fetched concurrently
//!     let snapshot = client.fetch_all().await?;
//!     println!("{:?}", snapshot.field(Section::Sys, "temp_c"));
//!
//!     // Or a single section
//!     let link = client.fetch_section(Section::Link).await?;
//!     println!("{} link fields", link.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Transports
//!
//! Every endpoint is tried on a pooled async client first and on a fresh
//! blocking client second. An endpoint neither can fetch counts as
//! unavailable; the section then moves on to its legacy `!`-prefixed path.
//!
//! # Testing
//!
//! The `testing` module serves canned blobs from a local fake device:
//!
//! ```rust,ignore
//! use swos_client::testing::FakeDevice;
//!
//! let device = FakeDevice::builder()
//!     .endpoint("sys.b", "{ver:'322e3133'}")
//!     .require_digest("admin")
//!     .start()
//!     .await?;
//! let snapshot = device.client("admin", "")?.fetch_all().await?;
//! ```

mod client;
pub mod config;
pub mod digest;
mod error;
pub mod testing;
pub mod transport;

pub use client::SwosClient;
pub use config::DeviceConfig;
pub use digest::DigestCredentials;
pub use error::{Result, SwosClientError};
pub use transport::{BlockingTransport, FallbackTransport, PooledTransport, Transport};

// Re-export core types for convenience
pub use swos_core::{DeviceInfo, FieldValue, Record, Section, SectionData, Snapshot};
