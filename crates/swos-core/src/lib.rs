//! swos-core - Blob decoding for MikroTik SwOS telemetry
//!
//! SwOS switches expose their state as small text blobs (`sys.b`, `link.b`,
//! `stats.b`). This crate turns those blobs into typed [`Record`]s, groups
//! them into [`Snapshot`]s and provides presentation helpers. It performs no
//! I/O; see `swos-client` for fetching.
//!
//! # Quick Start
//!
//! ```rust
//! use swos_core::{decode, format::{UptimeFormatter, ValueFormatter}};
//!
//! let record = decode("{ver:'322e3133',ip:0x5000a8c0,upt:0x59614,temp:0x2a}");
//!
//! assert_eq!(record.get_str("ver"), Some("2.13"));
//! assert_eq!(record.get_str("ip_str"), Some("192.168.0.80"));
//! assert_eq!(record.get_int("temp_c"), Some(42));
//!
//! let uptime = UptimeFormatter.format(record.get("uptime_seconds"));
//! assert_eq!(uptime.unwrap().to_string(), "0:01:01:01");
//! ```
//!
//! # Value Typing
//!
//! | Wire form | Result |
//! |-----------|--------|
//! | `0x2a` | `Int(42)`, raw text if malformed |
//! | `'322e3133'` | per-field policy: ASCII, MAC, or the inner text |
//! | `42` | `Int(42)` |
//! | anything else | `Text` |

pub mod blob;
pub mod device;
pub mod error;
pub mod fields;
pub mod format;
pub mod record;
pub mod snapshot;

// Re-export main types
pub use blob::decode;
pub use device::{DeviceInfo, Reading, READINGS};
pub use error::{CoreError, CoreResult};
pub use fields::{keys, FieldDecode, QuotedDecoding};
pub use format::{FormatterKind, Passthrough, UptimeFormatter, ValueFormatter};
pub use record::{FieldValue, Record};
pub use snapshot::{Section, SectionData, Snapshot};
