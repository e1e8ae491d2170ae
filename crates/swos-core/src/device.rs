//! Device identity and headline readings derived from a snapshot

use serde::Serialize;

use crate::fields::{hex_to_mac, keys};
use crate::format::FormatterKind;
use crate::snapshot::{Section, Snapshot};

pub const MANUFACTURER: &str = "MikroTik";
pub const DEFAULT_MODEL: &str = "MikroTik SwOS";

/// Identity of the polled switch, built from the `sys` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Stable identifier: serial number if known, otherwise the IP
    pub identifier: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Primary MAC, lowercase colon-separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Web UI URL, only when the IP is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_url: Option<String>,
}

impl DeviceInfo {
    /// Build from a snapshot. Works with a missing or minimal `sys` section.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let text = |key: &str| {
            snapshot
                .field(Section::Sys, key)
                .map(|v| v.to_string())
                .filter(|s| !s.is_empty())
        };

        let ip = text(keys::IP_STR);
        let serial = text(keys::SERIAL);

        let identifier = match (&serial, &ip) {
            (Some(sid), _) => format!("swos_{}", sid),
            (None, Some(ip)) => format!("swos_{}", ip),
            (None, None) => "swos_unknown".to_string(),
        };

        let sw_version = match (text(keys::VERSION), text(keys::BUILD)) {
            (Some(ver), Some(bld)) => Some(format!("{} ({})", ver, bld)),
            (Some(ver), None) => Some(ver),
            (None, _) => None,
        };

        Self {
            identifier,
            name: format!("SwOS {}", ip.as_deref().unwrap_or_default()),
            manufacturer: MANUFACTURER.to_string(),
            model: text(keys::BOARD).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            sw_version,
            serial_number: serial,
            mac: text(keys::MAC).map(|mac| hex_to_mac(&mac).unwrap_or(mac)),
            configuration_url: ip.map(|ip| format!("http://{}", ip)),
        }
    }
}

/// One headline value shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Display label
    pub label: &'static str,
    pub section: Section,
    pub key: &'static str,
    pub unit: Option<&'static str>,
    pub formatter: FormatterKind,
}

/// Headline readings: temperature, uptime, firmware version, IP
pub const READINGS: &[Reading] = &[
    Reading {
        label: "temperature",
        section: Section::Sys,
        key: keys::TEMP_C,
        unit: Some("°C"),
        formatter: FormatterKind::Passthrough,
    },
    Reading {
        label: "uptime",
        section: Section::Sys,
        key: keys::UPTIME_SECONDS,
        unit: None,
        formatter: FormatterKind::Uptime,
    },
    Reading {
        label: "version",
        section: Section::Sys,
        key: keys::VERSION,
        unit: None,
        formatter: FormatterKind::Passthrough,
    },
    Reading {
        label: "IP",
        section: Section::Sys,
        key: keys::IP_STR,
        unit: None,
        formatter: FormatterKind::Passthrough,
    },
];

impl Reading {
    /// Formatted value from a snapshot, `None` when absent or unformattable
    pub fn value(&self, snapshot: &Snapshot) -> Option<String> {
        self.formatter
            .formatter()
            .format(snapshot.field(self.section, self.key))
            .map(|v| v.to_string())
    }
}
