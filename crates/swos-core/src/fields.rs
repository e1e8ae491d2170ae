//! Field names and per-field decoding policy
//!
//! SwOS quotes hex-encoded byte strings (`'32302e3133'`). What those bytes
//! mean depends on the field, so the decoder consults [`QUOTED_FIELD_POLICY`]
//! once per quoted value instead of branching on names inline.

use std::net::Ipv4Addr;

use crate::record::FieldValue;

/// Well-known field names
pub mod keys {
    /// Firmware version (hex ASCII)
    pub const VERSION: &str = "ver";
    /// Device identity (hex ASCII)
    pub const IDENTITY: &str = "id";
    /// Board name (hex ASCII)
    pub const BOARD: &str = "brd";
    /// Market code (hex ASCII)
    pub const MARKET: &str = "mrkt";
    /// Serial number (hex ASCII)
    pub const SERIAL: &str = "sid";
    /// Build date/time
    pub const BUILD: &str = "bld";
    /// Primary MAC address (hex bytes)
    pub const MAC: &str = "mac";
    /// Remote MAC address (hex bytes)
    pub const REMOTE_MAC: &str = "rmac";
    /// Device IP (little-endian integer)
    pub const IP: &str = "ip";
    /// Client/secondary IP (little-endian integer)
    pub const CLIENT_IP: &str = "cip";
    /// Board temperature in °C
    pub const TEMPERATURE: &str = "temp";
    /// Uptime in centiseconds
    pub const UPTIME: &str = "upt";

    /// Dotted-quad rendering of `ip`
    pub const IP_STR: &str = "ip_str";
    /// Dotted-quad rendering of `cip`
    pub const CLIENT_IP_STR: &str = "cip_str";
    /// Celsius alias of `temp`
    pub const TEMP_C: &str = "temp_c";
    /// Alias of `upt` (still centiseconds)
    pub const UPTIME_SECONDS: &str = "uptime_seconds";
}

/// How the hex payload of a quoted value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotedDecoding {
    /// Hex bytes decoded as ASCII, non-ASCII bytes dropped
    Ascii,
    /// Hex bytes rendered as lowercase colon-separated octets
    Mac,
    /// Inner text kept as-is
    Raw,
}

/// Quoted fields with a known interpretation. Anything else is `Raw`.
pub const QUOTED_FIELD_POLICY: &[(&str, QuotedDecoding)] = &[
    (keys::VERSION, QuotedDecoding::Ascii),
    (keys::IDENTITY, QuotedDecoding::Ascii),
    (keys::BOARD, QuotedDecoding::Ascii),
    (keys::MARKET, QuotedDecoding::Ascii),
    (keys::SERIAL, QuotedDecoding::Ascii),
    (keys::MAC, QuotedDecoding::Mac),
    (keys::REMOTE_MAC, QuotedDecoding::Mac),
];

/// Look up the decoding policy for a quoted field
pub fn quoted_decoding(key: &str) -> QuotedDecoding {
    QUOTED_FIELD_POLICY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, decoding)| *decoding)
        .unwrap_or(QuotedDecoding::Raw)
}

/// How a derived field is computed from its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Little-endian byte layout of the integer read as IPv4 octets
    Ipv4LittleEndian,
    /// Same integer under another name
    Alias,
}

/// Derived fields: (source, target, derivation). Sources are raw fields only.
pub const DERIVED_FIELDS: &[(&str, &str, Derivation)] = &[
    (keys::IP, keys::IP_STR, Derivation::Ipv4LittleEndian),
    (keys::CLIENT_IP, keys::CLIENT_IP_STR, Derivation::Ipv4LittleEndian),
    (keys::TEMPERATURE, keys::TEMP_C, Derivation::Alias),
    (keys::UPTIME, keys::UPTIME_SECONDS, Derivation::Alias),
];

impl Derivation {
    /// Compute the derived value from the source integer
    pub fn apply(self, source: i64) -> FieldValue {
        match self {
            Derivation::Ipv4LittleEndian => FieldValue::Text(ipv4_from_le(source)),
            Derivation::Alias => FieldValue::Int(source),
        }
    }
}

/// Outcome of decoding one field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecode {
    /// Value resolved to its intended type
    Typed(FieldValue),
    /// Typed decoding failed; the original token is kept as text
    Degraded(String),
}

impl QuotedDecoding {
    /// Decode the inner text of a quoted value
    pub fn decode(self, inner: &str) -> FieldDecode {
        match self {
            QuotedDecoding::Ascii => match hex_to_ascii(inner) {
                Some(text) => FieldDecode::Typed(FieldValue::Text(text)),
                None => FieldDecode::Degraded(inner.to_string()),
            },
            QuotedDecoding::Mac => match hex_to_mac(inner) {
                Some(mac) => FieldDecode::Typed(FieldValue::Text(mac)),
                None => FieldDecode::Degraded(inner.to_string()),
            },
            QuotedDecoding::Raw => FieldDecode::Typed(FieldValue::Text(inner.to_string())),
        }
    }
}

/// Decode hex bytes as ASCII, dropping bytes outside the ASCII range.
///
/// Returns `None` for malformed hex.
pub fn hex_to_ascii(hex_str: &str) -> Option<String> {
    let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(compact).ok()?;
    Some(
        bytes
            .into_iter()
            .filter(u8::is_ascii)
            .map(char::from)
            .collect(),
    )
}

/// Render hex bytes as a lowercase colon-separated MAC address.
///
/// `:`/`-` separators and whitespace in the source are ignored, case is
/// normalized. Returns `None` for malformed or empty hex.
pub fn hex_to_mac(hex_str: &str) -> Option<String> {
    let compact: String = hex_str
        .chars()
        .filter(|c| !matches!(c, ':' | '-') && !c.is_whitespace())
        .collect();
    let bytes = hex::decode(compact).ok()?;
    if bytes.is_empty() {
        return None;
    }
    Some(
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

/// Render an integer holding network-order address bytes in little-endian
/// layout (`0x5000a8c0` is `192.168.0.80`).
///
/// Values that do not fit in 32 bits are rendered as the decimal integer.
pub fn ipv4_from_le(value: i64) -> String {
    match u32::try_from(value) {
        Ok(v) => Ipv4Addr::from(v.to_le_bytes()).to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_lookup() {
        assert_eq!(quoted_decoding("ver"), QuotedDecoding::Ascii);
        assert_eq!(quoted_decoding("sid"), QuotedDecoding::Ascii);
        assert_eq!(quoted_decoding("rmac"), QuotedDecoding::Mac);
        assert_eq!(quoted_decoding("nm"), QuotedDecoding::Raw);
    }

    #[test]
    fn test_hex_to_ascii() {
        assert_eq!(hex_to_ascii("32302e3133").as_deref(), Some("20.13"));
        assert_eq!(hex_to_ascii("").as_deref(), Some(""));
        // 0xff and 0x80 are not ASCII and are dropped
        assert_eq!(hex_to_ascii("41ff4280").as_deref(), Some("AB"));
        assert_eq!(hex_to_ascii("4"), None);
        assert_eq!(hex_to_ascii("zz"), None);
    }

    #[test]
    fn test_hex_to_mac() {
        assert_eq!(
            hex_to_mac("AABBCCDDEEFF").as_deref(),
            Some("aa:bb:cc:dd:ee:ff")
        );
        assert_eq!(
            hex_to_mac("AA-BB-CC-DD-EE-FF").as_deref(),
            Some("aa:bb:cc:dd:ee:ff")
        );
        assert_eq!(
            hex_to_mac("64:d1:54:01:02:03").as_deref(),
            Some("64:d1:54:01:02:03")
        );
        assert_eq!(hex_to_mac(""), None);
        assert_eq!(hex_to_mac("not-a-mac"), None);
    }

    #[test]
    fn test_ipv4_from_le() {
        assert_eq!(ipv4_from_le(0x5000a8c0), "192.168.0.80");
        assert_eq!(ipv4_from_le(0x0a00a8c0), "192.168.0.10");
        assert_eq!(ipv4_from_le(0), "0.0.0.0");
        assert_eq!(ipv4_from_le(-1), "-1");
        assert_eq!(ipv4_from_le(0x1_0000_0000), "4294967296");
    }

    #[test]
    fn test_quoted_decoding_outcomes() {
        assert_eq!(
            QuotedDecoding::Ascii.decode("322e3133"),
            FieldDecode::Typed(FieldValue::from("2.13"))
        );
        assert_eq!(
            QuotedDecoding::Mac.decode("xyz"),
            FieldDecode::Degraded("xyz".to_string())
        );
        // Raw fields are never hex-decoded
        assert_eq!(
            QuotedDecoding::Raw.decode("506f727431"),
            FieldDecode::Typed(FieldValue::from("506f727431"))
        );
    }
}
