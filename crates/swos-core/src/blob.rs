//! SwOS blob decoding
//!
//! SwOS serves its state as a brace-delimited list of `key:value` pairs:
//!
//! ```text
//! {id:'4d696b726f54696b',ver:'322e3133',ip:0x5000a8c0,upt:0x59614,temp:0x2a}
//! ```
//!
//! Values may themselves be `{...}` groups whose commas must not split the
//! outer list. Those groups are kept as opaque text.

use tracing::{debug, trace};

use crate::fields::{quoted_decoding, FieldDecode, DERIVED_FIELDS};
use crate::record::{FieldValue, Record};

/// Decode one blob into a record.
///
/// Never fails: malformed fragments are skipped, malformed values degrade to
/// their raw text, and non-blob input (an HTML error page, say) yields an
/// empty record.
pub fn decode(text: &str) -> Record {
    let mut record = Record::default();

    for pair in split_top_level(strip_outer_braces(text)) {
        let Some((key, value)) = pair.split_once(':') else {
            trace!("Skipping fragment without separator: {:?}", pair);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            trace!("Skipping fragment with empty key: {:?}", pair);
            continue;
        }

        match decode_value(key, value.trim()) {
            FieldDecode::Typed(value) => record.insert(key, value),
            FieldDecode::Degraded(raw) => {
                debug!("Field {} kept as raw text: {:?}", key, raw);
                record.insert_degraded(key, raw);
            }
        }
    }

    let derived: Vec<(&str, FieldValue)> = DERIVED_FIELDS
        .iter()
        .filter_map(|(source, target, derivation)| {
            record
                .get_int(source)
                .map(|raw| (*target, derivation.apply(raw)))
        })
        .collect();
    for (target, value) in derived {
        record.insert(target, value);
    }

    record
}

/// Remove one surrounding `{`/`}` pair, if present
fn strip_outer_braces(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(trimmed)
}

/// Split on commas at brace depth zero.
///
/// Depth changes on every brace, wherever it appears. A stray `}` drives the
/// depth negative, after which no further comma splits.
pub fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match ch {
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    parts.push(&body[start..]);

    parts
}

/// Type one trimmed value
fn decode_value(key: &str, value: &str) -> FieldDecode {
    if let Some(digits) = value.strip_prefix("0x") {
        return match i64::from_str_radix(digits, 16) {
            Ok(v) if !digits.starts_with(|c: char| c == '+' || c == '-') => {
                FieldDecode::Typed(FieldValue::Int(v))
            }
            _ => FieldDecode::Degraded(value.to_string()),
        };
    }

    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        let inner = &value[1..value.len() - 1];
        return quoted_decoding(key).decode(inner);
    }

    match value.parse::<i64>() {
        Ok(v) => FieldDecode::Typed(FieldValue::Int(v)),
        Err(_) => FieldDecode::Typed(FieldValue::Text(value.to_string())),
    }
}
