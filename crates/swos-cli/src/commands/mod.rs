//! Command implementations for swos-cli

pub mod dump;
pub mod section;
pub mod status;
pub mod watch;

pub use dump::dump;
pub use section::section;
pub use status::status;
pub use watch::watch;

use swos_core::Record;

use crate::output::FieldRow;

/// Table rows for every field of a record
pub(crate) fn field_rows(record: &Record) -> Vec<FieldRow> {
    record
        .iter()
        .map(|(key, value)| FieldRow {
            field: key.to_string(),
            value: value.to_string(),
            note: if record.is_degraded(key) {
                "undecoded".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}
