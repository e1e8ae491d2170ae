//! Status command - device identity and headline readings

use anyhow::{Context, Result};
use serde_json::json;
use swos_client::SwosClient;
use swos_core::{DeviceInfo, Snapshot, READINGS};

use crate::output::{OutputContext, OutputFormat, ReadingRow};

/// Headline readings of a snapshot, formatted with their units
pub(crate) fn reading_rows(snapshot: &Snapshot) -> Vec<ReadingRow> {
    READINGS
        .iter()
        .map(|reading| {
            let value = match (reading.value(snapshot), reading.unit) {
                (Some(value), Some(unit)) => format!("{} {}", value, unit),
                (Some(value), None) => value,
                (None, _) => "-".to_string(),
            };
            ReadingRow {
                reading: reading.label.to_string(),
                value,
                raw: snapshot
                    .field(reading.section, reading.key)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

/// Show device identity and readings
pub async fn status(client: &SwosClient, ctx: &OutputContext) -> Result<()> {
    let pb = ctx.spinner(&format!("Polling {}...", client.base_url()));
    let result = client.fetch_all().await;
    pb.finish_and_clear();

    let snapshot = result.context("Failed to poll device")?;
    let info = DeviceInfo::from_snapshot(&snapshot);
    let readings = reading_rows(&snapshot);

    if ctx.format == OutputFormat::Json {
        ctx.print_json(&json!({
            "device": info,
            "readings": readings,
        }));
        return Ok(());
    }

    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    ctx.print_kv(&[
        ("Name", info.name),
        ("Identifier", info.identifier),
        ("Manufacturer", info.manufacturer),
        ("Model", info.model),
        ("Version", or_dash(info.sw_version)),
        ("Serial", or_dash(info.serial_number)),
        ("MAC", or_dash(info.mac)),
        ("Web UI", or_dash(info.configuration_url)),
    ]);
    println!();
    ctx.print(&readings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swos_core::{decode, Section, SectionData};

    #[test]
    fn test_reading_rows() {
        let snapshot: Snapshot = [(
            Section::Sys,
            SectionData::Decoded(decode("{ver:'322e3133',upt:0x59614,temp:0x2a}")),
        )]
        .into_iter()
        .collect();

        let rows = reading_rows(&snapshot);
        let values: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.reading.as_str(), r.value.as_str(), r.raw.as_str()))
            .collect();

        assert_eq!(
            values,
            vec![
                ("temperature", "42 °C", "42"),
                ("uptime", "0:01:01:01", "366100"),
                ("version", "2.13", "2.13"),
                ("IP", "-", "-"),
            ]
        );
    }
}
