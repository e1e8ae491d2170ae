//! Dump command - poll every section once

use anyhow::{Context, Result};
use swos_client::SwosClient;
use swos_core::SectionData;

use super::field_rows;
use crate::output::{preview, OutputContext, OutputFormat};

const RAW_PREVIEW_CHARS: usize = 200;

/// Fetch all sections and print every field
pub async fn dump(client: &SwosClient, ctx: &OutputContext) -> Result<()> {
    let pb = ctx.spinner(&format!("Polling {}...", client.base_url()));
    let result = client.fetch_all().await;
    pb.finish_and_clear();

    let snapshot = result.context("Failed to poll device")?;

    if ctx.format == OutputFormat::Json {
        ctx.print_json(&snapshot);
        return Ok(());
    }

    for (section, data) in snapshot.iter() {
        ctx.heading(&format!("[{}]", section));
        match data {
            SectionData::Decoded(record) => ctx.print(&field_rows(record)),
            SectionData::Raw { raw } => {
                ctx.warn("No decodable fields; raw body:");
                println!("{}", preview(raw, RAW_PREVIEW_CHARS));
            }
        }
        println!();
    }

    ctx.success(&format!("{} section(s) received", snapshot.len()));
    Ok(())
}
