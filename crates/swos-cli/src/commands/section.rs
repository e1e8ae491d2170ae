//! Section command - fetch one section

use anyhow::{Context, Result};
use swos_client::SwosClient;
use swos_core::Section;

use super::field_rows;
use crate::output::{OutputContext, OutputFormat};

/// Fetch one section and print its fields
pub async fn section(client: &SwosClient, section: Section, ctx: &OutputContext) -> Result<()> {
    let pb = ctx.spinner(&format!("Fetching {}...", section));
    let result = client.fetch_section(section).await;
    pb.finish_and_clear();

    let record = result.with_context(|| format!("Failed to fetch section {}", section))?;

    match ctx.format {
        OutputFormat::Json => ctx.print_json(&record),
        OutputFormat::Table => {
            if record.is_empty() {
                ctx.warn(&format!("Section {} returned no decodable fields", section));
            } else {
                ctx.print(&field_rows(&record));
            }
        }
    }
    Ok(())
}
