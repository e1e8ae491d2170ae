//! Watch command - periodic polling until Ctrl+C

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use serde_json::json;
use swos_client::SwosClient;
use swos_core::Snapshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::status::reading_rows;
use crate::output::{OutputContext, OutputFormat};

/// Last snapshot that arrived, kept across failed polls
struct LastGood {
    snapshot: Snapshot,
    at: DateTime<Local>,
}

/// Poll the device every `poll_interval` until interrupted
pub async fn watch(client: &SwosClient, poll_interval: Duration, ctx: &OutputContext) -> Result<()> {
    ctx.info(&format!(
        "Polling {} every {}s",
        client.base_url(),
        poll_interval.as_secs()
    ));
    ctx.info("Press Ctrl+C to stop");

    let mut ticker = interval(poll_interval.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_good: Option<LastGood> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        // A poll in flight is abandoned on Ctrl+C
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = client.fetch_all() => result,
        };

        let now = Local::now();
        match result {
            Ok(snapshot) => {
                print_cycle(ctx, now, true, &snapshot);
                last_good = Some(LastGood { snapshot, at: now });
            }
            Err(e) => {
                debug!("Poll failed: {}", e);
                match &last_good {
                    Some(last) => {
                        ctx.warn(&format!(
                            "[{}] device unavailable ({}); last good poll at {}",
                            now.format("%H:%M:%S"),
                            e,
                            last.at.format("%H:%M:%S")
                        ));
                        print_cycle(ctx, now, false, &last.snapshot);
                    }
                    None => ctx.warn(&format!(
                        "[{}] device unavailable ({})",
                        now.format("%H:%M:%S"),
                        e
                    )),
                }
            }
        }
    }

    ctx.info("\nStopping...");
    client.close();
    ctx.success("Client closed");

    Ok(())
}

/// One line per cycle in table mode, one JSON object per line otherwise
fn print_cycle(ctx: &OutputContext, at: DateTime<Local>, available: bool, snapshot: &Snapshot) {
    match ctx.format {
        OutputFormat::Table => {
            let readings: Vec<String> = reading_rows(snapshot)
                .into_iter()
                .map(|row| format!("{}={}", row.reading, row.value))
                .collect();
            let marker = if available { "" } else { " (stale)" };
            println!(
                "[{}]{} {}",
                at.format("%H:%M:%S"),
                marker,
                readings.join("  ")
            );
        }
        OutputFormat::Json => {
            let line = json!({
                "timestamp": at.to_rfc3339(),
                "available": available,
                "snapshot": snapshot,
            });
            println!("{}", line);
        }
    }
}
