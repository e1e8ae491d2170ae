//! Async runtime for the CLI

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};

/// How long teardown waits for blocking requests still in flight
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Run `future` on a fresh multi-threaded runtime.
///
/// A poll abandoned on Ctrl+C can leave a blocking request running against
/// its own socket timeout; teardown detaches it after [`SHUTDOWN_GRACE`]
/// instead of waiting it out.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}
