use anyhow::{Context, Result};

use crate::cli::context::AppContext;
use crate::cli::output::format_snapshot_table;

/// List stored snapshots, newest first.
pub async fn execute(ctx: AppContext, limit: Option<u32>, json: bool) -> Result<()> {
    let records = ctx
        .store
        .list(limit)
        .await
        .context("Failed to list snapshots")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No snapshots stored yet. Run `poolwatch once` to ingest.");
    } else {
        println!("{}", format_snapshot_table(&records));
        println!(
            "\nShowing {} snapshot{}",
            records.len(),
            if records.len() == 1 { "" } else { "s" }
        );
    }

    ctx.store.close().await;
    Ok(())
}
