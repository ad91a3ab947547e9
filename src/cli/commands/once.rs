use anyhow::{Context, Result};

use crate::cli::context::AppContext;
use crate::services::{IngestionScheduler, SchedulerConfig};

/// Run a single ingestion cycle and exit.
pub async fn execute(ctx: AppContext, json: bool) -> Result<()> {
    let scheduler = IngestionScheduler::new(
        ctx.feed,
        ctx.embedder,
        ctx.store.clone(),
        SchedulerConfig::from_settings(&ctx.config.ingestion),
    );

    let report = scheduler
        .run_once()
        .await
        .context("Ingestion cycle failed")?;

    if json {
        println!("{}", serde_json::json!({
            "fetched": report.fetched,
            "matched": report.matched,
            "upserted": report.upserted,
            "embed_failures": report.embed_failures,
            "upsert_failures": report.upsert_failures,
        }));
    } else {
        println!(
            "Fetched {} pools, {} on {}, {} persisted ({} without embedding, {} failed)",
            report.fetched,
            report.matched,
            ctx.config.ingestion.chain,
            report.upserted,
            report.embed_failures,
            report.upsert_failures,
        );
    }

    ctx.store.close().await;
    Ok(())
}
