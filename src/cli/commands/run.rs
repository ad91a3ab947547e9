use anyhow::Result;

use crate::cli::context::AppContext;
use crate::services::{IngestionScheduler, SchedulerConfig, SchedulerEvent};

/// Run the ingestion scheduler until Ctrl-C.
pub async fn execute(ctx: AppContext, json: bool) -> Result<()> {
    let scheduler = IngestionScheduler::new(
        ctx.feed,
        ctx.embedder,
        ctx.store.clone(),
        SchedulerConfig::from_settings(&ctx.config.ingestion),
    );
    let handle = scheduler.handle();
    let mut events = scheduler.run().await;

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(SchedulerEvent::CycleCompleted { cycle_number, report, duration_ms }) => {
                        if json {
                            println!("{}", serde_json::json!({
                                "event": "cycle_completed",
                                "cycle": cycle_number,
                                "fetched": report.fetched,
                                "matched": report.matched,
                                "upserted": report.upserted,
                                "embed_failures": report.embed_failures,
                                "upsert_failures": report.upsert_failures,
                                "duration_ms": duration_ms,
                            }));
                        }
                    }
                    Some(SchedulerEvent::CycleFailed { cycle_number, error }) => {
                        if json {
                            println!("{}", serde_json::json!({
                                "event": "cycle_failed",
                                "cycle": cycle_number,
                                "error": error,
                            }));
                        }
                    }
                    Some(SchedulerEvent::Stopped) | None => break,
                    Some(_) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, stopping scheduler");
                handle.stop();
            }
        }
    }

    ctx.store.close().await;
    Ok(())
}
