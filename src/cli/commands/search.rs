use anyhow::{Context, Result};

use crate::cli::context::AppContext;
use crate::cli::output::format_search_table;
use crate::services::QueryService;

/// Search stored snapshots by semantic similarity.
pub async fn execute(
    ctx: AppContext,
    query: &str,
    threshold: f32,
    top_k: usize,
    json: bool,
) -> Result<()> {
    let service = QueryService::new(ctx.embedder.clone(), ctx.store.clone());

    let results = service
        .search(query, threshold, top_k)
        .await
        .context("Search failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No snapshots matched \"{query}\" at threshold {threshold}.");
    } else {
        println!("{}", format_search_table(&results));
        println!(
            "\n{} result{} for \"{query}\"",
            results.len(),
            if results.len() == 1 { "" } else { "s" }
        );
    }

    ctx.store.close().await;
    Ok(())
}
