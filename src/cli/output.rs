//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use crate::domain::models::{PoolRecord, ScoredRecord};

fn create_base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|l| Cell::new(l).add_attribute(Attribute::Bold))
        .collect()
}

fn format_usd(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${value:.2}")
    }
}

/// Format stored snapshots as a table, newest first.
pub fn format_snapshot_table(records: &[PoolRecord]) -> String {
    let mut table = create_base_table();
    table.set_header(header(&[
        "Pool", "Chain", "Project", "Symbol", "TVL", "APY", "Observed",
    ]));

    for record in records {
        table.add_row(vec![
            Cell::new(truncate_text(&record.pool_id, 20)),
            Cell::new(&record.chain),
            Cell::new(&record.project),
            Cell::new(truncate_text(&record.symbol, 16)),
            Cell::new(format_usd(record.tvl_usd)),
            Cell::new(format!("{:.2}%", record.apy)),
            Cell::new(record.observed_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ]);
    }

    table.to_string()
}

/// Format search results as a table, best match first.
pub fn format_search_table(results: &[ScoredRecord]) -> String {
    let mut table = create_base_table();
    table.set_header(header(&[
        "Score", "Pool", "Project", "Symbol", "TVL", "APY", "Observed",
    ]));

    for scored in results {
        let record = &scored.record;
        table.add_row(vec![
            Cell::new(format!("{:.3}", scored.similarity)),
            Cell::new(truncate_text(&record.pool_id, 20)),
            Cell::new(&record.project),
            Cell::new(truncate_text(&record.symbol, 16)),
            Cell::new(format_usd(record.tvl_usd)),
            Cell::new(format!("{:.2}%", record.apy)),
            Cell::new(record.observed_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ]);
    }

    table.to_string()
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
