//! Pool snapshot models and the raw-feed normalization boundary.
//!
//! [`RawPool`] mirrors the upstream JSON, where every field may be missing
//! or null. [`PoolRecord`] is the fixed persisted shape. The only way to get
//! from one to the other is [`PoolRecord::from_raw`], which applies the
//! defaulting rules exactly once, immediately after fetch — untyped data
//! never flows past that point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel for descriptive fields the upstream omitted.
pub const UNKNOWN: &str = "Unknown";

/// One pool object as returned by the upstream feed.
///
/// All fields are optional; the feed routinely omits or nulls any of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    /// Upstream pool identifier. Not guaranteed unique across chains/time.
    #[serde(default)]
    pub pool: Option<String>,
    /// Blockchain the pool lives on (e.g. "Sonic").
    #[serde(default)]
    pub chain: Option<String>,
    /// Protocol / project name.
    #[serde(default)]
    pub project: Option<String>,
    /// Token pair symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Total value locked in USD.
    #[serde(default)]
    pub tvl_usd: Option<f64>,
    /// Current annual percentage yield.
    #[serde(default)]
    pub apy: Option<f64>,
    #[serde(default)]
    pub apy_base: Option<f64>,
    #[serde(default)]
    pub apy_reward: Option<f64>,
    #[serde(default)]
    pub apy_mean_30d: Option<f64>,
    #[serde(default, rename = "apyPct1D")]
    pub apy_pct_1d: Option<f64>,
    #[serde(default, rename = "apyPct7D")]
    pub apy_pct_7d: Option<f64>,
    #[serde(default, rename = "apyPct30D")]
    pub apy_pct_30d: Option<f64>,
    /// Reward token identifiers, in upstream order.
    #[serde(default)]
    pub reward_tokens: Option<Vec<String>>,
    /// Opaque prediction payload; passed through untouched.
    #[serde(default)]
    pub predictions: Option<serde_json::Value>,
}

/// One immutable observation of a pool's metrics at a point in time.
///
/// Every persisted record has a unique generated `id`, distinct from the
/// upstream `pool_id`. Numeric fields are always defined (coerced to 0 when
/// missing upstream) so ranking and filtering arithmetic stays total.
/// History is append-only: records are never mutated or deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Generated unique record id, stable per write.
    pub id: Uuid,
    /// Upstream natural key; falls back to `id` when the feed omitted it.
    pub pool_id: String,
    pub chain: String,
    pub project: String,
    pub symbol: String,
    pub tvl_usd: f64,
    pub apy: f64,
    pub apy_base: f64,
    pub apy_reward: f64,
    pub apy_mean_30d: f64,
    pub apy_pct_1d: f64,
    pub apy_pct_7d: f64,
    pub apy_pct_30d: f64,
    /// Reward token identifiers, possibly empty.
    pub reward_tokens: Vec<String>,
    /// Opaque structured payload from the feed, possibly an empty object.
    pub predictions: serde_json::Value,
    /// Upstream-implied time of the snapshot (the fetch instant).
    pub observed_at: DateTime<Utc>,
    /// Time of local persistence; may diverge from `observed_at` under retry.
    pub created_at: DateTime<Utc>,
    /// Absent when the embedding provider failed for this record. Absence
    /// means "not eligible for similarity search", never a zero vector.
    pub embedding: Option<Vec<f32>>,
}

/// A record paired with its similarity to a query vector.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    pub record: PoolRecord,
    /// `1 - cosine_distance` against the query vector, in `[0, 1]` for
    /// non-degenerate vectors.
    pub similarity: f32,
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

impl PoolRecord {
    /// Normalize a raw feed entry into the fixed persisted shape.
    ///
    /// Missing strings become [`UNKNOWN`], missing numerics become 0,
    /// missing sequences become empty; nothing stays null. `observed_at` is
    /// the snapshot time of the enclosing cycle; `created_at` is stamped
    /// here, at record construction.
    pub fn from_raw(raw: RawPool, observed_at: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            pool_id: raw.pool.filter(|s| !s.is_empty()).unwrap_or_else(|| id.to_string()),
            chain: or_unknown(raw.chain),
            project: or_unknown(raw.project),
            symbol: or_unknown(raw.symbol),
            tvl_usd: raw.tvl_usd.unwrap_or(0.0),
            apy: raw.apy.unwrap_or(0.0),
            apy_base: raw.apy_base.unwrap_or(0.0),
            apy_reward: raw.apy_reward.unwrap_or(0.0),
            apy_mean_30d: raw.apy_mean_30d.unwrap_or(0.0),
            apy_pct_1d: raw.apy_pct_1d.unwrap_or(0.0),
            apy_pct_7d: raw.apy_pct_7d.unwrap_or(0.0),
            apy_pct_30d: raw.apy_pct_30d.unwrap_or(0.0),
            reward_tokens: raw.reward_tokens.unwrap_or_default(),
            predictions: raw.predictions.unwrap_or_else(|| serde_json::json!({})),
            observed_at,
            created_at: Utc::now(),
            embedding: None,
        }
    }

    /// Text fed to the embedding provider.
    ///
    /// Fixed field order so semantically similar pools produce vectors that
    /// cluster.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} TVL: {} APY: {}",
            self.chain, self.project, self.symbol, self.tvl_usd, self.apy
        )
    }

    /// Attach a computed embedding.
    pub fn with_embedding(mut self, embedding: Option<Vec<f32>>) -> Self {
        self.embedding = embedding;
        self
    }
}
