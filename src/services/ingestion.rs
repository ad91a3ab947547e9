//! Background ingestion scheduler.
//!
//! Periodically pulls the yield feed, keeps the pools on the configured
//! chain, embeds each snapshot's descriptive text, and persists the
//! result. One feed fetch per cycle; per-pool embedding or persistence
//! failures are counted and skipped so a bad pool never aborts the rest
//! of the cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::domain::errors::FeedError;
use crate::domain::models::PoolRecord;
use crate::domain::ports::{EmbeddingProvider, PoolFeed, RecordStore};

/// Configuration for the ingestion scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ingestion cycles.
    pub cycle_interval: Duration,
    /// Chain name pools must match exactly to be kept.
    pub chain: String,
    /// Whether to run a cycle immediately on startup.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(300), // 5 minutes
            chain: "Sonic".to_string(),
            run_on_startup: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            cycle_interval: interval,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &crate::domain::models::IngestionConfig) -> Self {
        Self {
            cycle_interval: Duration::from_secs(settings.interval_secs),
            chain: settings.chain.clone(),
            run_on_startup: settings.run_on_startup,
        }
    }
}

/// Lifecycle state of the scheduler.
///
/// Transitions: `Idle` → `Fetching` → `Processing` → `Sleeping` →
/// `Fetching` → … with `Stopped` reachable from any state and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet running.
    Idle,
    /// Pulling the feed.
    Fetching,
    /// Embedding and persisting matched pools.
    Processing,
    /// Waiting for the next cycle.
    Sleeping,
    /// Terminal. A stopped scheduler never runs again.
    Stopped,
}

/// Outcome of a single ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Pools returned by the feed, across all chains.
    pub fetched: usize,
    /// Pools on the configured chain.
    pub matched: usize,
    /// Snapshots persisted.
    pub upserted: usize,
    /// Pools persisted without an embedding because the provider failed.
    pub embed_failures: usize,
    /// Pools dropped because persistence failed.
    pub upsert_failures: usize,
}

/// Event emitted by the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// Scheduler started.
    Started,
    /// Cycle started.
    CycleStarted { cycle_number: u64 },
    /// Cycle completed.
    CycleCompleted {
        cycle_number: u64,
        report: CycleReport,
        duration_ms: u64,
    },
    /// Cycle aborted before processing (feed failure).
    CycleFailed { cycle_number: u64, error: String },
    /// Scheduler stopped.
    Stopped,
}

/// Status of the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// Current lifecycle state.
    pub state: SchedulerState,
    /// Total cycles attempted.
    pub total_cycles: u64,
    /// Cycles whose feed fetch succeeded.
    pub successful_cycles: u64,
    /// Cycles aborted by a feed failure.
    pub failed_cycles: u64,
    /// When the last cycle finished.
    pub last_cycle: Option<Instant>,
    /// Snapshots persisted over the scheduler's lifetime.
    pub total_upserted: u64,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: SchedulerState::Idle,
            total_cycles: 0,
            successful_cycles: 0,
            failed_cycles: 0,
            last_cycle: None,
            total_upserted: 0,
        }
    }
}

/// Handle to control a running scheduler.
pub struct SchedulerHandle {
    stop_flag: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
    status: Arc<RwLock<SchedulerStatus>>,
}

impl SchedulerHandle {
    /// Request the scheduler to stop. Idempotent.
    ///
    /// An in-progress cycle finishes first; a sleeping scheduler wakes
    /// and stops immediately.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check if stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Get current scheduler status.
    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }
}

/// Periodic feed-to-store ingestion scheduler.
pub struct IngestionScheduler {
    feed: Arc<dyn PoolFeed>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn RecordStore>,
    config: SchedulerConfig,
    status: Arc<RwLock<SchedulerStatus>>,
    stop_flag: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
}

impl IngestionScheduler {
    pub fn new(
        feed: Arc<dyn PoolFeed>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn RecordStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            feed,
            embedder,
            store,
            config,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stop_notify: Arc::new(Notify::new()),
        }
    }

    /// Get a handle to control the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_flag: self.stop_flag.clone(),
            stop_notify: self.stop_notify.clone(),
            status: self.status.clone(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get current status.
    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }

    /// Run the scheduler on a background task, returning its event channel.
    pub async fn run(self) -> mpsc::Receiver<SchedulerEvent> {
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            self.run_loop(tx).await;
        });

        rx
    }

    /// Run the scheduler on the current task with an existing sender.
    pub async fn run_with_sender(self, tx: mpsc::Sender<SchedulerEvent>) {
        self.run_loop(tx).await;
    }

    async fn run_loop(self, tx: mpsc::Sender<SchedulerEvent>) {
        let _ = tx.send(SchedulerEvent::Started).await;
        tracing::info!(
            interval_secs = self.config.cycle_interval.as_secs(),
            chain = %self.config.chain,
            "ingestion scheduler started"
        );

        let mut interval_timer = interval(self.config.cycle_interval);
        // A cycle slower than the interval must not be followed by
        // back-to-back catch-up ticks; the next fetch waits a full
        // interval after the late one.
        interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; consume it so the startup
        // cycle is governed by `run_on_startup` alone.
        interval_timer.tick().await;

        if self.config.run_on_startup && !self.stop_flag.load(Ordering::Acquire) {
            self.run_cycle(&tx).await;
            interval_timer.reset();
        }

        loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }

            self.set_state(SchedulerState::Sleeping).await;

            tokio::select! {
                _ = interval_timer.tick() => {
                    if self.stop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    self.run_cycle(&tx).await;
                    // Pace from cycle completion, so a slow cycle is
                    // always followed by a full interval of sleep.
                    interval_timer.reset();
                }
                () = self.stop_notify.notified() => {
                    break;
                }
            }
        }

        self.set_state(SchedulerState::Stopped).await;
        let _ = tx.send(SchedulerEvent::Stopped).await;
        tracing::info!("ingestion scheduler stopped");
    }

    async fn set_state(&self, state: SchedulerState) {
        let mut status = self.status.write().await;
        status.state = state;
    }

    /// Run a single ingestion cycle, updating status and emitting events.
    async fn run_cycle(&self, tx: &mpsc::Sender<SchedulerEvent>) {
        let cycle_number = {
            let mut status = self.status.write().await;
            status.total_cycles += 1;
            status.total_cycles
        };

        let _ = tx.send(SchedulerEvent::CycleStarted { cycle_number }).await;

        let start = Instant::now();
        let result = self.run_once().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                {
                    let mut status = self.status.write().await;
                    status.successful_cycles += 1;
                    status.last_cycle = Some(Instant::now());
                    status.total_upserted += report.upserted as u64;
                }

                tracing::info!(
                    cycle_number,
                    fetched = report.fetched,
                    matched = report.matched,
                    upserted = report.upserted,
                    embed_failures = report.embed_failures,
                    upsert_failures = report.upsert_failures,
                    duration_ms,
                    "ingestion cycle completed"
                );

                let _ = tx
                    .send(SchedulerEvent::CycleCompleted {
                        cycle_number,
                        report,
                        duration_ms,
                    })
                    .await;
            }
            Err(e) => {
                {
                    let mut status = self.status.write().await;
                    status.failed_cycles += 1;
                    status.last_cycle = Some(Instant::now());
                }

                tracing::warn!(cycle_number, error = %e, "ingestion cycle failed");

                let _ = tx
                    .send(SchedulerEvent::CycleFailed {
                        cycle_number,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Execute one ingestion cycle (also usable for manual invocation).
    ///
    /// A feed failure aborts the whole cycle. Per-pool embedding failures
    /// degrade that pool to an embedding-less snapshot; per-pool
    /// persistence failures drop that pool. Both are tallied in the
    /// returned [`CycleReport`].
    pub async fn run_once(&self) -> Result<CycleReport, FeedError> {
        self.set_state(SchedulerState::Fetching).await;

        let pools = self.feed.fetch_pools().await?;

        self.set_state(SchedulerState::Processing).await;
        let observed_at = Utc::now();

        let mut report = CycleReport {
            fetched: pools.len(),
            ..CycleReport::default()
        };

        let matched_any = pools
            .iter()
            .any(|p| p.chain.as_deref() == Some(self.config.chain.as_str()));
        if !matched_any {
            tracing::warn!(
                fetched = report.fetched,
                chain = %self.config.chain,
                "no pools matched the configured chain this cycle"
            );
            return Ok(report);
        }

        for raw in pools {
            if raw.chain.as_deref() != Some(self.config.chain.as_str()) {
                continue;
            }
            report.matched += 1;

            let record = PoolRecord::from_raw(raw, observed_at);

            let record = match self.embedder.embed(&record.embedding_text()).await {
                Ok(vector) => record.with_embedding(Some(vector)),
                Err(e) => {
                    report.embed_failures += 1;
                    tracing::warn!(
                        pool_id = %record.pool_id,
                        provider = self.embedder.name(),
                        error = %e,
                        "embedding failed, persisting snapshot without vector"
                    );
                    record
                }
            };

            match self.store.upsert(&record).await {
                Ok(()) => report.upserted += 1,
                Err(e) => {
                    report.upsert_failures += 1;
                    tracing::error!(
                        pool_id = %record.pool_id,
                        error = %e,
                        "failed to persist snapshot"
                    );
                }
            }
        }

        Ok(report)
    }
}
