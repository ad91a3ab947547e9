//! Application services composed from domain ports.

pub mod ingestion;
pub mod query;

pub use ingestion::{
    CycleReport, IngestionScheduler, SchedulerConfig, SchedulerEvent, SchedulerHandle,
    SchedulerState, SchedulerStatus,
};
pub use query::{QueryService, DEFAULT_THRESHOLD, DEFAULT_TOP_K};
