//! Yield feed adapters.

pub mod defillama;

pub use defillama::DefiLlamaClient;
