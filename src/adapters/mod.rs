//! Outward-facing adapters: persistence, feed, and embedding backends.

pub mod embeddings;
pub mod feed;
pub mod sqlite;
