//! Ingestion backend for the demand pipeline.
//!
//! Provides the concrete [`SourceFetcher`] (local files, HTTP, object-storage
//! blobs, inline uploads), the keyed TTL cache [`CachedSource`], and the
//! [`Loader`] that turns a [`LoadRequest`](demand_core::source::LoadRequest)
//! into a complete [`Dataset`](demand_core::Dataset).

mod cache;
mod config;
mod fetch;
mod loader;

pub use cache::CachedSource;
pub use config::IngestConfig;
pub use fetch::SourceFetcher;
pub use loader::{Loader, fingerprint};
