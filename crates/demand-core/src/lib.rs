//! Core types for the biometric demand pipeline.
//!
//! This crate holds the data model, the pipeline configuration, the error
//! taxonomy, and the pure derivation and aggregation steps. It has no HTTP or
//! CSV dependencies; `demand-csv` decodes raw tables into the input types
//! defined here and `demand-ingest` drives the whole load.

pub mod aggregate;
pub mod biometric;
pub mod config;
pub mod dataset;
pub mod error;
pub mod forecast;
pub mod source;

pub use config::PipelineConfig;
pub use dataset::Dataset;
pub use error::{Error, ErrorKind, Result, SchemaProblem, Table};
