//! pubg-pipeline: Match acquisition for PUBG telemetry analysis.
//!
//! This crate ties the ingestion and telemetry layers together:
//!
//! 1. Lease an API key from the [`KeyPool`](pubg_ingestion::KeyPool)
//! 2. Discover a sample of recent match ids
//! 3. Drop ids the caller already has
//! 4. Resolve each remaining id to metadata and parsed telemetry
//!
//! Discovery repeats until enough matches are resolved, the source stops
//! producing new ids, or every key is out of requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use pubg_pipeline::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(source, telemetry, keys, PipelineConfig::from_env());
//! let acquisition = pipeline.acquire(5, &already_downloaded).await?;
//! println!("{:?}: {} matches", acquisition.stop_reason, acquisition.matches.len());
//! ```

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{
    Acquisition, AcquisitionTally, Pipeline, PipelineConfig, ResolvedMatch, StopReason,
    DEFAULT_CONCURRENCY, DEFAULT_MATCH_TIMEOUT, DEFAULT_MAX_DISCOVERY_ROUNDS,
};
