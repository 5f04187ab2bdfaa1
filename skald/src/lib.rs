//! Skald telemetry configuration and console rendering.
//!
//! Skald resolves layered telemetry configuration (built-in defaults, an
//! optional YAML/JSON file, environment overrides, and named presets) and
//! renders finished span, metric, and log batches as human-readable console
//! text. It sits downstream of an OpenTelemetry-compatible collection
//! runtime: that runtime creates records, samples, batches, and calls the
//! exporters here at flush time. Skald never creates, mutates, or retries
//! telemetry data.
//!
//! # Modules
//!
//! - [`config`] - Layered configuration resolution and the preset catalog
//! - [`models`] - Finished telemetry records received from the runtime
//! - [`sampler`] - Sampling policy resolution consumed by the runtime
//! - [`render`] - Span, metric, and log console formatting
//! - [`export`] - Console exporters over a shared, serialized sink
//! - [`pipeline`] - Config-gated wiring of console exporters
//!
//! # Example
//!
//! ```
//! use skald::config::{EnvSnapshot, Loader};
//! use skald::pipeline::ConsolePipelines;
//!
//! let mut loader = Loader::with_env(EnvSnapshot::default());
//! let config = loader.load()?;
//! let pipelines = ConsolePipelines::from_config(&config)?;
//!
//! // Tracing and metrics are enabled by default; logging is opt-in.
//! assert!(pipelines.spans.is_some());
//! assert!(pipelines.logs.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod sampler;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;
