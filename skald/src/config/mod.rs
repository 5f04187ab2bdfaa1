//! Telemetry configuration.
//!
//! Configuration is resolved in layers with fixed precedence: built-in
//! defaults, then an optional configuration file (YAML or JSON), then
//! environment variable overrides, then a named preset filling in missing
//! signal blocks, and finally validation.

pub mod env;
pub mod loader;
pub mod model;
pub mod presets;

pub use env::EnvSnapshot;
pub use loader::{write_config_file, ConfigError, Loader};
pub use model::{
    Config, ExporterSpec, InstrumentationConfig, LoggingConfig, MetricsConfig,
    MetricsExportConfig, SamplerSpec, TracingConfig, DEFAULT_KIND, DEFAULT_SERVICE_NAME,
};
pub use presets::{preset, preset_names, Preset};
