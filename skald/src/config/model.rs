//! Configuration model for telemetry resolution.
//!
//! This module defines the configuration tree deserialized from files and
//! assembled by the [`Loader`](crate::config::Loader). Signal blocks are
//! optional so partial files and presets can be merged; after resolution the
//! configuration is read-only.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::env::EnvSnapshot;

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "unnamed-service";

/// Preset applied when no `kind` is configured.
pub const DEFAULT_KIND: &str = "telemetry-to-console";

/// The resolved telemetry configuration.
///
/// # Examples
///
/// ```
/// use skald::config::{Config, EnvSnapshot};
///
/// let config = Config::defaults(&EnvSnapshot::default());
/// assert!(config.is_tracing_enabled());
/// assert!(config.is_metrics_enabled());
/// assert!(!config.is_logging_enabled());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Disables all telemetry when set.
    pub disabled: bool,
    /// Name of the service emitting telemetry.
    pub service_name: String,
    /// Name of the preset to merge into this configuration.
    pub kind: String,
    /// Tracing signal block.
    pub tracing: Option<TracingConfig>,
    /// Metrics signal block.
    pub metrics: Option<MetricsConfig>,
    /// Logging signal block.
    pub logging: Option<LoggingConfig>,
    /// Instrumentation toggles keyed by instrumentation name.
    pub instrumentations: BTreeMap<String, InstrumentationConfig>,
}

impl Config {
    /// Builds the default configuration from an environment snapshot.
    ///
    /// Tracing and metrics are enabled with console exporters, logging is
    /// disabled (opt-in). The snapshot supplies the handful of well-known
    /// variables (`NO_TELEMETRY`, `OTEL_SERVICE_NAME`, `TELEMETRY_KIND`,
    /// `TELEMETRY_HRTIME`, `HOST_METRICS_ENABLED`); passing the snapshot
    /// explicitly keeps default construction deterministic in tests.
    #[must_use]
    pub fn defaults(env: &EnvSnapshot) -> Self {
        let mut instrumentations = BTreeMap::new();
        instrumentations.insert(
            "http".to_string(),
            InstrumentationConfig {
                module: "otelhttp".to_string(),
                class: "HTTPInstrumentation".to_string(),
                config: BTreeMap::new(),
                enabled: true,
            },
        );

        Self {
            disabled: env.bool_flag("NO_TELEMETRY", false),
            service_name: env.string("OTEL_SERVICE_NAME", DEFAULT_SERVICE_NAME),
            kind: env.string("TELEMETRY_KIND", DEFAULT_KIND),
            tracing: Some(TracingConfig::defaults(env)),
            metrics: Some(MetricsConfig::defaults(env)),
            logging: Some(LoggingConfig::defaults()),
            instrumentations,
        }
    }

    /// Whether telemetry is enabled at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Whether the tracing signal is active.
    #[must_use]
    pub fn is_tracing_enabled(&self) -> bool {
        self.is_enabled() && self.tracing.as_ref().is_some_and(|t| t.enabled)
    }

    /// Whether the metrics signal is active.
    #[must_use]
    pub fn is_metrics_enabled(&self) -> bool {
        self.is_enabled() && self.metrics.as_ref().is_some_and(|m| m.enabled)
    }

    /// Whether the logging signal is active.
    #[must_use]
    pub fn is_logging_enabled(&self) -> bool {
        self.is_enabled() && self.logging.as_ref().is_some_and(|l| l.enabled)
    }
}

/// Configuration of the tracing signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Sampling policy specification. Required when tracing is enabled.
    pub sampler: Option<SamplerSpec>,
    /// Span exporter selection. Required when tracing is enabled.
    pub exporter: Option<ExporterSpec>,
    /// Whether the collection runtime should use high-resolution timestamps.
    pub hrtime: bool,
}

impl TracingConfig {
    fn defaults(env: &EnvSnapshot) -> Self {
        Self {
            enabled: true,
            sampler: Some(SamplerSpec {
                kind: "ParentBasedSampler".to_string(),
                root: "AlwaysOnSampler".to_string(),
                ratio: 0.0,
                ignore_incoming_paths: vec![
                    "/health".to_string(),
                    "/metrics".to_string(),
                    "/ready".to_string(),
                ],
            }),
            exporter: Some(ExporterSpec::console("ConsoleSpanExporter")),
            hrtime: env.bool_flag("TELEMETRY_HRTIME", false),
        }
    }
}

/// Configuration of the metrics signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Metric exporter selection. Required when metrics are enabled.
    pub exporter: Option<ExporterSpec>,
    /// Export scheduling settings.
    pub config: Option<MetricsExportConfig>,
    /// Whether database pool metrics are collected.
    pub db_pool: bool,
    /// Whether queue metrics are collected.
    pub queue: bool,
    /// Whether host metrics (CPU, memory) are collected.
    pub host_metrics: bool,
    /// Whether language runtime metrics (GC) are collected.
    pub runtime_metrics: bool,
}

impl MetricsConfig {
    fn defaults(env: &EnvSnapshot) -> Self {
        Self {
            enabled: true,
            exporter: Some(ExporterSpec::console("ConsoleMetricExporter")),
            config: Some(MetricsExportConfig {
                export_interval_millis: 60_000,
            }),
            db_pool: true,
            queue: true,
            host_metrics: env.bool_flag("HOST_METRICS_ENABLED", true),
            runtime_metrics: true,
        }
    }
}

/// Configuration of the logging signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether log export is enabled.
    pub enabled: bool,
    /// Log exporter selection. Required when logging is enabled.
    pub exporter: Option<ExporterSpec>,
}

impl LoggingConfig {
    fn defaults() -> Self {
        Self {
            enabled: false,
            exporter: Some(ExporterSpec::console("ConsoleLogExporter")),
        }
    }
}

/// Specification of the trace sampling policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSpec {
    /// Sampler kind, e.g. `ParentBasedSampler` or `TraceIdRatioBasedSampler`.
    pub kind: String,
    /// Root sampler kind used by a parent-based sampler for root spans.
    pub root: String,
    /// Sampling probability for ratio-based samplers.
    pub ratio: f64,
    /// Incoming request path prefixes excluded from tracing.
    pub ignore_incoming_paths: Vec<String>,
}

impl SamplerSpec {
    /// Whether the given incoming request path is excluded from tracing.
    ///
    /// Matching is by prefix, so `/health` also covers `/health/live`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skald::config::{Config, EnvSnapshot};
    ///
    /// let config = Config::defaults(&EnvSnapshot::default());
    /// let sampler = config.tracing.unwrap().sampler.unwrap();
    /// assert!(sampler.ignores_incoming_path("/health/live"));
    /// assert!(!sampler.ignores_incoming_path("/orders"));
    /// ```
    #[must_use]
    pub fn ignores_incoming_path(&self, path: &str) -> bool {
        self.ignore_incoming_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Selection of an exporter implementation for one signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterSpec {
    /// Exporter module identifier, e.g. `console` or `otlp`.
    pub module: String,
    /// Exporter class identifier within the module.
    pub class: String,
    /// Free-form exporter settings.
    pub config: BTreeMap<String, serde_json::Value>,
}

impl ExporterSpec {
    /// Creates a console exporter spec with the given class identifier.
    #[must_use]
    pub fn console(class: impl Into<String>) -> Self {
        Self {
            module: "console".to_string(),
            class: class.into(),
            config: BTreeMap::new(),
        }
    }
}

/// Export scheduling settings for the metrics signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsExportConfig {
    /// Export interval in milliseconds.
    pub export_interval_millis: i64,
}

impl MetricsExportConfig {
    /// The export interval as a duration, defaulting to 60 seconds when the
    /// configured value is non-positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use skald::config::MetricsExportConfig;
    ///
    /// let config = MetricsExportConfig { export_interval_millis: 30_000 };
    /// assert_eq!(config.export_interval(), Duration::from_secs(30));
    /// ```
    #[must_use]
    pub fn export_interval(&self) -> Duration {
        match u64::try_from(self.export_interval_millis) {
            Ok(millis) if millis > 0 => Duration::from_millis(millis),
            _ => Duration::from_secs(60),
        }
    }
}

/// Configuration of a single instrumentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Instrumentation module identifier.
    pub module: String,
    /// Instrumentation class identifier within the module.
    pub class: String,
    /// Free-form instrumentation settings.
    pub config: BTreeMap<String, serde_json::Value>,
    /// Whether this instrumentation is active.
    pub enabled: bool,
}
