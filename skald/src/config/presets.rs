//! Preset catalog.
//!
//! A preset is a named bundle of partial signal blocks merged into a
//! configuration by the resolver. The catalog is fixed at compile time and
//! shared process-wide. Only the `console` exporter module is implemented
//! here; the other module identifiers are pass-through values for an
//! external exporter factory.

use std::sync::OnceLock;

use crate::config::model::{ExporterSpec, LoggingConfig, MetricsConfig, TracingConfig};

/// A named bundle of partial signal blocks.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Catalog key. Matches the configuration's `kind` field.
    pub name: &'static str,
    /// Tracing block offered by this preset.
    pub tracing: Option<TracingConfig>,
    /// Metrics block offered by this preset.
    pub metrics: Option<MetricsConfig>,
    /// Logging block offered by this preset.
    pub logging: Option<LoggingConfig>,
}

static CATALOG: OnceLock<Vec<Preset>> = OnceLock::new();

fn catalog() -> &'static [Preset] {
    CATALOG.get_or_init(|| {
        vec![
            Preset {
                name: "telemetry-to-console",
                tracing: Some(tracing_with(exporter("console", "ConsoleSpanExporter"))),
                metrics: Some(metrics_with(exporter("console", "ConsoleMetricExporter"))),
                logging: None,
            },
            Preset {
                name: "telemetry-to-dynatrace",
                tracing: Some(tracing_with(exporter("otlp", "OTLPTraceExporter"))),
                metrics: Some(metrics_with(exporter("otlp", "OTLPMetricExporter"))),
                logging: None,
            },
            Preset {
                name: "telemetry-to-cloud-logging",
                tracing: Some(tracing_with(exporter("otlp-grpc", "OTLPTraceExporter"))),
                metrics: Some(metrics_with(exporter("otlp-grpc", "OTLPMetricExporter"))),
                logging: None,
            },
            Preset {
                name: "telemetry-to-jaeger",
                tracing: Some(tracing_with(exporter("jaeger", "JaegerExporter"))),
                metrics: None,
                logging: None,
            },
            Preset {
                name: "telemetry-to-otlp",
                tracing: Some(tracing_with(exporter("otlp-env", "OTLPTraceExporter"))),
                metrics: Some(metrics_with(exporter("otlp-env", "OTLPMetricExporter"))),
                logging: None,
            },
        ]
    })
}

fn exporter(module: &str, class: &str) -> ExporterSpec {
    ExporterSpec {
        module: module.to_string(),
        class: class.to_string(),
        config: std::collections::BTreeMap::new(),
    }
}

fn tracing_with(exporter: ExporterSpec) -> TracingConfig {
    TracingConfig {
        enabled: true,
        exporter: Some(exporter),
        ..TracingConfig::default()
    }
}

fn metrics_with(exporter: ExporterSpec) -> MetricsConfig {
    MetricsConfig {
        enabled: true,
        exporter: Some(exporter),
        ..MetricsConfig::default()
    }
}

/// Looks up a preset by name.
///
/// # Examples
///
/// ```
/// use skald::config::preset;
///
/// let console = preset("telemetry-to-console").unwrap();
/// assert_eq!(console.tracing.as_ref().unwrap().exporter.as_ref().unwrap().module, "console");
/// assert!(preset("telemetry-to-nowhere").is_none());
/// ```
#[must_use]
pub fn preset(name: &str) -> Option<&'static Preset> {
    catalog().iter().find(|p| p.name == name)
}

/// The names of all presets in the catalog.
#[must_use]
pub fn preset_names() -> Vec<&'static str> {
    catalog().iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_completeness() {
        let names = preset_names();
        for expected in [
            "telemetry-to-console",
            "telemetry-to-dynatrace",
            "telemetry-to-cloud-logging",
            "telemetry-to-jaeger",
            "telemetry-to-otlp",
        ] {
            assert!(names.contains(&expected), "missing preset {expected}");
        }
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_console_preset_exporters() {
        let console = preset("telemetry-to-console").unwrap();

        let tracing = console.tracing.as_ref().unwrap();
        assert!(tracing.enabled);
        let exporter = tracing.exporter.as_ref().unwrap();
        assert_eq!(exporter.module, "console");
        assert_eq!(exporter.class, "ConsoleSpanExporter");

        let metrics = console.metrics.as_ref().unwrap();
        let exporter = metrics.exporter.as_ref().unwrap();
        assert_eq!(exporter.module, "console");
        assert_eq!(exporter.class, "ConsoleMetricExporter");
    }

    #[test]
    fn test_jaeger_preset_tracing_only() {
        let jaeger = preset("telemetry-to-jaeger").unwrap();

        assert_eq!(
            jaeger.tracing.as_ref().unwrap().exporter.as_ref().unwrap().module,
            "jaeger"
        );
        assert!(jaeger.metrics.is_none());
        assert!(jaeger.logging.is_none());
    }

    #[test]
    fn test_preset_blocks_carry_no_sampler() {
        for name in preset_names() {
            let p = preset(name).unwrap();
            if let Some(tracing) = &p.tracing {
                assert!(tracing.sampler.is_none(), "{name} should not set a sampler");
            }
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(preset("telemetry-to-nowhere").is_none());
        assert!(preset("").is_none());
    }
}
