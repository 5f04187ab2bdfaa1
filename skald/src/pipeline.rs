//! Config-gated wiring of console exporters.
//!
//! The pipeline layer turns a resolved [`Config`] into the set of console
//! exporters its signal toggles ask for. All exporters share one sink so
//! concurrent flushes never interleave on the terminal.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::export::{
    ConsoleLogExporter, ConsoleMetricExporter, ConsoleSink, ConsoleSpanExporter, ExportError,
};
use crate::render::{LogStyle, Theme};

/// The only exporter module this crate can build.
const CONSOLE_MODULE: &str = "console";

/// Errors raised while wiring exporters from a config.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A signal is enabled but its exporter names a module other than
    /// `console`.
    #[error("unsupported {signal} exporter: {module}")]
    UnsupportedExporter {
        /// The signal whose exporter could not be built.
        signal: &'static str,
        /// The exporter module the config asked for.
        module: String,
    },
}

/// Console exporters for the signals a config enables.
///
/// Disabled signals stay `None`. A fully disabled config produces three
/// `None` pipelines without touching the sink.
#[derive(Debug, Default)]
pub struct ConsolePipelines {
    /// Span exporter, present when tracing is enabled.
    pub spans: Option<ConsoleSpanExporter>,
    /// Metric exporter, present when metrics are enabled.
    pub metrics: Option<ConsoleMetricExporter>,
    /// Log exporter, present when logging is enabled.
    pub logs: Option<ConsoleLogExporter>,
}

impl ConsolePipelines {
    /// Builds pipelines writing to standard output with ANSI colors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedExporter`] when an enabled signal
    /// names a non-console exporter module.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        Self::with_sink(config, ConsoleSink::stdout(), Theme::default())
    }

    /// Builds pipelines writing to the given sink.
    ///
    /// Every built exporter shares the sink, whole batches are serialized
    /// behind its lock.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedExporter`] when an enabled signal
    /// names a non-console exporter module.
    pub fn with_sink(
        config: &Config,
        sink: ConsoleSink,
        theme: Theme,
    ) -> Result<Self, PipelineError> {
        if !config.is_enabled() {
            debug!("telemetry is disabled");
            return Ok(Self::default());
        }

        let mut pipelines = Self::default();

        if config.is_tracing_enabled() {
            if let Some(spec) = config.tracing.as_ref().and_then(|t| t.exporter.as_ref()) {
                check_module("trace", &spec.module)?;
                pipelines.spans =
                    Some(ConsoleSpanExporter::with_sink(sink.clone()).with_theme(theme));
            }
        }

        if config.is_metrics_enabled() {
            if let Some(spec) = config.metrics.as_ref().and_then(|m| m.exporter.as_ref()) {
                check_module("metric", &spec.module)?;
                pipelines.metrics =
                    Some(ConsoleMetricExporter::with_sink(sink.clone()).with_theme(theme));
            }
        }

        if config.is_logging_enabled() {
            if let Some(spec) = config.logging.as_ref().and_then(|l| l.exporter.as_ref()) {
                check_module("log", &spec.module)?;
                pipelines.logs = Some(
                    ConsoleLogExporter::with_sink(sink)
                        .with_theme(theme)
                        .with_style(LogStyle::from_spec(spec)),
                );
            }
        }

        info!(kind = %config.kind, "telemetry pipelines initialized");
        Ok(pipelines)
    }

    /// Shuts down every built exporter.
    ///
    /// # Errors
    ///
    /// Never fails today, console exporters shut down immediately.
    pub fn shutdown(&self) -> Result<(), ExportError> {
        if let Some(spans) = &self.spans {
            spans.shutdown()?;
        }
        if let Some(metrics) = &self.metrics {
            metrics.shutdown()?;
        }
        if let Some(logs) = &self.logs {
            logs.shutdown()?;
        }
        Ok(())
    }

    /// Flushes every built exporter.
    ///
    /// # Errors
    ///
    /// Never fails today, console exporters flush during export.
    pub fn force_flush(&self) -> Result<(), ExportError> {
        if let Some(spans) = &self.spans {
            spans.force_flush()?;
        }
        if let Some(metrics) = &self.metrics {
            metrics.force_flush()?;
        }
        if let Some(logs) = &self.logs {
            logs.force_flush()?;
        }
        Ok(())
    }
}

fn check_module(signal: &'static str, module: &str) -> Result<(), PipelineError> {
    if module == CONSOLE_MODULE {
        Ok(())
    } else {
        Err(PipelineError::UnsupportedExporter {
            signal,
            module: module.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSnapshot;

    fn config() -> Config {
        Config::defaults(&EnvSnapshot::default())
    }

    #[test]
    fn test_default_config_builds_span_and_metric_pipelines() {
        let pipelines = ConsolePipelines::from_config(&config()).unwrap();

        assert!(pipelines.spans.is_some());
        assert!(pipelines.metrics.is_some());
        assert!(pipelines.logs.is_none());
    }

    #[test]
    fn test_disabled_config_builds_nothing() {
        let mut config = config();
        config.disabled = true;

        let pipelines = ConsolePipelines::from_config(&config).unwrap();

        assert!(pipelines.spans.is_none());
        assert!(pipelines.metrics.is_none());
        assert!(pipelines.logs.is_none());
    }

    #[test]
    fn test_disabled_signal_is_skipped() {
        let mut config = config();
        if let Some(metrics) = config.metrics.as_mut() {
            metrics.enabled = false;
        }

        let pipelines = ConsolePipelines::from_config(&config).unwrap();

        assert!(pipelines.spans.is_some());
        assert!(pipelines.metrics.is_none());
    }

    #[test]
    fn test_unsupported_trace_exporter() {
        let mut config = config();
        if let Some(tracing) = config.tracing.as_mut() {
            if let Some(exporter) = tracing.exporter.as_mut() {
                exporter.module = "otlp".to_string();
            }
        }

        let err = ConsolePipelines::from_config(&config).unwrap_err();

        assert_eq!(err.to_string(), "unsupported trace exporter: otlp");
    }

    #[test]
    fn test_unsupported_metric_exporter() {
        let mut config = config();
        if let Some(metrics) = config.metrics.as_mut() {
            if let Some(exporter) = metrics.exporter.as_mut() {
                exporter.module = "otlp-grpc".to_string();
            }
        }

        let err = ConsolePipelines::from_config(&config).unwrap_err();

        assert_eq!(err.to_string(), "unsupported metric exporter: otlp-grpc");
    }

    #[test]
    fn test_log_pipeline_reads_style_from_config() {
        let mut config = config();
        if let Some(logging) = config.logging.as_mut() {
            logging.enabled = true;
            if let Some(exporter) = logging.exporter.as_mut() {
                exporter
                    .config
                    .insert("style".to_string(), serde_json::json!("compact"));
            }
        }

        let pipelines = ConsolePipelines::from_config(&config).unwrap();

        let logs = pipelines.logs.expect("logging enabled");
        assert_eq!(logs.style(), LogStyle::Compact);
    }

    #[test]
    fn test_lifecycle_covers_all_pipelines() {
        let pipelines = ConsolePipelines::from_config(&config()).unwrap();

        pipelines.force_flush().unwrap();
        pipelines.shutdown().unwrap();
    }
}
