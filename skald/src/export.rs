//! Console exporters for spans, metrics and logs.
//!
//! All exporters render synchronously and write through a shared
//! [`ConsoleSink`]. The sink serializes writers behind a mutex so batches
//! from concurrent tasks never interleave on the terminal.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::models::{LogRecord, MetricRecord, SpanRecord};
use crate::render::{LogFormat, LogStyle, MetricConsoleFormat, SpanConsoleFormat, Theme};

/// Errors raised while exporting a batch to the console.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The underlying writer failed.
    #[error("failed to write to console sink: {0}")]
    Io(#[from] io::Error),

    /// A writer panicked while holding the sink lock.
    #[error("console sink lock poisoned")]
    SinkLock,
}

/// Shared, mutex-guarded destination for rendered telemetry text.
///
/// Cloning the sink is cheap and every clone writes through the same lock,
/// so one sink can back all three exporters of a pipeline. Each batch is
/// written and flushed while the lock is held.
#[derive(Clone)]
pub struct ConsoleSink(Arc<Mutex<Box<dyn Write + Send>>>);

impl ConsoleSink {
    /// A sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// A sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    /// Wraps an arbitrary writer, useful for capturing output in tests.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    /// Writes the text and flushes, holding the lock for the duration.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::SinkLock`] when the lock is poisoned and
    /// [`ExportError::Io`] when the writer fails.
    pub fn write_str(&self, text: &str) -> Result<(), ExportError> {
        let mut writer = self.0.lock().map_err(|_| ExportError::SinkLock)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

/// Writes span batches to the console as per-trace timing tables.
#[derive(Debug)]
pub struct ConsoleSpanExporter {
    sink: ConsoleSink,
    formatter: SpanConsoleFormat,
}

impl ConsoleSpanExporter {
    /// Creates an exporter writing to standard output with ANSI colors.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(ConsoleSink::stdout())
    }

    /// Creates an exporter writing to the given sink.
    #[must_use]
    pub fn with_sink(sink: ConsoleSink) -> Self {
        Self {
            sink,
            formatter: SpanConsoleFormat::new(Theme::default()),
        }
    }

    /// Replaces the color theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.formatter = SpanConsoleFormat::new(theme);
        self
    }

    /// Renders the batch and writes it to the sink. Empty batches render to
    /// an empty string and are not written at all.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn export(&self, batch: &[SpanRecord]) -> Result<(), ExportError> {
        let text = self.formatter.format(batch);
        if text.is_empty() {
            return Ok(());
        }
        self.sink.write_str(&text)
    }

    /// Completes immediately. Every batch is flushed during [`export`],
    /// so shutdown has nothing left to write.
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    ///
    /// [`export`]: ConsoleSpanExporter::export
    pub fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Completes immediately, see [`shutdown`](ConsoleSpanExporter::shutdown).
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    pub fn force_flush(&self) -> Result<(), ExportError> {
        Ok(())
    }
}

impl Default for ConsoleSpanExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes metric batches to the console as named sections.
#[derive(Debug)]
pub struct ConsoleMetricExporter {
    sink: ConsoleSink,
    formatter: MetricConsoleFormat,
}

impl ConsoleMetricExporter {
    /// Creates an exporter writing to standard output with ANSI colors.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(ConsoleSink::stdout())
    }

    /// Creates an exporter writing to the given sink.
    #[must_use]
    pub fn with_sink(sink: ConsoleSink) -> Self {
        Self {
            sink,
            formatter: MetricConsoleFormat::new(Theme::default()),
        }
    }

    /// Replaces the color theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.formatter = MetricConsoleFormat::new(theme);
        self
    }

    /// Renders the batch and writes it to the sink. Empty batches are not
    /// written at all.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn export(&self, batch: &[MetricRecord]) -> Result<(), ExportError> {
        let text = self.formatter.format(batch);
        if text.is_empty() {
            return Ok(());
        }
        self.sink.write_str(&text)
    }

    /// Completes immediately, every batch is flushed during export.
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    pub fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Completes immediately, see [`shutdown`](ConsoleMetricExporter::shutdown).
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    pub fn force_flush(&self) -> Result<(), ExportError> {
        Ok(())
    }
}

impl Default for ConsoleMetricExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes log batches to the console in a configurable style.
pub struct ConsoleLogExporter {
    sink: ConsoleSink,
    style: LogStyle,
    theme: Theme,
    formatter: Box<dyn LogFormat>,
}

impl ConsoleLogExporter {
    /// Creates an exporter writing to standard output in the structured
    /// style with ANSI colors.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(ConsoleSink::stdout())
    }

    /// Creates an exporter writing to the given sink.
    #[must_use]
    pub fn with_sink(sink: ConsoleSink) -> Self {
        let style = LogStyle::default();
        let theme = Theme::default();
        Self {
            sink,
            style,
            theme,
            formatter: style.formatter(theme),
        }
    }

    /// Replaces the rendering style.
    #[must_use]
    pub fn with_style(mut self, style: LogStyle) -> Self {
        self.style = style;
        self.formatter = style.formatter(self.theme);
        self
    }

    /// Replaces the color theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.formatter = self.style.formatter(theme);
        self
    }

    /// The style this exporter renders with.
    #[must_use]
    pub fn style(&self) -> LogStyle {
        self.style
    }

    /// Renders the batch and writes it to the sink. Batches that render to
    /// an empty string are not written, the JSON style still writes its
    /// empty array.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn export(&self, batch: &[LogRecord]) -> Result<(), ExportError> {
        let text = self.formatter.format(batch);
        if text.is_empty() {
            return Ok(());
        }
        self.sink.write_str(&text)
    }

    /// Completes immediately, every batch is flushed during export.
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    pub fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Completes immediately, see [`shutdown`](ConsoleLogExporter::shutdown).
    ///
    /// # Errors
    ///
    /// Never fails, the result mirrors the export signature.
    pub fn force_flush(&self) -> Result<(), ExportError> {
        Ok(())
    }
}

impl Default for ConsoleLogExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleLogExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogExporter")
            .field("sink", &self.sink)
            .field("style", &self.style)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}
