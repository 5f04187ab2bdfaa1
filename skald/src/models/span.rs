//! Finished span records.

use chrono::{DateTime, Duration, Utc};

use crate::models::{AttrValue, Attrs};

/// Status code of a finished span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpanStatus {
    /// No status was set.
    #[default]
    Unset,
    /// The span completed without error.
    Ok,
    /// The span encountered an error.
    Error,
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A finished span delivered by the collection runtime.
///
/// Spans are immutable once delivered: the renderers read them and never
/// write them back.
///
/// # Example
///
/// ```
/// use skald::models::SpanRecord;
///
/// let span = SpanRecord::new("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "GET /api")
///     .with_attribute("http.method", "GET");
///
/// assert!(span.is_root());
/// ```
#[derive(Debug, Clone)]
pub struct SpanRecord {
    /// Identifier of the trace this span belongs to.
    pub trace_id: String,

    /// Identifier of this span.
    pub span_id: String,

    /// The parent span id (`None` for root spans).
    pub parent_span_id: Option<String>,

    /// The operation name.
    pub name: String,

    /// Timestamp when the span started.
    pub start_time: DateTime<Utc>,

    /// Timestamp when the span ended.
    pub end_time: DateTime<Utc>,

    /// Attributes recorded on the span, in record order.
    pub attributes: Attrs,

    /// The status of the span.
    pub status: SpanStatus,
}

impl SpanRecord {
    /// Creates a span with the current time as both start and end.
    #[must_use]
    pub fn new(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
            name: name.into(),
            start_time: now,
            end_time: now,
            attributes: Attrs::new(),
            status: SpanStatus::default(),
        }
    }

    /// Sets the parent span id.
    #[must_use]
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the end time.
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = end_time;
        self
    }

    /// Adds an attribute to the span.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.push(key, value);
        self
    }

    /// Sets the span status.
    #[must_use]
    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the duration of the span.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Returns the duration in fractional milliseconds.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        let duration = self.duration();
        duration
            .num_microseconds()
            .map_or_else(|| duration.num_milliseconds() as f64, |us| us as f64 / 1_000.0)
    }

    /// Returns true if this is a root span (no parent).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }
}
