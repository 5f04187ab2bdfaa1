//! Finished log records.

use chrono::{DateTime, Utc};

use crate::models::{AttrValue, Attrs};

/// Numeric log severity on the OpenTelemetry scale.
///
/// The named constants are reference points on an ordered scale
/// (trace < debug < info < warn < error < fatal). Labeling buckets by
/// threshold, so a severity between two named levels takes the label of
/// the lower one rather than an "unknown" bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(pub i32);

impl Severity {
    /// Finest detail level.
    pub const TRACE: Self = Self(1);
    /// Debugging information.
    pub const DEBUG: Self = Self(5);
    /// Informational messages.
    pub const INFO: Self = Self(9);
    /// Warning conditions.
    pub const WARN: Self = Self(13);
    /// Error conditions.
    pub const ERROR: Self = Self(17);
    /// Unrecoverable conditions.
    pub const FATAL: Self = Self(21);

    /// The severity label, bucketed by threshold.
    #[must_use]
    pub fn label(self) -> &'static str {
        if self >= Self::FATAL {
            "FATAL"
        } else if self >= Self::ERROR {
            "ERROR"
        } else if self >= Self::WARN {
            "WARN"
        } else if self >= Self::INFO {
            "INFO"
        } else if self >= Self::DEBUG {
            "DEBUG"
        } else {
            "TRACE"
        }
    }

    /// The three-letter code used by the compact log format.
    #[must_use]
    pub fn code(self) -> &'static str {
        if self >= Self::FATAL {
            "FTL"
        } else if self >= Self::ERROR {
            "ERR"
        } else if self >= Self::WARN {
            "WRN"
        } else if self >= Self::INFO {
            "INF"
        } else if self >= Self::DEBUG {
            "DBG"
        } else {
            "TRC"
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A finished log record delivered by the collection runtime.
///
/// # Example
///
/// ```
/// use skald::models::{LogRecord, Severity};
///
/// let record = LogRecord::new(Severity::INFO, "user logged in")
///     .with_attribute("user_id", "12345")
///     .with_trace_id("4bf92f3577b34da6a3ce929d0e0e4736");
///
/// assert_eq!(record.severity.label(), "INFO");
/// assert!(record.valid_trace_id().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Timestamp when the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity of the record.
    pub severity: Severity,

    /// The log message body.
    pub body: String,

    /// Attributes recorded on the record, in record order.
    pub attributes: Attrs,

    /// Optional trace id for correlation.
    pub trace_id: Option<String>,

    /// Optional span id for correlation.
    pub span_id: Option<String>,
}

impl LogRecord {
    /// Creates a log record with the current timestamp.
    #[must_use]
    pub fn new(severity: Severity, body: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            body: body.into(),
            attributes: Attrs::new(),
            trace_id: None,
            span_id: None,
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds an attribute to the record.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.push(key, value);
        self
    }

    /// Sets the trace id for correlation.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets the span id for correlation.
    #[must_use]
    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    /// The trace id, when usable for correlation.
    ///
    /// Empty and all-zero ids are the wire format's invalid sentinels and
    /// render nothing.
    #[must_use]
    pub fn valid_trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref().filter(|id| is_valid_id(id))
    }

    /// The span id, when usable for correlation.
    #[must_use]
    pub fn valid_span_id(&self) -> Option<&str> {
        self.span_id.as_deref().filter(|id| is_valid_id(id))
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().any(|c| c != '0')
}
