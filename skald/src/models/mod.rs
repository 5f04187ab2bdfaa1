//! Finished telemetry records.
//!
//! These are the value types the collection runtime hands to the renderers:
//! spans, metrics, and log records that are already complete. They carry no
//! serde derives because they never cross a wire here; the renderers are
//! their only serialization.

pub mod attr;
pub mod log;
pub mod metric;
pub mod span;

pub use attr::{AttrValue, Attrs};
pub use log::{LogRecord, Severity};
pub use metric::{HistogramPoint, MetricData, MetricNumber, MetricRecord, NumberPoint};
pub use span::{SpanRecord, SpanStatus};
