//! Console rendering engine.
//!
//! Turns batches of finished telemetry records into structured, colorized
//! text. The renderers are pure formatting functions: they never mutate or
//! retry records and perform no I/O themselves. Writing the rendered text
//! to a sink is the exporters' job.

pub mod logs;
pub mod metrics;
pub mod spans;
pub mod style;

pub use logs::{CompactLogFormat, JsonLogFormat, LogFormat, LogStyle, StructuredLogFormat};
pub use metrics::MetricConsoleFormat;
pub use spans::SpanConsoleFormat;
pub use style::Theme;
