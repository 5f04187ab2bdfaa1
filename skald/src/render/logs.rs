//! Log batch rendering.
//!
//! Three styles are available: a boxed multi-line layout for interactive
//! terminals, a single-line compact layout, and pretty-printed JSON for
//! piping into other tools. The style is chosen per exporter through the
//! `style` key of the logging exporter config.

use chrono::SecondsFormat;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::ExporterSpec;
use crate::models::{Attrs, LogRecord};
use crate::render::style::Theme;

const BANNER_WIDTH: usize = 78;
const BANNER_TITLE: &str = "LOG RECORDS";

/// Formats a batch of log records into console text.
///
/// Implementations are pure. An empty batch must render to text that a
/// downstream consumer can still accept, which for the JSON style means an
/// empty array rather than an empty string.
pub trait LogFormat: Send + Sync {
    /// Renders the batch. The result is written to the sink verbatim.
    fn format(&self, batch: &[LogRecord]) -> String;
}

/// Log rendering style selected via exporter config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogStyle {
    /// Boxed multi-line records with a banner. The default.
    #[default]
    Structured,
    /// One line per record.
    Compact,
    /// Pretty-printed JSON array of records.
    Json,
}

impl LogStyle {
    /// Reads the `style` key from an exporter config. Missing, non-string
    /// and unknown values fall back to [`LogStyle::Structured`].
    #[must_use]
    pub fn from_spec(spec: &ExporterSpec) -> Self {
        spec.config
            .get("style")
            .and_then(serde_json::Value::as_str)
            .map_or(Self::Structured, Self::parse)
    }

    fn parse(text: &str) -> Self {
        match text.to_lowercase().as_str() {
            "compact" => Self::Compact,
            "json" => Self::Json,
            _ => Self::Structured,
        }
    }

    /// Builds the formatter for this style.
    #[must_use]
    pub fn formatter(self, theme: Theme) -> Box<dyn LogFormat> {
        match self {
            Self::Structured => Box::new(StructuredLogFormat::new(theme)),
            Self::Compact => Box::new(CompactLogFormat::new(theme)),
            Self::Json => Box::new(JsonLogFormat),
        }
    }
}

/// Boxed multi-line layout with a banner, one block per record.
#[derive(Debug, Clone)]
pub struct StructuredLogFormat {
    theme: Theme,
}

impl StructuredLogFormat {
    /// Creates a structured formatter with the given theme.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn push_banner(&self, out: &mut String) {
        let bar = "═".repeat(BANNER_WIDTH);
        let left = (BANNER_WIDTH - BANNER_TITLE.len()) / 2;
        let right = BANNER_WIDTH - BANNER_TITLE.len() - left;
        let title = format!("{}{BANNER_TITLE}{}", " ".repeat(left), " ".repeat(right));

        let section = &self.theme.section;
        out.push_str(&format!("{}\n", section.paint(format!("╔{bar}╗"))));
        out.push_str(&format!("{}\n", section.paint(format!("║{title}║"))));
        out.push_str(&format!("{}\n", section.paint(format!("╚{bar}╝"))));
    }

    fn push_record(&self, out: &mut String, record: &LogRecord) {
        let timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let label = format!("{:<5}", record.severity.label());
        out.push_str(&format!(
            "[{}] {}: {}\n",
            self.theme.dim.paint(timestamp),
            self.theme.severity(record.severity).paint(label),
            record.body
        ));

        if let Some(id) = record.valid_trace_id() {
            out.push_str(&format!(
                "{} {}\n",
                self.theme.dim.paint("  ├─ Trace ID:"),
                self.theme.trace_id.paint(id)
            ));
        }

        // Two trailing spaces keep span ids aligned with trace ids.
        if let Some(id) = record.valid_span_id() {
            out.push_str(&format!(
                "{}  {}\n",
                self.theme.dim.paint("  ├─ Span ID:"),
                self.theme.trace_id.paint(id)
            ));
        }

        if !record.attributes.is_empty() {
            out.push_str(&format!("{}\n", self.theme.dim.paint("  ├─ Attributes:")));
            for (key, value) in record.attributes.iter() {
                out.push_str(&format!(
                    "  {}  • {}: {}\n",
                    self.theme.dim.paint("│"),
                    self.theme.attr_key.paint(key),
                    value
                ));
            }
        }
    }
}

impl LogFormat for StructuredLogFormat {
    fn format(&self, batch: &[LogRecord]) -> String {
        if batch.is_empty() {
            return String::new();
        }

        let mut out = String::from("\n");
        self.push_banner(&mut out);
        out.push('\n');

        for (index, record) in batch.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            self.push_record(&mut out, record);
        }

        out.push('\n');
        out
    }
}

/// One line per record, for dense terminal output.
#[derive(Debug, Clone)]
pub struct CompactLogFormat {
    theme: Theme,
}

impl CompactLogFormat {
    /// Creates a compact formatter with the given theme.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl LogFormat for CompactLogFormat {
    fn format(&self, batch: &[LogRecord]) -> String {
        let mut out = String::new();
        for record in batch {
            let timestamp = record.timestamp.format("%H:%M:%S%.3f").to_string();
            out.push_str(&format!(
                "{} {} {}",
                self.theme.dim.paint(timestamp),
                self.theme.severity(record.severity).paint(record.severity.code()),
                record.body
            ));
            if let Some(id) = record.valid_trace_id() {
                let short = id.get(..8).unwrap_or(id);
                out.push_str(&format!(" {}", self.theme.dim.paint(format!("[trace={short}]"))));
            }
            out.push('\n');
        }
        out
    }
}

/// Pretty-printed JSON array of records, no colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogFormat;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    timestamp: String,
    severity: &'static str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<AttrObject<'a>>,
}

/// Serializes attributes as a JSON object in record order.
struct AttrObject<'a>(&'a Attrs);

impl Serialize for AttrObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0.iter() {
            map.serialize_entry(key, &value.as_json())?;
        }
        map.end()
    }
}

impl LogFormat for JsonLogFormat {
    fn format(&self, batch: &[LogRecord]) -> String {
        let records: Vec<JsonRecord<'_>> = batch
            .iter()
            .map(|record| JsonRecord {
                timestamp: record
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Nanos, true),
                severity: record.severity.label(),
                body: &record.body,
                trace_id: record.valid_trace_id(),
                span_id: record.valid_span_id(),
                attributes: if record.attributes.is_empty() {
                    None
                } else {
                    Some(AttrObject(&record.attributes))
                },
            })
            .collect();

        let mut text =
            serde_json::to_string_pretty(&records).unwrap_or_else(|_| String::from("[]"));
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::DateTime;

    fn ts() -> DateTime<chrono::Utc> {
        DateTime::from_timestamp(1_700_000_000, 123_000_000).unwrap()
    }

    fn record() -> LogRecord {
        LogRecord::new(Severity::INFO, "request handled")
            .with_timestamp(ts())
            .with_trace_id("0af7651916cd43dd8448eb211c80319c")
            .with_span_id("b7ad6b7169203331")
            .with_attribute("http.method", "GET")
            .with_attribute("http.status_code", 200)
    }

    #[test]
    fn test_structured_empty_batch() {
        let out = StructuredLogFormat::new(Theme::plain()).format(&[]);
        assert_eq!(out, "");
    }

    #[test]
    fn test_structured_record_layout() {
        let out = StructuredLogFormat::new(Theme::plain()).format(&[record()]);

        let banner = format!("║{}LOG RECORDS{}║", " ".repeat(33), " ".repeat(34));
        assert!(out.starts_with('\n'));
        assert!(out.contains(&banner));
        assert!(out.contains("[2023-11-14 22:13:20.123] INFO : request handled"));
        assert!(out.contains("  ├─ Trace ID: 0af7651916cd43dd8448eb211c80319c"));
        assert!(out.contains("  ├─ Span ID:  b7ad6b7169203331"));
        assert!(out.contains("  ├─ Attributes:"));
        assert!(out.contains("  │  • http.method: GET"));
        assert!(out.contains("  │  • http.status_code: 200"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_structured_skips_invalid_ids() {
        let log = LogRecord::new(Severity::WARN, "no context")
            .with_timestamp(ts())
            .with_trace_id("00000000000000000000000000000000")
            .with_span_id("");

        let out = StructuredLogFormat::new(Theme::plain()).format(&[log]);

        assert!(!out.contains("Trace ID"));
        assert!(!out.contains("Span ID"));
        assert!(!out.contains("Attributes"));
    }

    #[test]
    fn test_structured_separates_records_with_blank_lines() {
        let batch = vec![record(), record()];

        let out = StructuredLogFormat::new(Theme::plain()).format(&batch);

        assert_eq!(out.matches("] INFO : request handled").count(), 2);
        // One blank line after the banner, one between the records.
        assert_eq!(out.matches("\n\n[").count(), 2);
    }

    #[test]
    fn test_compact_line() {
        let out = CompactLogFormat::new(Theme::plain()).format(&[record()]);

        assert_eq!(out, "22:13:20.123 INF request handled [trace=0af76519]\n");
    }

    #[test]
    fn test_compact_omits_invalid_trace() {
        let log = LogRecord::new(Severity::ERROR, "boom").with_timestamp(ts());

        let out = CompactLogFormat::new(Theme::plain()).format(&[log]);

        assert_eq!(out, "22:13:20.123 ERR boom\n");
    }

    #[test]
    fn test_json_empty_batch_is_well_formed() {
        let out = JsonLogFormat.format(&[]);

        assert_eq!(out, "[]\n");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_escapes_and_round_trips() {
        let log = LogRecord::new(Severity::INFO, "say \"hi\"")
            .with_timestamp(ts())
            .with_trace_id("0af7651916cd43dd8448eb211c80319c")
            .with_attribute("http.method", "GET");

        let out = JsonLogFormat.format(&[log]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let entry = &parsed.as_array().unwrap()[0];

        assert_eq!(entry["body"], "say \"hi\"");
        assert_eq!(entry["severity"], "INFO");
        assert_eq!(entry["traceId"], "0af7651916cd43dd8448eb211c80319c");
        assert!(entry.get("spanId").is_none());
        assert_eq!(entry["attributes"]["http.method"], "GET");
        assert!(entry["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_json_omits_empty_attributes() {
        let log = LogRecord::new(Severity::DEBUG, "quiet").with_timestamp(ts());

        let out = JsonLogFormat.format(&[log]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert!(parsed.as_array().unwrap()[0].get("attributes").is_none());
    }

    #[test]
    fn test_style_from_spec() {
        let mut spec = ExporterSpec::console("ConsoleLogExporter");
        assert_eq!(LogStyle::from_spec(&spec), LogStyle::Structured);

        spec.config
            .insert("style".to_string(), serde_json::json!("json"));
        assert_eq!(LogStyle::from_spec(&spec), LogStyle::Json);

        spec.config
            .insert("style".to_string(), serde_json::json!("COMPACT"));
        assert_eq!(LogStyle::from_spec(&spec), LogStyle::Compact);

        spec.config
            .insert("style".to_string(), serde_json::json!("fancy"));
        assert_eq!(LogStyle::from_spec(&spec), LogStyle::Structured);

        spec.config.insert("style".to_string(), serde_json::json!(7));
        assert_eq!(LogStyle::from_spec(&spec), LogStyle::Structured);
    }
}
