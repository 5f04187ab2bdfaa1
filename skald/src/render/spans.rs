//! Span batch rendering.

use chrono::{DateTime, Utc};

use crate::models::SpanRecord;
use crate::render::style::Theme;

/// Attribute keys shown in span reports. Everything else is dropped from
/// view; the underlying records are never modified.
const DISPLAY_ATTRIBUTES: [&str; 6] = [
    "http.method",
    "http.url",
    "http.status_code",
    "db.statement",
    "db.system",
    "error",
];

/// Cyclic range for start/end offsets, purely for compact display.
const OFFSET_RANGE_MS: i64 = 10_000;

/// Renders batches of finished spans as per-trace timing reports.
///
/// # Example
///
/// ```
/// use skald::models::SpanRecord;
/// use skald::render::{SpanConsoleFormat, Theme};
///
/// let spans = vec![SpanRecord::new(
///     "4bf92f3577b34da6a3ce929d0e0e4736",
///     "00f067aa0ba902b7",
///     "GET /orders",
/// )];
///
/// let report = SpanConsoleFormat::new(Theme::plain()).format(&spans);
/// assert!(report.contains("[telemetry] - elapsed times (trace: 4bf92f35):"));
/// assert!(report.contains("GET /orders"));
/// ```
#[derive(Debug, Clone)]
pub struct SpanConsoleFormat {
    theme: Theme,
}

impl SpanConsoleFormat {
    /// Creates a span renderer with the given theme.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Formats a batch of spans. An empty batch yields an empty string.
    ///
    /// Spans are partitioned by trace id in the order the ids are first
    /// encountered, then stably sorted by start time within each trace.
    /// Start and end offsets are taken modulo a fixed cyclic range and
    /// only support relative comparison within one report. All spans of a
    /// trace render at the same indentation level in chronological order;
    /// the report does not reconstruct the parent tree.
    #[must_use]
    pub fn format(&self, batch: &[SpanRecord]) -> String {
        if batch.is_empty() {
            return String::new();
        }

        let mut traces: Vec<(&str, Vec<&SpanRecord>)> = Vec::new();
        for span in batch {
            match traces.iter_mut().find(|(id, _)| *id == span.trace_id) {
                Some((_, spans)) => spans.push(span),
                None => traces.push((span.trace_id.as_str(), vec![span])),
            }
        }

        let mut out = String::new();
        for (trace_id, mut spans) in traces {
            spans.sort_by_key(|span| span.start_time);

            let short_id = trace_id.get(..8).unwrap_or(trace_id);
            out.push_str(&format!(
                "{} - {} (trace: {}):\n",
                self.theme.tag.paint("[telemetry]"),
                self.theme.heading.paint("elapsed times"),
                self.theme.trace_id.paint(short_id),
            ));

            for span in spans {
                self.push_span(&mut out, span);
            }
            out.push('\n');
        }

        out
    }

    fn push_span(&self, out: &mut String, span: &SpanRecord) {
        let start = format!("{:8.2}", offset_ms(span.start_time));
        let end = format!("{:8.2}", offset_ms(span.end_time));
        let duration = format!("{:8.2} ms", span.duration_ms());

        out.push_str(&format!(
            "{} → {} = {}  {}\n",
            self.theme.dim.paint(start),
            self.theme.dim.paint(end),
            self.theme.duration.paint(duration),
            self.theme.span_name.paint(span.name.as_str()),
        ));

        for (key, value) in span.attributes.iter() {
            if DISPLAY_ATTRIBUTES.contains(&key) {
                out.push_str(&format!(
                    "    {}: {}\n",
                    self.theme.attr_key.paint(key),
                    value
                ));
            }
        }
    }
}

/// Millisecond offset within the display range.
#[allow(clippy::cast_precision_loss)]
fn offset_ms(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis().rem_euclid(OFFSET_RANGE_MS) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn span(trace_id: &str, name: &str, start: i64, end: i64) -> SpanRecord {
        SpanRecord::new(trace_id, format!("id-{name}"), name)
            .with_start_time(ts(start))
            .with_end_time(ts(end))
    }

    fn render(batch: &[SpanRecord]) -> String {
        SpanConsoleFormat::new(Theme::plain()).format(batch)
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_groups_by_first_encounter_and_sorts_by_start() {
        let batch = vec![
            span("aaaaaaaa11112222", "a-late", 3, 10),
            span("aaaaaaaa11112222", "a-early", 1, 10),
            span("bbbbbbbb33334444", "b-only", 2, 10),
        ];

        let out = render(&batch);

        assert_eq!(out.matches("[telemetry] - elapsed times").count(), 2);

        // Trace a renders before trace b, spans ordered by start time.
        let a_header = out.find("(trace: aaaaaaaa)").unwrap();
        let b_header = out.find("(trace: bbbbbbbb)").unwrap();
        assert!(a_header < b_header);

        let early = out.find("a-early").unwrap();
        let late = out.find("a-late").unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_sort_is_stable_for_equal_start_times() {
        let batch = vec![
            span("aaaaaaaa11112222", "first", 5, 10),
            span("aaaaaaaa11112222", "second", 5, 12),
        ];

        let out = render(&batch);

        assert!(out.find("first").unwrap() < out.find("second").unwrap());
    }

    #[test]
    fn test_offsets_are_modulo_display_range() {
        let batch = vec![span("aaaaaaaa11112222", "op", 12_345, 12_370)];

        let out = render(&batch);

        assert!(out.contains(" 2345.00 →  2370.00 =    25.00 ms  op"));
    }

    #[test]
    fn test_attribute_allow_list() {
        let batch = vec![span("aaaaaaaa11112222", "GET /orders", 0, 5)
            .with_attribute("http.method", "GET")
            .with_attribute("custom.key", "hidden")
            .with_attribute("http.status_code", 200i64)
            .with_attribute("error", true)];

        let out = render(&batch);

        assert!(out.contains("    http.method: GET"));
        assert!(out.contains("    http.status_code: 200"));
        assert!(out.contains("    error: true"));
        assert!(!out.contains("custom.key"));
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn test_children_render_flat() {
        let batch = vec![
            span("aaaaaaaa11112222", "parent", 1, 20),
            span("aaaaaaaa11112222", "child", 2, 10).with_parent("id-parent"),
        ];

        let out = render(&batch);
        let lines: Vec<&str> = out.lines().collect();

        // Both rows start at the same column regardless of parentage.
        assert!(lines[1].starts_with("    1.00 →"));
        assert!(lines[2].starts_with("    2.00 →"));
    }

    #[test]
    fn test_short_trace_id_renders_whole_id() {
        let batch = vec![span("ab12", "op", 0, 1)];

        let out = render(&batch);

        assert!(out.contains("(trace: ab12):"));
    }

    #[test]
    fn test_blank_line_separates_traces() {
        let batch = vec![
            span("aaaaaaaa11112222", "a", 1, 2),
            span("bbbbbbbb33334444", "b", 1, 2),
        ];

        let out = render(&batch);

        assert!(out.contains("a\n\n[telemetry]"));
        assert!(out.ends_with("\n\n"));
    }
}
