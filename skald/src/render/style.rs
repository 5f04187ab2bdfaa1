//! Terminal styling for the console renderers.

use nu_ansi_term::{Color, Style};

use crate::models::Severity;

/// Styles applied by the console renderers, one per output role.
///
/// [`Theme::ansi`] is the colorized default. [`Theme::plain`] emits no
/// escape codes at all, which keeps redirected output greppable and lets
/// tests assert on the rendered text directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// The `[telemetry]` tag opening section headers.
    pub tag: Style,
    /// Heading text next to the tag in span reports.
    pub heading: Style,
    /// Metric section names and the log banner.
    pub section: Style,
    /// Trace and span ids.
    pub trace_id: Style,
    /// Secondary text: timestamps, time offsets, tree glyphs.
    pub dim: Style,
    /// Span durations.
    pub duration: Style,
    /// Span names.
    pub span_name: Style,
    /// Attribute keys.
    pub attr_key: Style,
    /// Table column headers.
    pub table_header: Style,
    /// Table cell values.
    pub table_value: Style,
    /// Error and fatal severity labels.
    pub severity_error: Style,
    /// Warn severity labels.
    pub severity_warn: Style,
    /// Info severity labels.
    pub severity_info: Style,
    /// Debug severity labels.
    pub severity_debug: Style,
    /// Trace severity labels.
    pub severity_trace: Style,
}

impl Theme {
    /// The colorized default theme.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            tag: Color::Green.bold(),
            heading: Color::Green.normal(),
            section: Color::Cyan.bold(),
            trace_id: Color::Magenta.normal(),
            dim: Color::DarkGray.normal(),
            duration: Color::Yellow.bold(),
            span_name: Color::Cyan.normal(),
            attr_key: Color::Magenta.normal(),
            table_header: Color::Yellow.bold(),
            table_value: Color::Cyan.normal(),
            severity_error: Color::Red.bold(),
            severity_warn: Color::Yellow.bold(),
            severity_info: Color::Cyan.bold(),
            severity_debug: Color::DarkGray.normal(),
            severity_trace: Color::Magenta.normal(),
        }
    }

    /// A theme that emits no escape codes.
    #[must_use]
    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            tag: none,
            heading: none,
            section: none,
            trace_id: none,
            dim: none,
            duration: none,
            span_name: none,
            attr_key: none,
            table_header: none,
            table_value: none,
            severity_error: none,
            severity_warn: none,
            severity_info: none,
            severity_debug: none,
            severity_trace: none,
        }
    }

    /// The style for a severity label, bucketed by the same thresholds as
    /// [`Severity::label`].
    #[must_use]
    pub fn severity(&self, severity: Severity) -> Style {
        if severity >= Severity::ERROR {
            self.severity_error
        } else if severity >= Severity::WARN {
            self.severity_warn
        } else if severity >= Severity::INFO {
            self.severity_info
        } else if severity >= Severity::DEBUG {
            self.severity_debug
        } else {
            self.severity_trace
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::ansi()
    }
}
