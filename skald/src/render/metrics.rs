//! Metric batch rendering.

use crate::models::{AttrValue, MetricData, MetricRecord};
use crate::render::style::Theme;

/// Renders metric batches grouped into named sections.
///
/// Metrics are classified by name prefix, first match wins: `process.` and
/// `runtime.` fall into the host section, `db.pool` and `queue` into their
/// tables, everything else into custom metrics. Missing table sources
/// degrade to zero placeholders instead of failing.
#[derive(Debug, Clone)]
pub struct MetricConsoleFormat {
    theme: Theme,
}

impl MetricConsoleFormat {
    /// Creates a metric renderer with the given theme.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Formats a batch of metrics. An empty batch yields an empty string.
    #[must_use]
    pub fn format(&self, batch: &[MetricRecord]) -> String {
        let mut host = Vec::new();
        let mut db_pool = Vec::new();
        let mut queue = Vec::new();
        let mut custom = Vec::new();

        for metric in batch {
            if metric.name.starts_with("process.") || metric.name.starts_with("runtime.") {
                host.push(metric);
            } else if metric.name.starts_with("db.pool") {
                db_pool.push(metric);
            } else if metric.name.starts_with("queue") {
                queue.push(metric);
            } else {
                custom.push(metric);
            }
        }

        let mut out = String::new();

        if !host.is_empty() {
            self.push_section(&mut out, "host metrics");
            for metric in &host {
                self.push_host_metric(&mut out, metric);
            }
            out.push('\n');
        }

        if !db_pool.is_empty() {
            self.push_section(&mut out, "db.pool");
            self.push_db_pool_table(&mut out, &db_pool);
            out.push('\n');
        }

        if !queue.is_empty() {
            self.push_section(&mut out, "queue");
            self.push_queue_table(&mut out, &queue);
            out.push('\n');
        }

        if !custom.is_empty() {
            self.push_section(&mut out, "custom metrics");
            for metric in &custom {
                self.push_generic_metric(&mut out, metric);
            }
            out.push('\n');
        }

        out
    }

    fn push_section(&self, out: &mut String, section: &str) {
        out.push_str(&format!(
            "{} - {}:\n",
            self.theme.tag.paint("[telemetry]"),
            self.theme.section.paint(section)
        ));
    }

    /// Host metrics with a known name and data shape get a dedicated line;
    /// everything else falls back to the generic dump.
    fn push_host_metric(&self, out: &mut String, metric: &MetricRecord) {
        match (metric.name.as_str(), &metric.data) {
            ("process.cpu.time", MetricData::Sum(points)) => {
                let mut user = 0.0;
                let mut system = 0.0;
                for point in points {
                    match point.attributes.get("state") {
                        Some(AttrValue::Str(state)) if state == "user" => {
                            user = point.value.as_f64();
                        }
                        Some(AttrValue::Str(state)) if state == "system" => {
                            system = point.value.as_f64();
                        }
                        _ => {}
                    }
                }
                out.push_str(&format!(
                    "  Process CPU time in seconds: {{ user: {user:.3}, system: {system:.3} }}\n"
                ));
            }
            ("process.memory.usage", MetricData::Gauge(points)) => {
                for point in points {
                    out.push_str(&format!(
                        "  Process memory usage in bytes: {}\n",
                        point.value
                    ));
                }
            }
            ("runtime.gc.count", MetricData::Sum(points)) => {
                for point in points {
                    out.push_str(&format!("  Runtime GC count: {}\n", point.value));
                }
            }
            _ => self.push_generic_metric(out, metric),
        }
    }

    fn push_db_pool_table(&self, out: &mut String, metrics: &[&MetricRecord]) {
        let header = &self.theme.table_header;
        out.push_str(&format!(
            "     {} | {} | {}\n",
            header.paint("size"),
            header.paint("available"),
            header.paint("pending")
        ));

        let mut size = String::from("0/0");
        let mut available = String::from("0/0");
        let mut pending = String::from("0");

        for metric in metrics {
            if let MetricData::Gauge(points) = &metric.data {
                if let Some(value) = points.last().and_then(|point| point.value.as_int()) {
                    match metric.name.as_str() {
                        "db.pool.size" => size = format!("{value}/{value}"),
                        "db.pool.available" => available = format!("{value}/{value}"),
                        "db.pool.pending" => pending = value.to_string(),
                        _ => {}
                    }
                }
            }
        }

        let cell = &self.theme.table_value;
        out.push_str(&format!(
            "     {} |      {} |      {}\n",
            cell.paint(size),
            cell.paint(available),
            cell.paint(pending)
        ));
    }

    fn push_queue_table(&self, out: &mut String, metrics: &[&MetricRecord]) {
        out.push_str(
            "     cold | remaining | min storage time | med storage time | max storage time | incoming | outgoing\n",
        );

        let mut cold = String::from("0");
        let mut remaining = String::from("0");
        let mut storage_min = String::from("0");
        let mut storage_med = String::from("0");
        let mut storage_max = String::from("0");
        let mut incoming = String::from("0");
        let mut outgoing = String::from("0");

        for metric in metrics {
            if let MetricData::Gauge(points) = &metric.data {
                if let Some(value) = points.last().and_then(|point| point.value.as_int()) {
                    let cell = value.to_string();
                    match metric.name.as_str() {
                        "queue.cold" => cold = cell,
                        "queue.remaining" => remaining = cell,
                        "queue.storage.min" => storage_min = cell,
                        "queue.storage.med" => storage_med = cell,
                        "queue.storage.max" => storage_max = cell,
                        "queue.incoming" => incoming = cell,
                        "queue.outgoing" => outgoing = cell,
                        _ => {}
                    }
                }
            }
        }

        out.push_str(&format!(
            "     {cold:>4} |      {remaining:>4} |             {storage_min:>4} |             {storage_med:>4} |             {storage_max:>4} |     {incoming:>4} |     {outgoing:>4}\n"
        ));
    }

    fn push_generic_metric(&self, out: &mut String, metric: &MetricRecord) {
        let values = match &metric.data {
            MetricData::Gauge(points) | MetricData::Sum(points) => points
                .iter()
                .map(|point| point.value.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            MetricData::Histogram(points) => {
                format!("count: {}", points.first().map_or(0, |point| point.count))
            }
        };
        out.push_str(&format!("  {}: {}\n", metric.name, values));
    }
}
