//! Finished metric records.
//!
//! A metric is a name plus a data payload shaped by its instrument kind:
//! gauge, sum, or histogram, over integer or floating point values.

use std::fmt;

use crate::models::{AttrValue, Attrs};

/// A numeric measurement, integer or floating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricNumber {
    /// A 64-bit signed integer measurement.
    Int(i64),
    /// A 64-bit floating point measurement.
    Float(f64),
}

impl MetricNumber {
    /// The value widened to `f64`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// The value when it is an integer.
    #[must_use]
    pub fn as_int(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    /// True when the value is floating point.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float(_))
    }
}

impl fmt::Display for MetricNumber {
    /// Integers render bare; floats render with three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.3}"),
        }
    }
}

/// A single gauge or sum data point.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberPoint {
    /// The measured value.
    pub value: MetricNumber,
    /// Attributes recorded on this point, in record order.
    pub attributes: Attrs,
}

impl NumberPoint {
    /// Creates an integer point without attributes.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self {
            value: MetricNumber::Int(value),
            attributes: Attrs::new(),
        }
    }

    /// Creates a floating point point without attributes.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self {
            value: MetricNumber::Float(value),
            attributes: Attrs::new(),
        }
    }

    /// Adds an attribute to the point.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.push(key, value);
        self
    }
}

/// A single histogram data point.
///
/// Only the observation count is ever rendered; bucket boundaries stay with
/// the collection runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPoint {
    /// The total count of observations.
    pub count: u64,
    /// The sum of all observed values.
    pub sum: f64,
    /// Attributes recorded on this point, in record order.
    pub attributes: Attrs,
}

impl HistogramPoint {
    /// Creates a histogram point without attributes.
    #[must_use]
    pub fn new(count: u64, sum: f64) -> Self {
        Self {
            count,
            sum,
            attributes: Attrs::new(),
        }
    }
}

/// The data payload of a metric, by instrument kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricData {
    /// A value that can go up or down; the last point is current.
    Gauge(Vec<NumberPoint>),
    /// A monotonic or delta accumulation.
    Sum(Vec<NumberPoint>),
    /// A distribution of observations.
    Histogram(Vec<HistogramPoint>),
}

impl MetricData {
    /// Display name of the instrument kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gauge(_) => "gauge",
            Self::Sum(_) => "sum",
            Self::Histogram(_) => "histogram",
        }
    }
}

/// A finished metric delivered by the collection runtime.
///
/// # Example
///
/// ```
/// use skald::models::{MetricRecord, NumberPoint};
///
/// let metric = MetricRecord::gauge("db.pool.size", vec![NumberPoint::int(5)]);
/// assert_eq!(metric.data.kind(), "gauge");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// The metric name, e.g. `process.cpu.time`.
    pub name: String,
    /// The data payload.
    pub data: MetricData,
}

impl MetricRecord {
    /// Creates a gauge metric.
    #[must_use]
    pub fn gauge(name: impl Into<String>, points: Vec<NumberPoint>) -> Self {
        Self {
            name: name.into(),
            data: MetricData::Gauge(points),
        }
    }

    /// Creates a sum metric.
    #[must_use]
    pub fn sum(name: impl Into<String>, points: Vec<NumberPoint>) -> Self {
        Self {
            name: name.into(),
            data: MetricData::Sum(points),
        }
    }

    /// Creates a histogram metric.
    #[must_use]
    pub fn histogram(name: impl Into<String>, points: Vec<HistogramPoint>) -> Self {
        Self {
            name: name.into(),
            data: MetricData::Histogram(points),
        }
    }
}
