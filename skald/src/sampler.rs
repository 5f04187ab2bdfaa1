//! Sampler factory.
//!
//! Maps a [`SamplerSpec`](crate::config::SamplerSpec) to a sampling policy
//! for the external collection runtime. Unknown kinds resolve to
//! always-sample rather than failing: a misspelled sampler must never
//! silence telemetry.

use crate::config::SamplerSpec;

/// A resolved sampling policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampling {
    /// Record every span.
    AlwaysOn,
    /// Record no spans.
    AlwaysOff,
    /// Record spans whose trace id maps below the given probability.
    TraceIdRatio(f64),
    /// Defer to the parent span's decision; apply the inner policy to roots.
    ParentBased(Box<Sampling>),
}

impl Sampling {
    /// Reference sampling decision for a span.
    ///
    /// `parent_sampled` carries the parent context's decision when one
    /// exists. Ratio policies map the trace id onto `[0, 1)` and sample
    /// when it falls below the configured probability, so the decision is
    /// consistent for every span of a trace.
    #[must_use]
    pub fn should_sample(&self, parent_sampled: Option<bool>, trace_id: &str) -> bool {
        match self {
            Self::AlwaysOn => true,
            Self::AlwaysOff => false,
            Self::TraceIdRatio(ratio) => trace_id_fraction(trace_id) < *ratio,
            Self::ParentBased(root) => match parent_sampled {
                Some(decision) => decision,
                None => root.should_sample(None, trace_id),
            },
        }
    }
}

impl std::fmt::Display for Sampling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlwaysOn => write!(f, "AlwaysOn"),
            Self::AlwaysOff => write!(f, "AlwaysOff"),
            Self::TraceIdRatio(ratio) => write!(f, "TraceIdRatio({ratio})"),
            Self::ParentBased(root) => write!(f, "ParentBased({root})"),
        }
    }
}

/// Builds a sampling policy from a sampler specification.
///
/// An absent spec and unknown kinds both resolve to [`Sampling::AlwaysOn`].
/// A non-positive ratio is normalized to 1.0; ratios above 1 pass through
/// unchanged. The root of a parent-based sampler is resolved by the same
/// kind mapping, with a nested parent-based root treated as unknown.
///
/// # Examples
///
/// ```
/// use skald::config::SamplerSpec;
/// use skald::sampler::{build_sampler, Sampling};
///
/// let spec = SamplerSpec {
///     kind: "TraceIdRatioBasedSampler".to_string(),
///     ratio: 0.25,
///     ..SamplerSpec::default()
/// };
/// assert_eq!(build_sampler(Some(&spec)), Sampling::TraceIdRatio(0.25));
/// assert_eq!(build_sampler(None), Sampling::AlwaysOn);
/// ```
#[must_use]
pub fn build_sampler(spec: Option<&SamplerSpec>) -> Sampling {
    let Some(spec) = spec else {
        return Sampling::AlwaysOn;
    };

    match spec.kind.as_str() {
        "AlwaysOffSampler" => Sampling::AlwaysOff,
        "TraceIdRatioBasedSampler" => Sampling::TraceIdRatio(effective_ratio(spec.ratio)),
        "ParentBasedSampler" => Sampling::ParentBased(Box::new(root_sampler(spec))),
        // AlwaysOnSampler and anything unrecognised.
        _ => Sampling::AlwaysOn,
    }
}

/// Normalizes a configured sampling ratio.
///
/// Non-positive (or unset, which deserializes as zero) means "sample
/// everything". Only the lower bound is normalized.
#[must_use]
pub fn effective_ratio(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        1.0
    } else {
        ratio
    }
}

fn root_sampler(spec: &SamplerSpec) -> Sampling {
    match spec.root.as_str() {
        "AlwaysOffSampler" => Sampling::AlwaysOff,
        "TraceIdRatioBasedSampler" => Sampling::TraceIdRatio(effective_ratio(spec.ratio)),
        // AlwaysOnSampler, a nested ParentBasedSampler and anything else.
        _ => Sampling::AlwaysOn,
    }
}

/// Maps a trace id onto `[0, 1)`.
///
/// Uses the leading 16 hex characters when present, otherwise a stable
/// hash of the whole id, so malformed ids still sample deterministically.
#[allow(clippy::cast_precision_loss)]
fn trace_id_fraction(trace_id: &str) -> f64 {
    let value = trace_id
        .get(..16)
        .and_then(|prefix| u64::from_str_radix(prefix, 16).ok())
        .unwrap_or_else(|| {
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            trace_id.hash(&mut hasher);
            hasher.finish()
        });

    value as f64 / (u64::MAX as f64 + 1.0)
}
