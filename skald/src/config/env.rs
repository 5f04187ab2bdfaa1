//! Environment variable access for configuration resolution.
//!
//! The resolver never reads the process environment directly. It takes an
//! [`EnvSnapshot`] captured once at startup, which keeps resolution
//! deterministic and lets tests inject variables without touching the
//! process environment.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

/// Prefix for nested configuration overrides.
const ENV_PREFIX: &str = "TELEMETRY";

/// An immutable snapshot of environment variables.
///
/// # Examples
///
/// ```
/// use skald::config::EnvSnapshot;
///
/// let env: EnvSnapshot = [("NO_TELEMETRY".to_string(), "1".to_string())]
///     .into_iter()
///     .collect();
///
/// assert!(env.bool_flag("NO_TELEMETRY", false));
/// assert!(env.bool_flag("MISSING", true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// The raw value of a variable, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// A string variable, falling back to `default` when unset or empty.
    #[must_use]
    pub fn string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// A boolean flag with a permissive parse.
    ///
    /// An unset variable yields `default`. Empty strings, `"0"` and
    /// `"false"` (any case) are false; any other non-empty value is true.
    #[must_use]
    pub fn bool_flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(value) => !matches!(value.to_lowercase().as_str(), "" | "0" | "false"),
        }
    }
}

impl FromIterator<(String, String)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Overlays environment variables onto a configuration tree.
///
/// Every leaf of the tree is addressable as `TELEMETRY` plus its
/// underscore-joined, uppercased path; dots and hyphens in keys also map to
/// underscores, so `tracing.sampler.kind` is overridden by
/// `TELEMETRY_TRACING_SAMPLER_KIND`. The variable's string value is coerced
/// to the leaf's type; values that do not parse as the expected number are
/// skipped. Arrays and null leaves are not overridable. Returns the number
/// of leaves replaced.
pub(crate) fn apply_env_overrides(tree: &mut Value, env: &EnvSnapshot) -> usize {
    let mut applied = 0;
    if let Value::Object(map) = tree {
        for (key, child) in map.iter_mut() {
            overlay_node(child, &env_key_segment(ENV_PREFIX, key), env, &mut applied);
        }
    }
    applied
}

fn overlay_node(node: &mut Value, env_key: &str, env: &EnvSnapshot, applied: &mut usize) {
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                overlay_node(child, &env_key_segment(env_key, key), env, applied);
            }
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            if let Some(raw) = env.get(env_key) {
                if let Some(coerced) = coerce(node, env_key, raw) {
                    *node = coerced;
                    *applied += 1;
                }
            }
        }
        // Arrays and nulls carry no type to coerce into.
        Value::Array(_) | Value::Null => {}
    }
}

fn env_key_segment(prefix: &str, key: &str) -> String {
    let mut segment = String::with_capacity(prefix.len() + key.len() + 1);
    segment.push_str(prefix);
    segment.push('_');
    for c in key.chars() {
        match c {
            '.' | '-' => segment.push('_'),
            _ => segment.extend(c.to_uppercase()),
        }
    }
    segment
}

fn coerce(leaf: &Value, env_key: &str, raw: &str) -> Option<Value> {
    match leaf {
        Value::Bool(_) => {
            let truthy = !matches!(raw.to_lowercase().as_str(), "" | "0" | "false");
            Some(Value::Bool(truthy))
        }
        Value::Number(_) => {
            if let Ok(int) = raw.parse::<i64>() {
                return Some(Value::Number(int.into()));
            }
            if let Some(float) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Some(Value::Number(float));
            }
            warn!(key = env_key, value = raw, "ignoring non-numeric override");
            None
        }
        Value::String(_) => Some(Value::String(raw.to_string())),
        _ => None,
    }
}
