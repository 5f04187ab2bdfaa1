//! Configuration resolution.
//!
//! The [`Loader`] assembles one validated [`Config`] from layered sources.
//! Precedence, highest first: environment variables, the configuration
//! file, built-in defaults. After the layers are merged, the preset named
//! by `kind` fills in missing signal blocks, and validation rejects
//! configurations that enable a signal without the pieces it needs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::env::{apply_env_overrides, EnvSnapshot};
use crate::config::model::{Config, MetricsExportConfig, DEFAULT_SERVICE_NAME};
use crate::config::presets;

/// Base name of the discovered configuration file.
const CONFIG_BASENAME: &str = "telemetry";

/// Recognised configuration file extensions, in discovery order.
const CONFIG_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Errors raised during configuration resolution.
///
/// All variants are fatal at startup: no configuration is produced and the
/// caller must not proceed with partially resolved state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Configuration data did not match the expected structure.
    #[error("failed to unmarshal config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The configured preset name is not in the catalog.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A signal is enabled without a sampler specification.
    #[error("{0} sampler configuration is required when {0} is enabled")]
    MissingSampler(&'static str),

    /// A signal is enabled without an exporter specification.
    #[error("{0} exporter configuration is required when {0} is enabled")]
    MissingExporter(&'static str),

    /// Writing a configuration file failed.
    #[error("failed to write config file {path}: {source}")]
    Write {
        /// Path of the target file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Resolves telemetry configuration from defaults, files, environment
/// variables and presets.
///
/// # Examples
///
/// ```
/// use skald::config::{EnvSnapshot, Loader};
///
/// let mut loader = Loader::with_env(EnvSnapshot::default());
/// let config = loader.load().unwrap();
///
/// assert!(config.is_tracing_enabled());
/// assert_eq!(config.kind, "telemetry-to-console");
/// ```
#[derive(Debug)]
pub struct Loader {
    env: EnvSnapshot,
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
}

impl Loader {
    /// Creates a loader over the current process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(EnvSnapshot::from_process())
    }

    /// Creates a loader over an explicit environment snapshot.
    #[must_use]
    pub fn with_env(env: EnvSnapshot) -> Self {
        let mut search_paths = vec![PathBuf::from("."), PathBuf::from("./config")];
        if let Some(home) = env.get("HOME") {
            search_paths.push(Path::new(home).join(".skald"));
        }
        search_paths.push(PathBuf::from("/etc/skald"));

        Self {
            env,
            search_paths,
            config_file: None,
        }
    }

    /// Adds a directory searched before the default locations.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.insert(0, path.into());
    }

    /// The configuration file used by the last load, if any was found.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Resolves the configuration from all layers.
    ///
    /// Absence of a configuration file is not an error; an unreadable or
    /// malformed file is.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a discovered file cannot be read or
    /// parsed, the merged tree does not match the configuration structure,
    /// the preset name is unknown, or validation fails.
    pub fn load(&mut self) -> Result<Config, ConfigError> {
        let mut tree = self.defaults_tree()?;

        if let Some(path) = self.find_config_file() {
            let file_tree = read_tree(&path)?;
            debug!(path = %path.display(), "loaded configuration file");
            self.config_file = Some(path);
            if !file_tree.is_null() {
                merge_tree(&mut tree, file_tree);
            }
        } else {
            debug!("no configuration file found, using defaults");
        }

        let overrides = apply_env_overrides(&mut tree, &self.env);
        if overrides > 0 {
            debug!(overrides, "applied environment variable overrides");
        }

        self.resolve(tree)
    }

    /// Resolves the configuration from a specific file, skipping both file
    /// discovery and the environment overlay.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed,
    /// the preset name is unknown, or validation fails.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut tree = self.defaults_tree()?;

        let file_tree = read_tree(path)?;
        self.config_file = Some(path.to_path_buf());
        if !file_tree.is_null() {
            merge_tree(&mut tree, file_tree);
        }

        self.resolve(tree)
    }

    /// Resolves the configuration from a JSON string, skipping both file
    /// discovery and the environment overlay.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the text is not valid JSON, the
    /// preset name is unknown, or validation fails.
    pub fn load_from_json(&self, text: &str) -> Result<Config, ConfigError> {
        let mut tree = self.defaults_tree()?;

        let json_tree: Value = serde_json::from_str(text)?;
        if !json_tree.is_null() {
            merge_tree(&mut tree, json_tree);
        }

        self.resolve(tree)
    }

    fn defaults_tree(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(Config::defaults(&self.env))?)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        for dir in &self.search_paths {
            for ext in CONFIG_EXTENSIONS {
                let candidate = dir.join(format!("{CONFIG_BASENAME}.{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn resolve(&self, tree: Value) -> Result<Config, ConfigError> {
        let mut config: Config = serde_json::from_value(tree)?;

        if !config.kind.is_empty() {
            apply_preset(&mut config)?;
        }
        validate(&mut config)?;

        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes a configuration to a file as pretty-printed JSON, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Write`] when a directory or the file cannot be
/// created.
pub fn write_config_file(config: &Config, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_tree(path: &Path) -> Result<Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tree(path, &text)
}

fn parse_tree(path: &Path, text: &str) -> Result<Value, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(text).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(text).map_err(|err| err.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Deep merge of `overlay` onto `base`. Objects merge per key; every other
/// pairing replaces the base value, so an explicit null clears a subtree.
fn merge_tree(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_tree(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// Merges the preset named by `config.kind` into the configuration.
///
/// A signal block the user left out entirely is adopted from the preset
/// wholesale. A block the user did specify only has a missing exporter
/// filled in; the sampler and every other sub-field stay untouched even
/// when the preset defines them.
fn apply_preset(config: &mut Config) -> Result<(), ConfigError> {
    let preset = presets::preset(&config.kind)
        .ok_or_else(|| ConfigError::UnknownPreset(config.kind.clone()))?;

    if config.tracing.is_none() {
        config.tracing = preset.tracing.clone();
    } else if let Some(user) = config.tracing.as_mut() {
        if user.exporter.is_none() {
            user.exporter = preset.tracing.as_ref().and_then(|t| t.exporter.clone());
        }
    }

    if config.metrics.is_none() {
        config.metrics = preset.metrics.clone();
    } else if let Some(user) = config.metrics.as_mut() {
        if user.exporter.is_none() {
            user.exporter = preset.metrics.as_ref().and_then(|m| m.exporter.clone());
        }
    }

    if config.logging.is_none() {
        config.logging = preset.logging.clone();
    } else if let Some(user) = config.logging.as_mut() {
        if user.exporter.is_none() {
            user.exporter = preset.logging.as_ref().and_then(|l| l.exporter.clone());
        }
    }

    Ok(())
}

fn validate(config: &mut Config) -> Result<(), ConfigError> {
    if config.service_name.is_empty() {
        config.service_name = DEFAULT_SERVICE_NAME.to_string();
    }

    if let Some(tracing) = &config.tracing {
        if tracing.enabled {
            if tracing.sampler.is_none() {
                return Err(ConfigError::MissingSampler("tracing"));
            }
            if tracing.exporter.is_none() {
                return Err(ConfigError::MissingExporter("tracing"));
            }
        }
    }

    if let Some(metrics) = &mut config.metrics {
        if metrics.enabled {
            if metrics.exporter.is_none() {
                return Err(ConfigError::MissingExporter("metrics"));
            }
            let interval_set = metrics
                .config
                .as_ref()
                .is_some_and(|c| c.export_interval_millis > 0);
            if !interval_set {
                metrics.config = Some(MetricsExportConfig {
                    export_interval_millis: 60_000,
                });
            }
        }
    }

    if let Some(logging) = &config.logging {
        if logging.enabled && logging.exporter.is_none() {
            return Err(ConfigError::MissingExporter("logging"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loader() -> Loader {
        Loader::with_env(EnvSnapshot::default())
    }

    #[test]
    fn test_load_from_json_empty_object_yields_defaults() {
        let config = loader().load_from_json("{}").unwrap();

        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.kind, "telemetry-to-console");
        assert!(config.is_tracing_enabled());
        assert!(config.is_metrics_enabled());
        assert!(!config.is_logging_enabled());
    }

    #[test]
    fn test_load_from_json_overrides_defaults() {
        let config = loader()
            .load_from_json(r#"{"service_name": "checkout", "tracing": {"enabled": false}}"#)
            .unwrap();

        assert_eq!(config.service_name, "checkout");
        assert!(!config.is_tracing_enabled());
        // The rest of the tracing block keeps its defaults through the merge.
        assert!(config.tracing.unwrap().sampler.is_some());
    }

    #[test]
    fn test_load_from_json_malformed() {
        let err = loader().load_from_json("not json {").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn test_preset_fills_missing_tracing_exporter() {
        let config = loader()
            .load_from_json(
                r#"{
                    "kind": "telemetry-to-console",
                    "tracing": {
                        "enabled": true,
                        "sampler": {"kind": "AlwaysOnSampler"},
                        "exporter": null
                    }
                }"#,
            )
            .unwrap();

        let exporter = config.tracing.unwrap().exporter.unwrap();
        assert_eq!(exporter.module, "console");
        assert_eq!(exporter.class, "ConsoleSpanExporter");
    }

    #[test]
    fn test_preset_never_fills_sampler() {
        let err = loader()
            .load_from_json(
                r#"{
                    "kind": "telemetry-to-console",
                    "tracing": {"enabled": true, "sampler": null, "exporter": null}
                }"#,
            )
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingSampler("tracing")));
        assert_eq!(
            err.to_string(),
            "tracing sampler configuration is required when tracing is enabled"
        );
    }

    #[test]
    fn test_apply_preset_adopts_absent_block_wholesale() {
        let mut config = Config {
            kind: "telemetry-to-console".to_string(),
            ..Config::default()
        };

        apply_preset(&mut config).unwrap();

        let tracing = config.tracing.unwrap();
        assert!(tracing.enabled);
        assert!(tracing.sampler.is_none());
        assert_eq!(tracing.exporter.unwrap().class, "ConsoleSpanExporter");
        assert!(config.metrics.is_some());
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_apply_preset_keeps_existing_exporter() {
        let config = loader()
            .load_from_json(
                r#"{
                    "kind": "telemetry-to-console",
                    "tracing": {
                        "enabled": true,
                        "exporter": {"module": "otlp", "class": "OTLPTraceExporter"}
                    }
                }"#,
            )
            .unwrap();

        // The user's explicit exporter wins over the preset's.
        assert_eq!(config.tracing.unwrap().exporter.unwrap().module, "otlp");
    }

    #[test]
    fn test_unknown_preset() {
        let err = loader()
            .load_from_json(r#"{"kind": "telemetry-to-nowhere"}"#)
            .unwrap_err();

        match err {
            ConfigError::UnknownPreset(name) => assert_eq!(name, "telemetry-to-nowhere"),
            other => panic!("expected UnknownPreset, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_missing_metrics_exporter() {
        let err = loader()
            .load_from_json(r#"{"kind": "", "metrics": {"enabled": true, "exporter": null}}"#)
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingExporter("metrics")));
        assert_eq!(
            err.to_string(),
            "metrics exporter configuration is required when metrics is enabled"
        );
    }

    #[test]
    fn test_validation_missing_logging_exporter() {
        let err = loader()
            .load_from_json(r#"{"kind": "", "logging": {"enabled": true, "exporter": null}}"#)
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingExporter("logging")));
    }

    #[test]
    fn test_validation_defaults_absent_export_interval() {
        let config = loader()
            .load_from_json(r#"{"metrics": {"enabled": true, "config": null}}"#)
            .unwrap();

        let interval = config.metrics.unwrap().config.unwrap();
        assert_eq!(interval.export_interval_millis, 60_000);
    }

    #[test]
    fn test_validation_defaults_non_positive_export_interval() {
        let config = loader()
            .load_from_json(r#"{"metrics": {"config": {"export_interval_millis": -1}}}"#)
            .unwrap();

        let interval = config.metrics.unwrap().config.unwrap();
        assert_eq!(interval.export_interval_millis, 60_000);
    }

    #[test]
    fn test_validation_defaults_empty_service_name() {
        let config = loader()
            .load_from_json(r#"{"service_name": ""}"#)
            .unwrap();

        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_disabled_signal_skips_validation() {
        let config = loader()
            .load_from_json(
                r#"{"kind": "", "tracing": {"enabled": false, "sampler": null, "exporter": null}}"#,
            )
            .unwrap();

        assert!(!config.is_tracing_enabled());
        assert!(config.tracing.unwrap().sampler.is_none());
    }

    #[test]
    fn test_defaults_honour_env_snapshot() {
        let env: EnvSnapshot = [("NO_TELEMETRY".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        let config = Loader::with_env(env).load_from_json("{}").unwrap();

        assert!(config.disabled);
        assert!(!config.is_tracing_enabled());
    }

    #[test]
    fn test_merge_tree_nested_objects() {
        let mut base = json!({
            "tracing": {"enabled": true, "hrtime": false},
            "service_name": "a"
        });
        merge_tree(
            &mut base,
            json!({"tracing": {"hrtime": true}, "extra": 1}),
        );

        assert_eq!(base["tracing"]["enabled"], json!(true));
        assert_eq!(base["tracing"]["hrtime"], json!(true));
        assert_eq!(base["service_name"], json!("a"));
        assert_eq!(base["extra"], json!(1));
    }

    #[test]
    fn test_merge_tree_null_clears_subtree() {
        let mut base = json!({"logging": {"enabled": false}});
        merge_tree(&mut base, json!({"logging": null}));

        assert!(base["logging"].is_null());
    }

    #[test]
    fn test_parse_tree_yaml_and_json() {
        let yaml = parse_tree(Path::new("telemetry.yaml"), "tracing:\n  enabled: false\n");
        assert_eq!(yaml.unwrap()["tracing"]["enabled"], json!(false));

        let json_tree = parse_tree(Path::new("telemetry.json"), r#"{"disabled": true}"#);
        assert_eq!(json_tree.unwrap()["disabled"], json!(true));

        let err = parse_tree(Path::new("telemetry.json"), "{oops").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
