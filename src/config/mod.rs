//! Configuration management for the issue service.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`ISSUES_BIND`, `ISSUES_STORE`, `ISSUES_LOG_JSON`)
//! 3. Config file (`--config`, or `issues.yaml` in the working directory)
//! 4. Defaults

use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "issues.yaml";
/// Listen address when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

const ENV_PREFIX: &str = "ISSUES_";
const KNOWN_KEYS: &[&str] = &["bind", "store", "log-json"];

/// Resolved service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,
    /// JSONL file backing the store; `None` keeps issues in memory only.
    pub store: Option<PathBuf>,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store: None,
            log_json: false,
        }
    }
}

impl Config {
    /// Resolve a merged layer into typed settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `bind` is not a socket address or `log-json` is
    /// not a boolean.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = layer.get("bind") {
            config.bind = bind
                .parse()
                .with_context(|| format!("invalid bind address '{bind}'"))?;
        }
        if let Some(store) = layer.get("store").filter(|s| !s.trim().is_empty()) {
            config.store = Some(PathBuf::from(store));
        }
        if let Some(value) = layer.get("log-json") {
            config.log_json = parse_bool(value)
                .with_context(|| format!("invalid value for log-json: '{value}'"))?;
        }

        Ok(config)
    }
}

/// One source of configuration as normalized `key -> value` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    values: HashMap<String, String>,
}

impl ConfigLayer {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file. Missing files return an empty layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// names a key this service does not know.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Build a layer from YAML text: a mapping of scalar values.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a YAML mapping of known keys.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut layer = Self::default();

        let map = match value {
            serde_yaml::Value::Null => return Ok(layer),
            serde_yaml::Value::Mapping(map) => map,
            _ => bail!("expected a mapping at the top level"),
        };

        for (key, value) in map {
            let Some(key) = key.as_str().map(normalize_key) else {
                bail!("config keys must be strings");
            };
            if !KNOWN_KEYS.contains(&key.as_str()) {
                bail!("unknown config key '{key}'");
            }
            if let Some(value) = yaml_scalar_to_string(&value) {
                layer.values.insert(key, value);
            }
        }

        Ok(layer)
    }

    /// Build a layer from `ISSUES_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs, keeping `ISSUES_*` names.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (name, value) in vars {
            if let Some(stripped) = name.strip_prefix(ENV_PREFIX) {
                let key = normalize_key(stripped);
                if KNOWN_KEYS.contains(&key.as_str()) {
                    layer.values.insert(key, value);
                }
            }
        }
        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub store: Option<PathBuf>,
    pub log_json: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(bind) = &self.bind {
            layer.set("bind", bind.clone());
        }
        if let Some(store) = &self.store {
            layer.set("store", store.to_string_lossy().to_string());
        }
        if let Some(log_json) = self.log_json {
            layer.set("log-json", log_json.to_string());
        }

        layer
    }
}

/// Load the effective configuration.
///
/// An explicit `config_path` must exist; the default `issues.yaml` in the
/// working directory is optional.
///
/// # Errors
///
/// Returns an error if a config file is unreadable or invalid, or a value
/// cannot be parsed.
pub fn load_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Config> {
    let file_layer = match config_path {
        Some(path) => {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            ConfigLayer::from_yaml(path)?
        }
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILENAME))?,
    };

    let merged = ConfigLayer::merge_layers(&[
        file_layer,
        ConfigLayer::from_env(),
        overrides.as_layer(),
    ]);
    Config::from_layer(&merged)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
